//! CLI error types

use thiserror::Error;
use wip_core::CalcError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] CalcError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File already exists: {0} (use --force to overwrite)")]
    AlreadyExists(String),

    #[error("{0} record(s) failed validation")]
    CheckFailed(usize),
}
