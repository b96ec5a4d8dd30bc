//! WIP CLI - terminal front end for the WIP engine
//!
//! # Commands
//!
//! - `wip_cli init --name <company>` - Create a new company file
//! - `wip_cli wip` - Print the WIP schedule (table, JSON, or CSV)
//! - `wip_cli capacity` - Department summaries and monthly labor projection
//! - `wip_cli valuation` - Current valuation and scenario comparison
//! - `wip_cli check` - Validate jobs, employees, and department allocations
//!
//! Every command reads the company file given by `--file`. Only `init`
//! writes.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;

pub use error::{CliError, Result};

/// Construction WIP schedule, labor capacity, and valuation
#[derive(Parser)]
#[command(name = "wip_cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Company file path
    #[arg(short, long, global = true, default_value = "company.wip")]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new, empty company file
    Init {
        /// Company name
        #[arg(short, long)]
        name: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the WIP schedule
    Wip {
        /// Output format (table, json, csv)
        #[arg(short = 'o', long, default_value = "table")]
        format: String,

        /// Only jobs that are active or on hold
        #[arg(long)]
        open: bool,
    },

    /// Department capacity summaries and monthly projection
    Capacity {
        /// Months to project (defaults to the company setting)
        #[arg(short, long)]
        months: Option<usize>,

        /// First projected month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        start: Option<String>,

        /// Date used for "currently active" (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Show the current valuation
    Valuation {
        /// Compare every valuation scenario side by side
        #[arg(short, long)]
        compare: bool,
    },

    /// Validate records and department allocations
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Init { name, force } => commands::init::run(&cli.file, &name, force),
        Commands::Wip { format, open } => commands::wip::run(&cli.file, &format, open),
        Commands::Capacity { months, start, as_of } => {
            commands::capacity::run(&cli.file, months, start.as_deref(), as_of.as_deref())
        }
        Commands::Valuation { compare } => commands::valuation::run(&cli.file, compare),
        Commands::Check => commands::check::run(&cli.file),
    }
}
