//! Init command implementation
//!
//! Creates a new company file with default settings.

use std::path::Path;

use tracing::info;
use wip_core::company::Company;
use wip_core::file_io::{save_company, FileLock};

use crate::{CliError, Result};

/// Run the init command
pub fn run(path: &Path, name: &str, force: bool) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CliError::InvalidArgument("Company name must not be empty".to_string()));
    }
    if path.exists() && !force {
        return Err(CliError::AlreadyExists(path.display().to_string()));
    }

    let lock = FileLock::acquire(path, current_user())?;
    let company = Company::new(name.trim());
    save_company(&company, lock.company_path())?;
    drop(lock);

    info!(path = %path.display(), company = %company.meta.name, "created company file");
    println!("Created {} for {}", path.display(), company.meta.name);
    Ok(())
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::fs;
    use std::path::PathBuf;
    use wip_core::file_io::load_company;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("wip_cli_init_{}_{}.wip", name, std::process::id()))
    }

    #[test]
    fn test_init_creates_loadable_file() {
        let path = temp_path("create");
        let _ = fs::remove_file(&path);

        run(&path, "Oakdale Builders", false).unwrap();
        let company = load_company(&path).unwrap();
        assert_eq!(company.meta.name, "Oakdale Builders");
        assert!(!path.with_extension("wip.lock").exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let path = temp_path("exists");
        fs::write(&path, "{}").unwrap();

        let err = run(&path, "Oakdale Builders", false).unwrap_err();
        assert!(matches!(err, CliError::AlreadyExists(_)));

        run(&path, "Oakdale Builders", true).unwrap();
        assert_eq!(load_company(&path).unwrap().meta.name, "Oakdale Builders");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_init_rejects_blank_name() {
        let err = run(&temp_path("blank"), "  ", false).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }
}
