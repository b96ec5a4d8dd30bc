//! # File I/O Module
//!
//! Company file operations:
//! - **Atomic saves**: write to a temp file, fsync, rename
//! - **File locking**: advisory lock so two estimators don't edit the same
//!   company file on a shared drive
//! - **Version validation**: refuse files written by a newer schema
//!
//! ## File Format
//!
//! Company files use the `.wip` extension and contain pretty-printed JSON.
//! Lock files sit beside them as `.wip.lock`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use wip_core::company::Company;
//! use wip_core::file_io::{save_company, load_company, FileLock};
//! use std::path::Path;
//!
//! let company = Company::new("Oakdale Builders");
//! let path = Path::new("oakdale.wip");
//!
//! let lock = FileLock::acquire(path, "pm@oakdale.example")?;
//! save_company(&company, path)?;
//! drop(lock);
//!
//! let loaded = load_company(path)?;
//! assert_eq!(loaded.meta.name, "Oakdale Builders");
//! # Ok::<(), wip_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::company::{Company, SCHEMA_VERSION};
use crate::errors::{CalcError, CalcResult};

/// Locks older than this are treated as abandoned
const STALE_LOCK_HOURS: i64 = 24;

/// Contents of a `.wip.lock` file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Whether the holder has gone away
    fn is_stale(&self) -> bool {
        if Some(&self.machine) == hostname().as_ref() && !process_alive(self.pid) {
            return true;
        }
        (Utc::now() - self.locked_at).num_hours() > STALE_LOCK_HOURS
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // No cheap check; fall back to the age limit
    true
}

/// Lock guard for a company file. Released on drop.
///
/// Holds an OS-level lock (via fs2) and writes a metadata file so other users
/// can see who has the file open.
pub struct FileLock {
    company_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a company file.
    ///
    /// Returns `CalcError::FileLocked` if another live process holds it.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = FileLock::check(path) {
            return Err(CalcError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(CalcError::serialization)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        debug!(path = %path.display(), user = %info.user_id, "acquired company file lock");

        Ok(FileLock {
            company_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Who holds the lock, if anyone (stale locks are ignored).
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).ok().filter(|info| !info.is_stale())
    }

    pub fn company_path(&self) -> &Path {
        &self.company_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(company_path: &Path) -> PathBuf {
    let mut lock_path = company_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = fs::read_to_string(lock_path)
        .map_err(|e| CalcError::file_error("read lock", lock_path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents).map_err(CalcError::serialization)
}

/// Save a company with atomic write semantics (temp file, fsync, rename).
pub fn save_company(company: &Company, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(company).map_err(CalcError::serialization)?;

    let tmp_path = path.with_extension("wip.tmp");
    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(json.as_bytes())
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    info!(
        path = %path.display(),
        jobs = company.jobs.len(),
        employees = company.employees.len(),
        "saved company file"
    );
    Ok(())
}

/// Load a company file, checking its schema version.
pub fn load_company(path: &Path) -> CalcResult<Company> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let company: Company = serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&company.meta.version)?;

    let current = company.current_valuation_count();
    if current > 1 {
        warn!(
            path = %path.display(),
            current,
            chosen = company.current_valuation().map(|v| v.name.as_str()).unwrap_or_default(),
            "company file flags more than one current valuation"
        );
    }

    debug!(
        path = %path.display(),
        version = %company.meta.version,
        jobs = company.jobs.len(),
        "loaded company file"
    );
    Ok(company)
}

/// Load a company, also reporting whether someone else holds the lock.
pub fn load_company_with_lock_check(path: &Path) -> CalcResult<(Company, Option<LockInfo>)> {
    let company = load_company(path)?;
    Ok((company, FileLock::check(path)))
}

/// Major version must match; under 0.x the file's minor may not be newer.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [current_major, ..]) if file_major != current_major => Err(mismatch()),
        ([0, file_minor, ..], [0, current_minor, ..]) if file_minor > current_minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}
