//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Renderers write to any
//! `io::Write` so they can be tested without touching stdout.

pub mod capacity;
pub mod check;
pub mod init;
pub mod valuation;
pub mod wip;

use std::path::Path;

use tracing::warn;
use wip_core::company::Company;
use wip_core::file_io::load_company_with_lock_check;

use crate::Result;

/// Load a company file, warning when someone else has it open.
pub(crate) fn open_company(path: &Path) -> Result<Company> {
    let (company, lock) = load_company_with_lock_check(path)?;
    if let Some(lock) = lock {
        warn!(
            user = %lock.user_id,
            machine = %lock.machine,
            since = %lock.locked_at,
            "company file is open elsewhere; showing last saved data"
        );
    }
    Ok(company)
}

/// Dollar amount with thousands separators and no cents.
pub(crate) fn money(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
