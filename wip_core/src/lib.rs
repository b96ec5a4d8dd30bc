//! # wip_core - Construction WIP Calculation Engine
//!
//! `wip_core` turns raw job, employee, and valuation records into the derived
//! figures a construction company watches every month: earned revenue,
//! over/under billing, forecasted profit, labor capacity, and business value.
//! All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take records and return results
//! - **Derived, never stored**: Records hold raw figures only; everything else
//!   is computed on read
//! - **Non-throwing math**: Division by zero yields `0` for that term
//! - **Rich Errors**: Structured errors for persistence and lookups
//!
//! ## Quick Start
//!
//! ```rust
//! use wip_core::breakdown::CostBreakdown;
//! use wip_core::jobs::{Job, JobBilling, calculate_earned_revenue};
//!
//! let mut job = Job::new("24-101", "Library Renovation", "City of Oakdale", JobBilling::fixed_price());
//! job.amounts.contract = CostBreakdown::new(100_000.0, 50_000.0, 0.0);
//! job.amounts.budget = CostBreakdown::new(80_000.0, 40_000.0, 0.0);
//! job.amounts.costs = CostBreakdown::new(40_000.0, 20_000.0, 0.0);
//!
//! let earned = calculate_earned_revenue(&job);
//! assert_eq!(earned.total, 75_000.0);
//! ```
//!
//! ## Modules
//!
//! - [`breakdown`] - The labor/material/other split shared by every money figure
//! - [`jobs`] - Jobs, change orders, and the job financial calculator
//! - [`labor`] - Employees, departments, and the labor capacity projector
//! - [`valuation`] - EBITDA normalization and business value
//! - [`company`] - Company container and settings
//! - [`report`] - WIP schedule rows and CSV export
//! - [`units`] - Multiplier and percent wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves and locking

pub mod breakdown;
pub mod company;
pub mod errors;
pub mod file_io;
pub mod jobs;
pub mod labor;
pub mod report;
pub mod units;
pub mod valuation;

// Re-export commonly used types at crate root for convenience
pub use breakdown::CostBreakdown;
pub use company::{Company, CompanyMetadata, CompanySettings};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_company, save_company, FileLock};
pub use units::{Multiplier, Percent};
