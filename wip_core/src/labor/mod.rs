//! # Labor Capacity
//!
//! Employees, departments, and allocations, plus the capacity projector that
//! turns them into loaded cost and available hours.
//!
//! - [`calendar`] - Month arithmetic and working-day counts
//! - [`capacity`] - Per-employee metrics, active windows, department summaries
//! - [`projection`] - Month-by-month workforce hours and cost
//!
//! ## Active Window
//!
//! An employee counts from the hire month through the termination month,
//! both inclusive, prorated by day in those two boundary months. `is_active =
//! false` excludes the employee from everything regardless of dates.

pub mod calendar;
pub mod capacity;
pub mod projection;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};
use crate::units::{Multiplier, Percent};

pub use calendar::{days_in_month, get_working_days_in_month, months_from, YearMonth};
pub use capacity::{
    calculate_annual_available_hours, calculate_department_summary, calculate_employee_metrics,
    calculate_loaded_cost_per_hour, calculate_monthly_available_hours, calculate_prorated_monthly_hours,
    is_employee_active_in_month, is_employee_currently_active, validate_allocations,
    validate_employee_allocations, AllocationCheck, DepartmentSummary, EmployeeMetrics,
};
pub use projection::{generate_monthly_projections, DepartmentMonth, MonthlyProjection};

/// Standard work day
pub const HOURS_PER_DAY: f64 = 8.0;
/// Standard work week
pub const DAYS_PER_WEEK: f64 = 5.0;
pub const WEEKS_PER_YEAR: f64 = 52.0;
/// 8 × 5 × 52
pub const HOURS_PER_YEAR: f64 = HOURS_PER_DAY * DAYS_PER_WEEK * WEEKS_PER_YEAR;

pub const DEFAULT_BURDEN_MULTIPLIER: Multiplier = Multiplier(1.16);
pub const DEFAULT_UTILIZATION_TARGET: f64 = 0.85;
pub const DEFAULT_ANNUAL_PTO_HOURS: f64 = 80.0;
pub const DEFAULT_FTE: f64 = 1.0;

fn default_fte() -> f64 {
    DEFAULT_FTE
}

fn default_burden() -> Multiplier {
    DEFAULT_BURDEN_MULTIPLIER
}

fn default_pto() -> f64 {
    DEFAULT_ANNUAL_PTO_HOURS
}

fn default_utilization() -> f64 {
    DEFAULT_UTILIZATION_TARGET
}

fn default_true() -> bool {
    true
}

/// An employee record.
///
/// Loaded cost, available hours, and the like are derived on read; see
/// [`capacity::calculate_employee_metrics`].
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d",
///   "name": "Dana Ortiz",
///   "title": "Foreman",
///   "fte": 1.0,
///   "hourly_rate": 42.5,
///   "burden_multiplier": 1.16,
///   "annual_pto_hours": 80.0,
///   "hire_date": "2021-03-15",
///   "termination_date": null,
///   "utilization_target": 0.85,
///   "is_active": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,

    pub name: String,

    #[serde(default)]
    pub title: Option<String>,

    /// Full-time equivalent (1.0 = full time)
    #[serde(default = "default_fte")]
    pub fte: f64,

    /// Base wage per hour
    #[serde(default)]
    pub hourly_rate: f64,

    /// Taxes, insurance, and benefits on top of wage
    #[serde(default = "default_burden")]
    pub burden_multiplier: Multiplier,

    #[serde(default = "default_pto")]
    pub annual_pto_hours: f64,

    #[serde(default)]
    pub hire_date: Option<NaiveDate>,

    /// Last day worked
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,

    /// Share of available hours expected to be billable (0-1)
    #[serde(default = "default_utilization")]
    pub utilization_target: f64,

    /// Hard override: `false` excludes the employee from all aggregation
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Employee {
    /// Create an active, full-time employee with default burden, PTO, and
    /// utilization.
    pub fn new(name: impl Into<String>, hourly_rate: f64) -> Self {
        Employee {
            id: Uuid::new_v4(),
            name: name.into(),
            title: None,
            fte: DEFAULT_FTE,
            hourly_rate,
            burden_multiplier: DEFAULT_BURDEN_MULTIPLIER,
            annual_pto_hours: DEFAULT_ANNUAL_PTO_HOURS,
            hire_date: None,
            termination_date: None,
            utilization_target: DEFAULT_UTILIZATION_TARGET,
            is_active: true,
        }
    }

    /// Builder: set the hire date
    pub fn hired(mut self, date: NaiveDate) -> Self {
        self.hire_date = Some(date);
        self
    }

    /// Builder: set the termination date
    pub fn terminated(mut self, date: NaiveDate) -> Self {
        self.termination_date = Some(date);
        self
    }

    /// Form-level checks. Advisory only.
    pub fn validate(&self) -> CalcResult<()> {
        if self.name.trim().is_empty() {
            return Err(CalcError::missing_field("name"));
        }
        if self.fte < 0.0 {
            return Err(CalcError::invalid_input("fte", self.fte.to_string(), "FTE must not be negative"));
        }
        if let (Some(hire), Some(term)) = (self.hire_date, self.termination_date) {
            if term < hire {
                return Err(CalcError::invalid_input(
                    "termination_date",
                    term.to_string(),
                    format!("Termination date is before hire date {hire}"),
                ));
            }
        }
        Ok(())
    }
}

/// A department employees are allocated to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    /// Whether hours here count toward productive capacity
    #[serde(default)]
    pub is_productive: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl Department {
    pub fn new(name: impl Into<String>, is_productive: bool, sort_order: i32) -> Self {
        Department {
            id: Uuid::new_v4(),
            name: name.into(),
            is_productive,
            sort_order,
        }
    }
}

/// Share of one employee's time attributed to one department.
///
/// One employee's allocations are expected to total 100%, but nothing
/// enforces it; see [`capacity::validate_allocations`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepartmentAllocation {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub department_id: Uuid,
    pub allocation_percent: Percent,
}

impl DepartmentAllocation {
    pub fn new(employee_id: Uuid, department_id: Uuid, allocation_percent: f64) -> Self {
        DepartmentAllocation {
            id: Uuid::new_v4(),
            employee_id,
            department_id,
            allocation_percent: Percent(allocation_percent),
        }
    }

    /// Allocation as a 0-1 factor
    pub fn factor(&self) -> f64 {
        self.allocation_percent.as_fraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_per_year() {
        assert_eq!(HOURS_PER_YEAR, 2080.0);
    }

    #[test]
    fn test_employee_defaults() {
        let emp = Employee::new("Dana Ortiz", 42.5);
        assert_eq!(emp.fte, 1.0);
        assert_eq!(emp.burden_multiplier, Multiplier(1.16));
        assert_eq!(emp.annual_pto_hours, 80.0);
        assert_eq!(emp.utilization_target, 0.85);
        assert!(emp.is_active);
        assert!(emp.validate().is_ok());
    }

    #[test]
    fn test_employee_json_defaults() {
        let json = r#"{
            "id": "9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d",
            "name": "Dana Ortiz",
            "hourly_rate": 42.5,
            "hire_date": "2021-03-15"
        }"#;
        let emp: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(emp.fte, DEFAULT_FTE);
        assert_eq!(emp.burden_multiplier, DEFAULT_BURDEN_MULTIPLIER);
        assert!(emp.is_active);
        assert_eq!(emp.hire_date, NaiveDate::from_ymd_opt(2021, 3, 15));
        assert!(emp.termination_date.is_none());
    }

    #[test]
    fn test_employee_validate_dates() {
        let emp = Employee::new("Sam", 30.0)
            .hired(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .terminated(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert!(emp.validate().is_err());
    }

    #[test]
    fn test_allocation_factor() {
        let alloc = DepartmentAllocation::new(Uuid::nil(), Uuid::nil(), 25.0);
        assert_eq!(alloc.factor(), 0.25);
    }
}
