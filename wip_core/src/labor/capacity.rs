//! # Capacity Calculations
//!
//! Per-employee loaded cost and available hours, active-window checks with
//! hire/termination proration, department summaries, and allocation
//! validation.
//!
//! Functions that depend on "today" come in two forms: `*_as_of(…, date)`
//! takes the date explicitly, and the plain form uses the local calendar
//! date.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use wip_core::labor::{Employee, calculate_prorated_monthly_hours, calculate_monthly_available_hours};
//!
//! let emp = Employee::new("Dana Ortiz", 40.0).hired(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
//!
//! let full = calculate_monthly_available_hours(emp.fte, emp.annual_pto_hours, 2024, 6);
//! let prorated = calculate_prorated_monthly_hours(&emp, 2024, 6);
//! assert!((prorated - full * 16.0 / 30.0).abs() < 1e-9);
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::calendar::{days_in_month, get_working_days_in_month, today, YearMonth};
use super::{Department, DepartmentAllocation, Employee, HOURS_PER_DAY, HOURS_PER_YEAR};
use crate::units::{Multiplier, Percent};

/// Allocation totals within this distance of 100% are accepted
const ALLOCATION_TOLERANCE: f64 = 0.01;

/// `hourly_rate × burden_multiplier`
pub fn calculate_loaded_cost_per_hour(hourly_rate: f64, burden_multiplier: Multiplier) -> f64 {
    burden_multiplier.apply(hourly_rate)
}

/// `max(0, 2080 × fte − annual_pto_hours)`
pub fn calculate_annual_available_hours(fte: f64, annual_pto_hours: f64) -> f64 {
    (HOURS_PER_YEAR * fte - annual_pto_hours).max(0.0)
}

/// Working-day hours for the month minus a twelfth of annual PTO, floored at
/// zero. PTO is spread evenly over the year.
pub fn calculate_monthly_available_hours(fte: f64, annual_pto_hours: f64, year: i32, month: u32) -> f64 {
    let working_days = get_working_days_in_month(year, month) as f64;
    (working_days * HOURS_PER_DAY * fte - annual_pto_hours / 12.0).max(0.0)
}

/// Whether the employee is on the payroll today.
pub fn is_employee_currently_active(employee: &Employee) -> bool {
    is_employee_currently_active_as_of(employee, today())
}

/// Active on `as_of`: the active flag is set, hired on or before `as_of`, and
/// not terminated on or before it.
pub fn is_employee_currently_active_as_of(employee: &Employee, as_of: NaiveDate) -> bool {
    if !employee.is_active {
        return false;
    }
    let hired = employee.hire_date.map_or(true, |hire| hire <= as_of);
    let not_terminated = employee.termination_date.map_or(true, |term| term > as_of);
    hired && not_terminated
}

/// Whether the employee counts at all in the given month.
///
/// Both the hire month and the termination month count (the employee works
/// through part of each).
pub fn is_employee_active_in_month(employee: &Employee, year: i32, month: u32) -> bool {
    if !employee.is_active {
        return false;
    }
    let target = YearMonth::new(year, month).encode();
    let after_hire = employee
        .hire_date
        .map_or(true, |hire| target >= YearMonth::from_date(hire).encode());
    let before_termination = employee
        .termination_date
        .map_or(true, |term| target <= YearMonth::from_date(term).encode());
    after_hire && before_termination
}

/// Share of the month's days the employee is on the payroll.
///
/// Days run from the hire day (in the hire month) through the termination day
/// (in the termination month), inclusive.
fn active_day_fraction(employee: &Employee, year: i32, month: u32) -> f64 {
    let ym = YearMonth::new(year, month);
    let days = days_in_month(year, month);
    if days == 0 {
        return 0.0;
    }
    let first_day = employee
        .hire_date
        .filter(|hire| ym.contains(*hire))
        .map_or(1, |hire| hire.day());
    let last_day = employee
        .termination_date
        .filter(|term| ym.contains(*term))
        .map_or(days, |term| term.day());

    if last_day < first_day {
        return 0.0;
    }
    (last_day - first_day + 1) as f64 / days as f64
}

/// PTO-adjusted monthly hours, prorated by day for the hire and termination
/// months. Zero outside the active window.
pub fn calculate_prorated_monthly_hours(employee: &Employee, year: i32, month: u32) -> f64 {
    if !is_employee_active_in_month(employee, year, month) {
        return 0.0;
    }
    let full_month = calculate_monthly_available_hours(employee.fte, employee.annual_pto_hours, year, month);
    full_month * active_day_fraction(employee, year, month)
}

/// Derived figures for one employee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmployeeMetrics {
    pub loaded_cost_per_hour: f64,
    pub annual_available_hours: f64,
    /// Annual available hours / 12
    pub monthly_available_hours: f64,
    pub annual_loaded_cost: f64,
    pub monthly_loaded_cost: f64,
    /// Monthly available hours × utilization target
    pub billable_hours_per_month: f64,
    /// Whole years to one decimal, never negative
    pub years_of_service: f64,
}

pub fn calculate_employee_metrics(employee: &Employee) -> EmployeeMetrics {
    calculate_employee_metrics_as_of(employee, today())
}

pub fn calculate_employee_metrics_as_of(employee: &Employee, as_of: NaiveDate) -> EmployeeMetrics {
    let loaded_cost_per_hour = calculate_loaded_cost_per_hour(employee.hourly_rate, employee.burden_multiplier);
    let annual_available_hours = calculate_annual_available_hours(employee.fte, employee.annual_pto_hours);
    let monthly_available_hours = annual_available_hours / 12.0;
    let annual_loaded_cost = loaded_cost_per_hour * annual_available_hours;

    EmployeeMetrics {
        loaded_cost_per_hour,
        annual_available_hours,
        monthly_available_hours,
        annual_loaded_cost,
        monthly_loaded_cost: annual_loaded_cost / 12.0,
        billable_hours_per_month: monthly_available_hours * employee.utilization_target,
        years_of_service: years_of_service(employee.hire_date, as_of),
    }
}

fn years_of_service(hire_date: Option<NaiveDate>, as_of: NaiveDate) -> f64 {
    let Some(hire) = hire_date else {
        return 0.0;
    };
    let years = (as_of - hire).num_days() as f64 / 365.25;
    ((years * 10.0).floor() / 10.0).max(0.0)
}

/// Headcount, hours, and cost attributed to one department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentSummary {
    pub department_id: Uuid,
    pub department_name: String,
    pub is_productive: bool,
    pub employee_count: usize,
    /// Σ fte × allocation
    pub total_fte: f64,
    /// Σ annual available hours × allocation
    pub total_annual_hours: f64,
    /// Σ annual available hours × utilization × allocation
    pub total_billable_hours: f64,
    /// Σ annual loaded cost × allocation
    pub total_annual_cost: f64,
    /// Unweighted mean of member loaded rates
    pub avg_loaded_rate: f64,
}

/// Summarize a department from the employees active today.
pub fn calculate_department_summary(
    department: &Department,
    employees: &[Employee],
    allocations: &[DepartmentAllocation],
) -> DepartmentSummary {
    calculate_department_summary_as_of(department, employees, allocations, today())
}

/// Summarize a department from the employees active on `as_of`.
///
/// The average loaded rate is a plain mean across employees, not weighted by
/// allocation.
pub fn calculate_department_summary_as_of(
    department: &Department,
    employees: &[Employee],
    allocations: &[DepartmentAllocation],
    as_of: NaiveDate,
) -> DepartmentSummary {
    let mut summary = DepartmentSummary {
        department_id: department.id,
        department_name: department.name.clone(),
        is_productive: department.is_productive,
        employee_count: 0,
        total_fte: 0.0,
        total_annual_hours: 0.0,
        total_billable_hours: 0.0,
        total_annual_cost: 0.0,
        avg_loaded_rate: 0.0,
    };
    let mut rate_sum = 0.0;

    for (employee_id, share) in department_shares(department.id, allocations) {
        let Some(employee) = employees.iter().find(|e| e.id == employee_id) else {
            warn!(
                employee_id = %employee_id,
                department = %department.name,
                "allocation references unknown employee"
            );
            continue;
        };
        if !is_employee_currently_active_as_of(employee, as_of) {
            continue;
        }

        let factor = share.as_fraction();
        let metrics = calculate_employee_metrics_as_of(employee, as_of);
        summary.employee_count += 1;
        summary.total_fte += employee.fte * factor;
        summary.total_annual_hours += metrics.annual_available_hours * factor;
        summary.total_billable_hours += metrics.annual_available_hours * employee.utilization_target * factor;
        summary.total_annual_cost += metrics.annual_loaded_cost * factor;
        rate_sum += metrics.loaded_cost_per_hour;
    }

    if summary.employee_count > 0 {
        summary.avg_loaded_rate = rate_sum / summary.employee_count as f64;
    }
    summary
}

/// Each employee's share of one department, in first-seen order.
///
/// Several rows for the same employee and department are summed into one
/// share, so an employee is never counted twice in a department.
pub(super) fn department_shares(department_id: Uuid, allocations: &[DepartmentAllocation]) -> Vec<(Uuid, Percent)> {
    let mut shares: Vec<(Uuid, Percent)> = Vec::new();
    for allocation in allocations.iter().filter(|a| a.department_id == department_id) {
        match shares.iter_mut().find(|(id, _)| *id == allocation.employee_id) {
            Some((_, share)) => *share = *share + allocation.allocation_percent,
            None => shares.push((allocation.employee_id, allocation.allocation_percent)),
        }
    }
    shares
}

/// Outcome of an allocation check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationCheck {
    pub is_valid: bool,
    pub total: Percent,
    pub message: String,
}

/// Check that a set of allocations (normally one employee's) totals 100%.
///
/// A total of zero (unallocated) is allowed. Advisory only: nothing in the
/// projector enforces it.
pub fn validate_allocations(allocations: &[DepartmentAllocation]) -> AllocationCheck {
    let total: Percent = allocations.iter().map(|a| a.allocation_percent).sum();

    if total.value() == 0.0 {
        return AllocationCheck {
            is_valid: true,
            total,
            message: "No department allocations".to_string(),
        };
    }
    if (total.value() - 100.0).abs() <= ALLOCATION_TOLERANCE {
        return AllocationCheck {
            is_valid: true,
            total,
            message: "Allocations total 100%".to_string(),
        };
    }
    AllocationCheck {
        is_valid: false,
        total,
        message: format!("Allocations total {:.1}% but must equal 100%", total.value()),
    }
}

/// [`validate_allocations`] restricted to one employee's rows.
pub fn validate_employee_allocations(employee_id: Uuid, allocations: &[DepartmentAllocation]) -> AllocationCheck {
    let own: Vec<DepartmentAllocation> = allocations
        .iter()
        .filter(|a| a.employee_id == employee_id)
        .copied()
        .collect();
    validate_allocations(&own)
}
