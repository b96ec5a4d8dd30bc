//! # Monthly Workforce Projection
//!
//! Walks forward month by month from a start month and, for each department,
//! totals the prorated hours and loaded cost of the employees allocated to
//! it and active in that month.
//!
//! Months are produced in calendar order. Each month depends only on its own
//! absolute (year, month), so any element could be computed on its own.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use wip_core::labor::{Department, DepartmentAllocation, Employee, YearMonth};
//! use wip_core::labor::projection::generate_monthly_projections_from;
//!
//! let field = Department::new("Field", true, 1);
//! let emp = Employee::new("Dana Ortiz", 40.0).hired(NaiveDate::from_ymd_opt(2020, 1, 6).unwrap());
//! let allocations = vec![DepartmentAllocation::new(emp.id, field.id, 100.0)];
//!
//! let months = generate_monthly_projections_from(&[emp], &[field], &allocations, YearMonth::new(2024, 6), 3);
//! assert_eq!(months.len(), 3);
//! assert!(months[0].total_hours > 0.0);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::calendar::{months_from, today, YearMonth};
use super::capacity::{
    calculate_loaded_cost_per_hour, calculate_prorated_monthly_hours, department_shares, is_employee_active_in_month,
};
use super::{Department, DepartmentAllocation, Employee};

/// Default projection horizon
pub const DEFAULT_MONTHS_AHEAD: usize = 12;

/// One department's line in a monthly projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentMonth {
    pub department_id: Uuid,
    pub department_name: String,
    pub is_productive: bool,
    /// Employees allocated here and active this month
    pub headcount: usize,
    /// Σ fte × allocation
    pub fte: f64,
    /// Σ prorated hours × allocation
    pub hours: f64,
    /// Σ prorated hours × utilization × allocation
    pub billable_hours: f64,
    /// Σ prorated hours × loaded rate × allocation
    pub cost: f64,
}

/// Workforce hours and cost for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProjection {
    pub year: i32,
    pub month: u32,
    /// Display label (e.g., "Jun 2024")
    pub label: String,
    pub departments: Vec<DepartmentMonth>,
    /// Distinct employees counted this month
    pub headcount: usize,
    pub total_fte: f64,
    pub total_hours: f64,
    pub total_billable_hours: f64,
    pub total_cost: f64,
    /// Hours from productive departments only
    pub productive_hours: f64,
    pub productive_cost: f64,
}

impl MonthlyProjection {
    pub fn year_month(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }
}

/// Project `months_ahead` months starting with the current month.
pub fn generate_monthly_projections(
    employees: &[Employee],
    departments: &[Department],
    allocations: &[DepartmentAllocation],
    months_ahead: usize,
) -> Vec<MonthlyProjection> {
    generate_monthly_projections_from(
        employees,
        departments,
        allocations,
        YearMonth::from_date(today()),
        months_ahead,
    )
}

/// Project `months_ahead` months starting with `start`.
pub fn generate_monthly_projections_from(
    employees: &[Employee],
    departments: &[Department],
    allocations: &[DepartmentAllocation],
    start: YearMonth,
    months_ahead: usize,
) -> Vec<MonthlyProjection> {
    let mut ordered: Vec<&Department> = departments.iter().collect();
    ordered.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));

    debug!(
        start = %start,
        months_ahead,
        employees = employees.len(),
        departments = departments.len(),
        "generating monthly projections"
    );

    months_from(start, months_ahead)
        .map(|ym| project_month(employees, &ordered, allocations, ym))
        .collect()
}

fn project_month(
    employees: &[Employee],
    departments: &[&Department],
    allocations: &[DepartmentAllocation],
    ym: YearMonth,
) -> MonthlyProjection {
    let mut projection = MonthlyProjection {
        year: ym.year,
        month: ym.month,
        label: ym.to_string(),
        departments: Vec::with_capacity(departments.len()),
        headcount: 0,
        total_fte: 0.0,
        total_hours: 0.0,
        total_billable_hours: 0.0,
        total_cost: 0.0,
        productive_hours: 0.0,
        productive_cost: 0.0,
    };
    let mut counted: HashSet<Uuid> = HashSet::new();

    for department in departments {
        let line = project_department(employees, department, allocations, ym, &mut counted);
        projection.total_fte += line.fte;
        projection.total_hours += line.hours;
        projection.total_billable_hours += line.billable_hours;
        projection.total_cost += line.cost;
        if line.is_productive {
            projection.productive_hours += line.hours;
            projection.productive_cost += line.cost;
        }
        projection.departments.push(line);
    }

    projection.headcount = counted.len();
    projection
}

fn project_department(
    employees: &[Employee],
    department: &Department,
    allocations: &[DepartmentAllocation],
    ym: YearMonth,
    counted: &mut HashSet<Uuid>,
) -> DepartmentMonth {
    let mut line = DepartmentMonth {
        department_id: department.id,
        department_name: department.name.clone(),
        is_productive: department.is_productive,
        headcount: 0,
        fte: 0.0,
        hours: 0.0,
        billable_hours: 0.0,
        cost: 0.0,
    };

    let members = department_shares(department.id, allocations)
        .into_iter()
        .filter_map(|(id, share)| employees.iter().find(|e| e.id == id).map(|e| (e, share.as_fraction())))
        .filter(|(e, _)| is_employee_active_in_month(e, ym.year, ym.month));

    for (employee, factor) in members {
        let hours = calculate_prorated_monthly_hours(employee, ym.year, ym.month) * factor;
        let rate = calculate_loaded_cost_per_hour(employee.hourly_rate, employee.burden_multiplier);

        line.headcount += 1;
        line.fte += employee.fte * factor;
        line.hours += hours;
        line.billable_hours += hours * employee.utilization_target;
        line.cost += hours * rate;
        counted.insert(employee.id);
    }
    line
}
