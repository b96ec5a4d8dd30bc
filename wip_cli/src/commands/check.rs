//! Check command implementation
//!
//! Runs the advisory record checks over a company file: job and employee
//! form validation, department allocations totalling 100% per employee, and
//! at most one current valuation. Exits with an error when anything fails.

use std::io::{self, Write};
use std::path::Path;

use tracing::{info, warn};
use wip_core::company::Company;
use wip_core::labor::validate_employee_allocations;

use super::open_company;
use crate::{CliError, Result};

/// Run the check command
pub fn run(path: &Path) -> Result<()> {
    let company = open_company(path)?;
    info!(company = %company.meta.name, "checking company file");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let failures = render(&company, &mut out)?;
    if failures > 0 {
        return Err(CliError::CheckFailed(failures));
    }
    Ok(())
}

/// Write one line per problem and return how many were found.
pub(crate) fn render<W: Write>(company: &Company, out: &mut W) -> Result<usize> {
    let mut failures = 0;
    let allocations = company.allocation_list();

    for job in company.jobs_sorted() {
        if let Err(e) = job.validate() {
            warn!(job_no = %job.job_no, error = %e, "job failed validation");
            writeln!(out, "Job {}: {}", job.job_no, e)?;
            failures += 1;
        }
    }

    for employee in company.employee_list() {
        if let Err(e) = employee.validate() {
            warn!(employee = %employee.name, error = %e, "employee failed validation");
            writeln!(out, "Employee {}: {}", employee.name, e)?;
            failures += 1;
        }

        let check = validate_employee_allocations(employee.id, &allocations);
        if !check.is_valid {
            warn!(employee = %employee.name, total = check.total.value(), "allocations do not total 100%");
            writeln!(out, "Employee {}: {}", employee.name, check.message)?;
            failures += 1;
        }
    }

    let current = company.current_valuation_count();
    if current > 1 {
        let chosen = company.current_valuation().map(|v| v.name.as_str()).unwrap_or_default();
        warn!(current, chosen, "more than one current valuation");
        writeln!(out, "Valuations: {} are marked current; showing {}", current, chosen)?;
        failures += 1;
    }

    if failures == 0 {
        writeln!(
            out,
            "OK: {} jobs, {} employees, {} allocations",
            company.jobs.len(),
            company.employees.len(),
            company.allocations.len()
        )?;
    }
    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wip_core::jobs::{Job, JobBilling};
    use wip_core::labor::{Department, DepartmentAllocation, Employee};
    use wip_core::valuation::Valuation;

    fn render_to_string(company: &Company) -> (usize, String) {
        let mut out = Vec::new();
        let failures = render(company, &mut out).unwrap();
        (failures, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_clean_company() {
        let mut company = Company::new("Oakdale Builders");
        company.add_job(Job::new("24-101", "Library", "City", JobBilling::fixed_price()));
        let field = company.add_department(Department::new("Field", true, 1));
        let emp = company.add_employee(Employee::new("Foreman", 40.0));
        company.allocate(DepartmentAllocation::new(emp, field, 100.0)).unwrap();
        company.add_employee(Employee::new("Unallocated", 30.0));

        let (failures, text) = render_to_string(&company);
        assert_eq!(failures, 0);
        assert_eq!(text.trim(), "OK: 1 jobs, 2 employees, 1 allocations");
    }

    #[test]
    fn test_reports_each_problem() {
        let mut company = Company::new("Oakdale Builders");
        company.add_job(Job::new("24-101", "", "City", JobBilling::fixed_price()));
        let field = company.add_department(Department::new("Field", true, 1));
        let office = company.add_department(Department::new("Office", false, 2));
        let emp = company.add_employee(Employee::new("Estimator", 35.0));
        company.allocate(DepartmentAllocation::new(emp, field, 60.0)).unwrap();
        company.allocate(DepartmentAllocation::new(emp, office, 30.0)).unwrap();

        let (failures, text) = render_to_string(&company);
        assert_eq!(failures, 2);
        assert!(text.contains("Job 24-101: Missing required field: job_name"));
        assert!(text.contains("Employee Estimator: Allocations total 90.0% but must equal 100%"));
        assert!(!text.contains("OK:"));
    }

    #[test]
    fn test_reports_several_current_valuations() {
        let mut company = Company::new("Oakdale Builders");
        for (name, year) in [("FY2023", 2023), ("FY2024", 2024)] {
            let mut v = Valuation::new(name);
            v.valuation_date = chrono::NaiveDate::from_ymd_opt(year, 12, 31);
            v.is_current = true;
            company.valuations.insert(v.id, v);
        }

        let (failures, text) = render_to_string(&company);
        assert_eq!(failures, 1);
        assert!(text.contains("Valuations: 2 are marked current; showing FY2024"));
    }
}
