//! Capacity command implementation
//!
//! Department summaries for the employees active on a date, followed by the
//! month-by-month labor projection.

use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;
use wip_core::company::Company;
use wip_core::labor::calendar::{today, YearMonth};
use wip_core::labor::capacity::calculate_department_summary_as_of;
use wip_core::labor::projection::generate_monthly_projections_from;

use super::{money, open_company};
use crate::{CliError, Result};

/// Run the capacity command
pub fn run(path: &Path, months: Option<usize>, start: Option<&str>, as_of: Option<&str>) -> Result<()> {
    let company = open_company(path)?;

    let as_of = as_of.map(parse_date).transpose()?.unwrap_or_else(today);
    let start = match start {
        Some(text) => parse_year_month(text)?,
        None => YearMonth::from_date(as_of),
    };
    let months = months.unwrap_or(company.settings.projection_months);

    info!(company = %company.meta.name, %as_of, %start, months, "printing capacity");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&company, as_of, start, months, &mut out)
}

pub(crate) fn render<W: Write>(
    company: &Company,
    as_of: NaiveDate,
    start: YearMonth,
    months: usize,
    out: &mut W,
) -> Result<()> {
    let employees = company.employee_list();
    let departments = company.department_list();
    let allocations = company.allocation_list();

    writeln!(out, "{} - Department Capacity as of {}", company.meta.name, as_of)?;
    writeln!(
        out,
        "{:<20} {:>5} {:>7} {:>11} {:>11} {:>13} {:>10}",
        "Department", "Staff", "FTE", "Annual Hrs", "Billable", "Annual Cost", "Avg Rate"
    )?;
    writeln!(out, "{}", "-".repeat(83))?;
    for department in &departments {
        let summary = calculate_department_summary_as_of(department, &employees, &allocations, as_of);
        writeln!(
            out,
            "{:<20} {:>5} {:>7.2} {:>11.0} {:>11.0} {:>13} {:>10.2}",
            summary.department_name,
            summary.employee_count,
            summary.total_fte,
            summary.total_annual_hours,
            summary.total_billable_hours,
            money(summary.total_annual_cost),
            summary.avg_loaded_rate,
        )?;
    }

    let projections = generate_monthly_projections_from(&employees, &departments, &allocations, start, months);

    writeln!(out)?;
    writeln!(out, "Monthly Projection")?;
    writeln!(
        out,
        "{:<10} {:>5} {:>7} {:>10} {:>10} {:>13} {:>11}",
        "Month", "Staff", "FTE", "Hours", "Billable", "Cost", "Productive"
    )?;
    writeln!(out, "{}", "-".repeat(71))?;
    for month in &projections {
        writeln!(
            out,
            "{:<10} {:>5} {:>7.2} {:>10.0} {:>10.0} {:>13} {:>11.0}",
            month.label,
            month.headcount,
            month.total_fte,
            month.total_hours,
            month.total_billable_hours,
            money(month.total_cost),
            month.productive_hours,
        )?;
    }
    Ok(())
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| CliError::InvalidArgument(format!("Invalid date '{}': {} (expected YYYY-MM-DD)", text, e)))
}

fn parse_year_month(text: &str) -> Result<YearMonth> {
    NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d")
        .map(YearMonth::from_date)
        .map_err(|_| CliError::InvalidArgument(format!("Invalid month '{}' (expected YYYY-MM)", text)))
}
