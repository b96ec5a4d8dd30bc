//! # WIP Schedule Report
//!
//! One row per job, built from [`calculate_job_financials`] so the exported
//! schedule always matches what the live views show. Rows serialize to CSV
//! via the `csv` crate.
//!
//! ## Example
//!
//! ```rust
//! use wip_core::company::Company;
//! use wip_core::jobs::{Job, JobBilling};
//! use wip_core::report::{build_wip_report, write_wip_csv};
//!
//! let mut company = Company::new("Oakdale Builders");
//! company.add_job(Job::new("24-101", "Library", "City", JobBilling::fixed_price()));
//!
//! let rows = build_wip_report(&company, false);
//! let mut out = Vec::new();
//! write_wip_csv(&rows, &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().starts_with("job_no,"));
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::company::Company;
use crate::errors::{CalcError, CalcResult};
use crate::jobs::{
    calculate_job_financials, change_order_rollup, classify_billing_position_with_tolerance, BillingPosition, Job,
};

/// One line of the WIP schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WipReportRow {
    pub job_no: String,
    pub job_name: String,
    pub client: String,
    pub job_type: String,
    pub status: String,
    pub contract: f64,
    /// Contract value of approved and completed change orders
    pub approved_change_orders: f64,
    pub budget: f64,
    pub cost_to_date: f64,
    pub cost_to_complete: f64,
    pub percent_complete: f64,
    pub earned_revenue: f64,
    pub invoiced: f64,
    pub billing_difference: f64,
    pub billing_label: String,
    pub billing_position: BillingPosition,
    pub forecasted_profit: f64,
    pub forecasted_margin: f64,
}

fn report_row(company: &Company, job: &Job) -> WipReportRow {
    let financials = calculate_job_financials(job);
    let change_orders = change_order_rollup(company.change_orders_for(&job.id));
    WipReportRow {
        job_no: job.job_no.clone(),
        job_name: job.job_name.clone(),
        client: job.client.clone(),
        job_type: job.job_type().label().to_string(),
        status: job.status.label().to_string(),
        contract: financials.contract_total,
        approved_change_orders: change_orders.approved_contract.total(),
        budget: financials.budget_total,
        cost_to_date: financials.cost_to_date,
        cost_to_complete: financials.cost_to_complete,
        percent_complete: financials.percent_complete,
        earned_revenue: financials.earned_revenue.total,
        invoiced: financials.invoiced_total,
        billing_difference: financials.billing.difference,
        billing_label: financials.billing.label,
        billing_position: classify_billing_position_with_tolerance(job, company.settings.billing_tolerance),
        forecasted_profit: financials.forecasted_profit,
        forecasted_margin: financials.forecasted_margin,
    }
}

/// Build the schedule, sorted by job number.
///
/// With `open_only`, jobs that are bidding, completed, or closed are left out.
pub fn build_wip_report(company: &Company, open_only: bool) -> Vec<WipReportRow> {
    let rows: Vec<WipReportRow> = company
        .jobs_sorted()
        .into_iter()
        .filter(|job| !open_only || job.status.is_open())
        .map(|job| report_row(company, job))
        .collect();
    debug!(rows = rows.len(), open_only, "built WIP report");
    rows
}

/// Write rows as CSV with a header line.
pub fn write_wip_csv<W: Write>(rows: &[WipReportRow], writer: W) -> CalcResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(|e| CalcError::file_error("flush", "csv", e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakdown::CostBreakdown;
    use crate::jobs::{
        calculate_billing_difference, calculate_earned_revenue, ChangeOrder, ChangeOrderStatus, JobBilling, JobStatus,
    };
    use chrono::Utc;

    fn company() -> Company {
        let mut company = Company::new("Oakdale Builders");

        let mut library = Job::new("24-101", "Library", "City", JobBilling::fixed_price());
        library.amounts.contract = CostBreakdown::new(100_000.0, 50_000.0, 0.0);
        library.amounts.budget = CostBreakdown::new(80_000.0, 40_000.0, 0.0);
        library.amounts.costs = CostBreakdown::new(40_000.0, 20_000.0, 0.0);
        library.amounts.invoiced = CostBreakdown::new(55_000.0, 20_000.0, 0.0);
        library.amounts.cost_to_complete = CostBreakdown::new(40_000.0, 20_000.0, 0.0);
        let library_id = company.add_job(library);

        let mut closed = Job::new("23-050", "Old Job", "Acme", JobBilling::time_and_material());
        closed.status = JobStatus::Closed;
        company.add_job(closed);

        let mut co = ChangeOrder::new(library_id, "CO-001", JobBilling::fixed_price());
        co.amounts.contract = CostBreakdown::new(5_000.0, 0.0, 0.0);
        co.set_status(ChangeOrderStatus::Approved, Utc::now());
        company.add_change_order(co).unwrap();

        company
    }

    #[test]
    fn test_rows_match_calculator() {
        let company = company();
        let rows = build_wip_report(&company, false);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].job_no, "23-050");

        let library_row = &rows[1];
        let library = company.jobs.values().find(|j| j.job_no == "24-101").unwrap();
        assert_eq!(library_row.earned_revenue, calculate_earned_revenue(library).total);
        assert_eq!(library_row.billing_difference, calculate_billing_difference(library).difference);
        assert_eq!(library_row.forecasted_profit, 30_000.0);
        assert_eq!(library_row.approved_change_orders, 5_000.0);
        assert_eq!(library_row.billing_position, BillingPosition::OnTarget);
        assert_eq!(library_row.job_type, "Fixed Price");
    }

    #[test]
    fn test_open_only_filter() {
        let rows = build_wip_report(&company(), true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].job_no, "24-101");
    }

    #[test]
    fn test_csv_output() {
        let rows = build_wip_report(&company(), true);
        let mut out = Vec::new();
        write_wip_csv(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("job_no,job_name,client,job_type"));
        assert!(header.contains("billing_position"));
        let line = lines.next().unwrap();
        assert!(line.starts_with("24-101,Library,City,Fixed Price,Active,150000.0"));
        assert!(line.contains("on-target"));
        assert!(lines.next().is_none());
    }
}
