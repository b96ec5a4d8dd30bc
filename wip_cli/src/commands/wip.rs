//! WIP command implementation
//!
//! Prints the WIP schedule for every job in the company file.

use std::io::{self, Write};
use std::path::Path;

use tracing::info;
use wip_core::company::Company;
use wip_core::jobs::summarize_portfolio;
use wip_core::report::{build_wip_report, write_wip_csv, WipReportRow};

use super::{money, open_company};
use crate::{CliError, Result};

/// Run the wip command
pub fn run(path: &Path, format: &str, open_only: bool) -> Result<()> {
    let company = open_company(path)?;
    info!(company = %company.meta.name, format, open_only, "printing WIP schedule");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&company, format, open_only, &mut out)
}

pub(crate) fn render<W: Write>(company: &Company, format: &str, open_only: bool, out: &mut W) -> Result<()> {
    let rows = build_wip_report(company, open_only);
    match format {
        "json" => {
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
        "csv" => write_wip_csv(&rows, out)?,
        "table" => write_table(company, &rows, open_only, out)?,
        other => {
            return Err(CliError::InvalidArgument(format!(
                "Unknown format: {}. Supported: json, csv, table",
                other
            )));
        }
    }
    Ok(())
}

fn write_table<W: Write>(company: &Company, rows: &[WipReportRow], open_only: bool, out: &mut W) -> Result<()> {
    writeln!(out, "{} - WIP Schedule", company.meta.name)?;
    writeln!(
        out,
        "{:<10} {:<24} {:<11} {:>13} {:>13} {:>13} {:>13} {:<12} {:>7} {:>13}",
        "Job", "Name", "Type", "Contract", "Earned", "Invoiced", "Difference", "Billing", "% Comp", "Fcst Profit"
    )?;
    writeln!(out, "{}", "-".repeat(138))?;

    for row in rows {
        writeln!(
            out,
            "{:<10} {:<24} {:<11} {:>13} {:>13} {:>13} {:>13} {:<12} {:>6.1}% {:>13}",
            truncate(&row.job_no, 10),
            truncate(&row.job_name, 24),
            row.job_type,
            money(row.contract),
            money(row.earned_revenue),
            money(row.invoiced),
            money(row.billing_difference),
            row.billing_label,
            row.percent_complete,
            money(row.forecasted_profit),
        )?;
    }

    let jobs = company
        .jobs_sorted()
        .into_iter()
        .filter(|job| !open_only || job.status.is_open());
    let summary = summarize_portfolio(jobs);

    writeln!(out, "{}", "-".repeat(138))?;
    writeln!(
        out,
        "{} jobs | contract {} | earned {} | invoiced {} | over billed {} ({}) | under billed {} ({}) | forecasted profit {}",
        summary.job_count,
        money(summary.contract_total),
        money(summary.earned_total),
        money(summary.invoiced_total),
        money(summary.over_billed_total),
        summary.over_billed_count,
        money(summary.under_billed_total),
        summary.under_billed_count,
        money(summary.forecasted_profit),
    )?;
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}
