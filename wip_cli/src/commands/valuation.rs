//! Valuation command implementation

use std::io::{self, Write};
use std::path::Path;

use tracing::{info, warn};
use wip_core::company::Company;
use wip_core::valuation::{calculate_valuation, compare_scenarios, ScenarioMetric, Valuation};

use super::{money, open_company};
use crate::Result;

/// Run the valuation command
pub fn run(path: &Path, compare: bool) -> Result<()> {
    let company = open_company(path)?;
    info!(company = %company.meta.name, scenarios = company.valuations.len(), compare, "printing valuation");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&company, compare, &mut out)
}

pub(crate) fn render<W: Write>(company: &Company, compare: bool, out: &mut W) -> Result<()> {
    match company.current_valuation() {
        Some(current) => write_current(current, out)?,
        None => {
            warn!(company = %company.meta.name, "no current valuation");
            writeln!(out, "No current valuation")?;
        }
    }

    if compare {
        writeln!(out)?;
        write_comparison(&scenarios(company), out)?;
    }
    Ok(())
}

/// Scenarios ordered by valuation date, undated last, then by name.
fn scenarios(company: &Company) -> Vec<Valuation> {
    let mut scenarios: Vec<Valuation> = company.valuations.values().cloned().collect();
    scenarios.sort_by(|a, b| {
        let key = |v: &Valuation| (v.valuation_date.is_none(), v.valuation_date);
        key(a).cmp(&key(b)).then_with(|| a.name.cmp(&b.name))
    });
    scenarios
}

fn write_current<W: Write>(valuation: &Valuation, out: &mut W) -> Result<()> {
    let result = calculate_valuation(valuation);
    writeln!(out, "Current valuation: {}", valuation.name)?;
    writeln!(out, "  Annual revenue     {:>15}", money(valuation.annual_revenue))?;
    writeln!(out, "  Net profit         {:>15}", money(valuation.net_profit))?;
    writeln!(out, "  Add-backs          {:>15}", money(valuation.total_addbacks()))?;
    writeln!(out, "  Adjusted EBITDA    {:>15}", money(result.adjusted_ebitda))?;
    writeln!(out, "  Multiple           {:>14.2}x", valuation.multiple)?;
    writeln!(out, "  Business value     {:>15}", money(result.business_value))?;
    writeln!(out, "  EBITDA margin      {:>14.1}%", result.ebitda_margin)?;
    writeln!(out, "  Value / revenue    {:>14.1}%", result.value_to_revenue)?;
    Ok(())
}

fn write_comparison<W: Write>(scenarios: &[Valuation], out: &mut W) -> Result<()> {
    let rows = compare_scenarios(scenarios);
    if rows.is_empty() {
        writeln!(out, "No valuation scenarios to compare")?;
        return Ok(());
    }

    let show_delta = rows.iter().any(|row| row.delta.is_some());
    write!(out, "{:<20}", "Metric")?;
    for scenario in scenarios {
        write!(out, " {:>15}", scenario.name)?;
    }
    if show_delta {
        write!(out, " {:>15}", "Delta")?;
    }
    writeln!(out)?;

    for row in &rows {
        write!(out, "{:<20}", row.label)?;
        for value in &row.values {
            write!(out, " {:>15}", format_metric(row.metric, *value))?;
        }
        if let Some(delta) = row.delta {
            write!(out, " {:>15}", format_metric(row.metric, delta))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn format_metric(metric: ScenarioMetric, value: f64) -> String {
    match metric {
        ScenarioMetric::EbitdaMargin | ScenarioMetric::ValueToRevenue => format!("{:.1}%", value),
        ScenarioMetric::Multiple => format!("{:.2}x", value),
        _ => money(value),
    }
}
