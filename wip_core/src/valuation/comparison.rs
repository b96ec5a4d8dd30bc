//! Side-by-side scenario comparison.

use serde::{Deserialize, Serialize};

use super::{calculate_valuation, Valuation};

/// A row in the comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioMetric {
    AdjustedEbitda,
    BusinessValue,
    Multiple,
    EbitdaMargin,
    ValueToRevenue,
    AnnualRevenue,
    NetProfit,
    TotalAddbacks,
}

impl ScenarioMetric {
    /// Display order of the comparison table
    pub const ALL: [ScenarioMetric; 8] = [
        ScenarioMetric::AdjustedEbitda,
        ScenarioMetric::BusinessValue,
        ScenarioMetric::Multiple,
        ScenarioMetric::EbitdaMargin,
        ScenarioMetric::ValueToRevenue,
        ScenarioMetric::AnnualRevenue,
        ScenarioMetric::NetProfit,
        ScenarioMetric::TotalAddbacks,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScenarioMetric::AdjustedEbitda => "Adjusted EBITDA",
            ScenarioMetric::BusinessValue => "Business Value",
            ScenarioMetric::Multiple => "Multiple",
            ScenarioMetric::EbitdaMargin => "EBITDA Margin %",
            ScenarioMetric::ValueToRevenue => "Value / Revenue %",
            ScenarioMetric::AnnualRevenue => "Annual Revenue",
            ScenarioMetric::NetProfit => "Net Profit",
            ScenarioMetric::TotalAddbacks => "Total Add-backs",
        }
    }

    fn extract(self, valuation: &Valuation) -> f64 {
        let result = calculate_valuation(valuation);
        match self {
            ScenarioMetric::AdjustedEbitda => result.adjusted_ebitda,
            ScenarioMetric::BusinessValue => result.business_value,
            ScenarioMetric::Multiple => valuation.multiple,
            ScenarioMetric::EbitdaMargin => result.ebitda_margin,
            ScenarioMetric::ValueToRevenue => result.value_to_revenue,
            ScenarioMetric::AnnualRevenue => valuation.annual_revenue,
            ScenarioMetric::NetProfit => valuation.net_profit,
            ScenarioMetric::TotalAddbacks => valuation.total_addbacks(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub metric: ScenarioMetric,
    pub label: String,
    /// One value per scenario, in input order
    pub values: Vec<f64>,
    pub max: f64,
    pub min: f64,
    /// `values[0] - values[1]`, only when exactly two scenarios are compared
    pub delta: Option<f64>,
}

/// Build a metric-by-scenario table. No scenarios, no rows.
pub fn compare_scenarios(valuations: &[Valuation]) -> Vec<ComparisonRow> {
    if valuations.is_empty() {
        return Vec::new();
    }

    ScenarioMetric::ALL
        .iter()
        .map(|&metric| {
            let values: Vec<f64> = valuations.iter().map(|v| metric.extract(v)).collect();
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let delta = match values.as_slice() {
                [first, second] => Some(first - second),
                _ => None,
            };
            ComparisonRow {
                metric,
                label: metric.label().to_string(),
                values,
                max,
                min,
                delta,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn valuation(name: &str, net_profit: f64, multiple: f64) -> Valuation {
        let mut v = Valuation::new(name);
        v.annual_revenue = 1_000_000.0;
        v.net_profit = net_profit;
        v.owner_compensation = 50_000.0;
        v.multiple = multiple;
        v
    }

    #[test]
    fn test_two_scenarios_have_delta() {
        let rows = compare_scenarios(&[valuation("A", 150_000.0, 4.0), valuation("B", 100_000.0, 3.0)]);
        assert_eq!(rows.len(), ScenarioMetric::ALL.len());
        assert_eq!(rows[0].metric, ScenarioMetric::AdjustedEbitda);

        let value = &rows[1];
        assert_eq!(value.metric, ScenarioMetric::BusinessValue);
        assert_relative_eq!(value.values[0], 800_000.0);
        assert_relative_eq!(value.values[1], 450_000.0);
        assert_relative_eq!(value.delta.unwrap(), 350_000.0);
        assert_relative_eq!(value.max, 800_000.0);
        assert_relative_eq!(value.min, 450_000.0);
    }

    #[test]
    fn test_three_scenarios_have_no_delta() {
        let rows = compare_scenarios(&[
            valuation("A", 100_000.0, 3.0),
            valuation("B", 120_000.0, 3.5),
            valuation("C", 90_000.0, 2.5),
        ]);
        let multiple = rows.iter().find(|r| r.metric == ScenarioMetric::Multiple).unwrap();
        assert_eq!(multiple.delta, None);
        assert_eq!(multiple.max, 3.5);
        assert_eq!(multiple.min, 2.5);
        assert_eq!(multiple.label, "Multiple");
    }

    #[test]
    fn test_single_and_empty() {
        assert!(compare_scenarios(&[]).is_empty());
        let rows = compare_scenarios(&[valuation("Only", 10.0, 1.0)]);
        assert!(rows.iter().all(|r| r.delta.is_none() && r.max == r.min));
    }
}
