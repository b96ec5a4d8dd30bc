//! Totals across a set of jobs, for the WIP schedule footer.

use serde::{Deserialize, Serialize};

use super::financials::calculate_job_financials;
use super::Job;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub job_count: usize,
    pub contract_total: f64,
    pub earned_total: f64,
    pub invoiced_total: f64,
    pub cost_to_date: f64,
    /// Invoiced minus earned, netted across jobs
    pub net_billing_difference: f64,
    /// Sum of positive billing differences
    pub over_billed_total: f64,
    /// Sum of negative billing differences, as a positive amount
    pub under_billed_total: f64,
    pub over_billed_count: usize,
    pub under_billed_count: usize,
    pub forecasted_profit: f64,
}

pub fn summarize_portfolio<'a>(jobs: impl IntoIterator<Item = &'a Job>) -> PortfolioSummary {
    jobs.into_iter().fold(PortfolioSummary::default(), |mut acc, job| {
        let f = calculate_job_financials(job);
        acc.job_count += 1;
        acc.contract_total += f.contract_total;
        acc.earned_total += f.earned_revenue.total;
        acc.invoiced_total += f.invoiced_total;
        acc.cost_to_date += f.cost_to_date;
        acc.net_billing_difference += f.billing.difference;
        if f.billing.is_over_billed {
            acc.over_billed_total += f.billing.difference;
            acc.over_billed_count += 1;
        } else {
            acc.under_billed_total -= f.billing.difference;
            acc.under_billed_count += 1;
        }
        acc.forecasted_profit += f.forecasted_profit;
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakdown::CostBreakdown;
    use crate::jobs::JobBilling;
    use approx::assert_relative_eq;

    #[test]
    fn test_portfolio_totals() {
        let mut over = Job::new("1", "Over", "A", JobBilling::fixed_price());
        over.amounts.contract = CostBreakdown::new(100.0, 0.0, 0.0);
        over.amounts.budget = CostBreakdown::new(50.0, 0.0, 0.0);
        over.amounts.costs = CostBreakdown::new(25.0, 0.0, 0.0);
        over.amounts.invoiced = CostBreakdown::new(70.0, 0.0, 0.0);

        let mut under = Job::new("2", "Under", "B", JobBilling::time_and_material());
        under.amounts.costs = CostBreakdown::new(100.0, 0.0, 0.0);
        under.amounts.invoiced = CostBreakdown::new(100.0, 0.0, 0.0);

        let summary = summarize_portfolio(&[over, under]);
        assert_eq!(summary.job_count, 2);
        assert_relative_eq!(summary.earned_total, 200.0);
        assert_relative_eq!(summary.over_billed_total, 20.0);
        assert_relative_eq!(summary.under_billed_total, 50.0);
        assert_relative_eq!(summary.net_billing_difference, -30.0);
        assert_eq!(summary.over_billed_count, 1);
        assert_eq!(summary.under_billed_count, 1);
    }

    #[test]
    fn test_empty_portfolio() {
        let jobs: Vec<Job> = Vec::new();
        let summary = summarize_portfolio(&jobs);
        assert_eq!(summary, PortfolioSummary::default());
    }
}
