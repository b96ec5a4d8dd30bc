//! # Billing Position
//!
//! A coarser over/under billing classification with a tolerance band of 2%
//! of contract value. Used for summaries where a few dollars either way
//! should read as "on target".
//!
//! This is not the authoritative figure for financial reporting; that is
//! [`calculate_billing_difference`], which has no tolerance.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::financials::calculate_billing_difference;
use super::Ledger;
use crate::breakdown::sum_breakdown;

/// Default tolerance band, as a fraction of contract value
pub const BILLING_TOLERANCE_FRACTION: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingPosition {
    OverBilled,
    UnderBilled,
    OnTarget,
}

impl fmt::Display for BillingPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillingPosition::OverBilled => "Over Billed",
            BillingPosition::UnderBilled => "Under Billed",
            BillingPosition::OnTarget => "On Target",
        };
        f.write_str(label)
    }
}

/// Classify with the default 2% band.
pub fn classify_billing_position<L: Ledger + ?Sized>(ledger: &L) -> BillingPosition {
    classify_billing_position_with_tolerance(ledger, BILLING_TOLERANCE_FRACTION)
}

/// Classify with a caller-supplied band (fraction of contract total).
///
/// A job with no contract value has a zero-width band.
pub fn classify_billing_position_with_tolerance<L: Ledger + ?Sized>(
    ledger: &L,
    tolerance_fraction: f64,
) -> BillingPosition {
    let tolerance = sum_breakdown(&ledger.amounts().contract) * tolerance_fraction;
    let difference = calculate_billing_difference(ledger).difference;

    if difference.abs() <= tolerance {
        BillingPosition::OnTarget
    } else if difference > 0.0 {
        BillingPosition::OverBilled
    } else {
        BillingPosition::UnderBilled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakdown::CostBreakdown;
    use crate::jobs::{Job, JobBilling};

    fn job_with_invoiced(invoiced_labor: f64) -> Job {
        let mut job = Job::new("24-300", "Warehouse", "Acme", JobBilling::fixed_price());
        job.amounts.contract = CostBreakdown::new(100_000.0, 0.0, 0.0);
        job.amounts.budget = CostBreakdown::new(80_000.0, 0.0, 0.0);
        job.amounts.costs = CostBreakdown::new(40_000.0, 0.0, 0.0);
        job.amounts.invoiced = CostBreakdown::new(invoiced_labor, 0.0, 0.0);
        job
    }

    #[test]
    fn test_within_band_is_on_target() {
        // Earned is 50,000; band is +/- 2,000
        assert_eq!(classify_billing_position(&job_with_invoiced(51_500.0)), BillingPosition::OnTarget);
        assert_eq!(classify_billing_position(&job_with_invoiced(48_000.0)), BillingPosition::OnTarget);
    }

    #[test]
    fn test_outside_band() {
        assert_eq!(classify_billing_position(&job_with_invoiced(55_000.0)), BillingPosition::OverBilled);
        assert_eq!(classify_billing_position(&job_with_invoiced(40_000.0)), BillingPosition::UnderBilled);
    }

    #[test]
    fn test_custom_tolerance() {
        let job = job_with_invoiced(51_500.0);
        assert_eq!(
            classify_billing_position_with_tolerance(&job, 0.0),
            BillingPosition::OverBilled
        );
    }

    #[test]
    fn test_zero_contract_has_no_band() {
        let mut job = Job::new("24-301", "T&M", "Acme", JobBilling::time_and_material());
        job.amounts.costs = CostBreakdown::new(100.0, 0.0, 0.0);
        // Earned 150, nothing invoiced
        assert_eq!(classify_billing_position(&job), BillingPosition::UnderBilled);
        assert_eq!(BillingPosition::UnderBilled.to_string(), "Under Billed");
    }
}
