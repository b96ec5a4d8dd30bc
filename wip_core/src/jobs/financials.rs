//! # Job Financial Calculator
//!
//! Earned revenue, billing difference, forecasted profit, and percent
//! complete for fixed-price and T&M jobs (and change orders, which share the
//! [`Ledger`] shape).
//!
//! ## Revenue Recognition
//!
//! - **T&M**: revenue follows costs incurred (times markup) or hours worked
//!   (times bill rate). The contract plays no part.
//! - **Fixed price**: revenue is earned per component. Each of labor,
//!   material, and other gets its own percent complete
//!   (`costs / budget`), applied to that component's contract value.
//!
//! None of these functions fail. A zero denominator yields `0` for that term.
//!
//! ## Example
//!
//! ```rust
//! use wip_core::breakdown::CostBreakdown;
//! use wip_core::jobs::{Job, JobBilling, calculate_billing_difference, calculate_forecasted_profit};
//!
//! let mut job = Job::new("24-101", "Library", "City", JobBilling::fixed_price());
//! job.amounts.contract = CostBreakdown::new(100_000.0, 50_000.0, 0.0);
//! job.amounts.budget = CostBreakdown::new(80_000.0, 40_000.0, 0.0);
//! job.amounts.costs = CostBreakdown::new(40_000.0, 20_000.0, 0.0);
//! job.amounts.cost_to_complete = CostBreakdown::new(40_000.0, 20_000.0, 0.0);
//! job.amounts.invoiced = CostBreakdown::new(55_000.0, 20_000.0, 0.0);
//!
//! let billing = calculate_billing_difference(&job);
//! assert_eq!(billing.difference, 0.0);
//! assert_eq!(calculate_forecasted_profit(&job), 30_000.0);
//! ```

use serde::{Deserialize, Serialize};

use super::{JobBilling, LaborBilling, Ledger, LedgerAmounts, TmSettings};
use crate::breakdown::{sum_breakdown, CostBreakdown};

/// Revenue earned to date, by component.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EarnedRevenue {
    pub labor: f64,
    pub material: f64,
    pub other: f64,
    pub total: f64,
}

impl EarnedRevenue {
    fn from_components(labor: f64, material: f64, other: f64) -> Self {
        EarnedRevenue {
            labor,
            material,
            other,
            total: labor + material + other,
        }
    }
}

/// Invoiced minus earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingDifference {
    /// Positive when invoicing runs ahead of earned revenue
    pub difference: f64,
    pub is_over_billed: bool,
    /// "Over Billed" or "Under Billed"
    pub label: String,
}

/// Label for a positive billing difference
pub const OVER_BILLED_LABEL: &str = "Over Billed";
/// Label for a zero or negative billing difference
pub const UNDER_BILLED_LABEL: &str = "Under Billed";

/// Seed settings for a new T&M job: labor markup 1.5, material 1.15,
/// other 1.10.
pub fn default_tm_settings() -> TmSettings {
    TmSettings::default()
}

/// `cost / budget`, or `0` when nothing was budgeted.
fn fraction_of_budget(cost: f64, budget: f64) -> f64 {
    if budget > 0.0 {
        cost / budget
    } else {
        0.0
    }
}

fn earned_time_and_material(costs: &CostBreakdown, tm: &TmSettings) -> EarnedRevenue {
    let labor = match tm.labor {
        LaborBilling::FixedRate { bill_rate, hours } => bill_rate * hours,
        LaborBilling::Markup { markup } => markup.apply(costs.labor),
    };
    EarnedRevenue::from_components(
        labor,
        tm.material_markup.apply(costs.material),
        tm.other_markup.apply(costs.other),
    )
}

fn earned_fixed_price(amounts: &LedgerAmounts) -> EarnedRevenue {
    let earned = amounts
        .contract
        .zip_with(&amounts.costs.zip_with(&amounts.budget, fraction_of_budget), |contract, pct| {
            contract * pct
        });
    EarnedRevenue::from_components(earned.labor, earned.material, earned.other)
}

/// Revenue earned to date.
///
/// # Example
///
/// ```rust
/// use wip_core::breakdown::CostBreakdown;
/// use wip_core::jobs::{Job, JobBilling, LaborBilling, TmSettings, calculate_earned_revenue};
///
/// let tm = TmSettings {
///     labor: LaborBilling::FixedRate { bill_rate: 85.0, hours: 40.0 },
///     ..TmSettings::default()
/// };
/// let mut job = Job::new("24-200", "Service Call", "Acme", JobBilling::TimeAndMaterial(tm));
/// job.amounts.costs = CostBreakdown::new(3000.0, 1000.0, 500.0);
///
/// let earned = calculate_earned_revenue(&job);
/// assert_eq!(earned.labor, 3400.0);
/// assert!((earned.total - 5100.0).abs() < 1e-9);
/// ```
pub fn calculate_earned_revenue<L: Ledger + ?Sized>(ledger: &L) -> EarnedRevenue {
    let amounts = ledger.amounts();
    match ledger.billing() {
        JobBilling::TimeAndMaterial(tm) => earned_time_and_material(&amounts.costs, tm),
        JobBilling::FixedPrice(_) => earned_fixed_price(amounts),
    }
}

/// Invoiced total minus earned revenue. There is no tolerance band here; see
/// [`super::billing`] for the looser classification.
pub fn calculate_billing_difference<L: Ledger + ?Sized>(ledger: &L) -> BillingDifference {
    let earned = calculate_earned_revenue(ledger);
    let difference = sum_breakdown(&ledger.amounts().invoiced) - earned.total;
    let is_over_billed = difference > 0.0;
    BillingDifference {
        difference,
        is_over_billed,
        label: if is_over_billed { OVER_BILLED_LABEL } else { UNDER_BILLED_LABEL }.to_string(),
    }
}

/// Profit expected at completion.
///
/// - T&M: earned revenue minus costs to date
/// - Fixed price: contract minus (costs to date + cost to complete)
pub fn calculate_forecasted_profit<L: Ledger + ?Sized>(ledger: &L) -> f64 {
    let amounts = ledger.amounts();
    match ledger.billing() {
        JobBilling::TimeAndMaterial(_) => {
            calculate_earned_revenue(ledger).total - sum_breakdown(&amounts.costs)
        }
        JobBilling::FixedPrice(_) => {
            sum_breakdown(&amounts.contract)
                - (sum_breakdown(&amounts.costs) + sum_breakdown(&amounts.cost_to_complete))
        }
    }
}

/// Costs to date as a percentage (0-100) of total budget.
///
/// Only meaningful for fixed-price work.
pub fn calculate_percent_complete<L: Ledger + ?Sized>(ledger: &L) -> f64 {
    let amounts = ledger.amounts();
    let total_budget = sum_breakdown(&amounts.budget);
    if total_budget == 0.0 {
        0.0
    } else {
        sum_breakdown(&amounts.costs) / total_budget * 100.0
    }
}

/// Every derived figure for one job, as shown on the WIP schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFinancials {
    pub contract_total: f64,
    pub budget_total: f64,
    pub cost_to_date: f64,
    pub cost_to_complete: f64,
    /// Cost to date plus cost to complete
    pub estimated_total_cost: f64,
    pub earned_revenue: EarnedRevenue,
    pub invoiced_total: f64,
    pub billing: BillingDifference,
    pub percent_complete: f64,
    pub forecasted_profit: f64,
    /// Forecasted profit over contract (fixed price) or earned revenue (T&M)
    pub forecasted_margin: f64,
    /// Contract (fixed price) or earned revenue (T&M) not yet invoiced
    pub remaining_to_bill: f64,
}

/// Bundle every derived figure for a job.
///
/// Built only from the individual calculator functions, so live views and
/// exports always agree.
pub fn calculate_job_financials<L: Ledger + ?Sized>(ledger: &L) -> JobFinancials {
    let amounts = ledger.amounts();
    let contract_total = sum_breakdown(&amounts.contract);
    let cost_to_date = sum_breakdown(&amounts.costs);
    let cost_to_complete = sum_breakdown(&amounts.cost_to_complete);
    let invoiced_total = sum_breakdown(&amounts.invoiced);
    let earned_revenue = calculate_earned_revenue(ledger);
    let forecasted_profit = calculate_forecasted_profit(ledger);

    let revenue_basis = match ledger.billing() {
        JobBilling::FixedPrice(_) => contract_total,
        JobBilling::TimeAndMaterial(_) => earned_revenue.total,
    };
    let forecasted_margin = if revenue_basis > 0.0 {
        forecasted_profit / revenue_basis * 100.0
    } else {
        0.0
    };

    JobFinancials {
        contract_total,
        budget_total: sum_breakdown(&amounts.budget),
        cost_to_date,
        cost_to_complete,
        estimated_total_cost: cost_to_date + cost_to_complete,
        earned_revenue,
        invoiced_total,
        billing: calculate_billing_difference(ledger),
        percent_complete: calculate_percent_complete(ledger),
        forecasted_profit,
        forecasted_margin,
        remaining_to_bill: revenue_basis - invoiced_total,
    }
}
