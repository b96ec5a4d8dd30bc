//! # Jobs
//!
//! Jobs and change orders, and the financial calculator that runs over both.
//! Each module follows the same pattern:
//!
//! - plain records holding raw, user-entered figures (JSON-serializable)
//! - pure functions that derive everything else on read
//!
//! Derived figures are never stored on the record, so they cannot drift from
//! the inputs they came from.
//!
//! ## Available Modules
//!
//! - [`financials`] - Earned revenue, billing difference, forecasted profit
//! - [`billing`] - Tolerance-band billing position classification
//! - [`change_order`] - Change orders and their status lifecycle
//! - [`portfolio`] - Totals across a set of jobs

pub mod billing;
pub mod change_order;
pub mod financials;
pub mod portfolio;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::breakdown::CostBreakdown;
use crate::errors::{CalcError, CalcResult};
use crate::units::{Multiplier, Percent};

// Re-export commonly used types
pub use billing::{classify_billing_position, classify_billing_position_with_tolerance, BillingPosition};
pub use change_order::{change_order_rollup, ChangeOrder, ChangeOrderRollup, ChangeOrderStatus};
pub use financials::{
    calculate_billing_difference, calculate_earned_revenue, calculate_forecasted_profit,
    calculate_job_financials, calculate_percent_complete, default_tm_settings, BillingDifference,
    EarnedRevenue, JobFinancials,
};
pub use portfolio::{summarize_portfolio, PortfolioSummary};

/// Anything costed like a job: it has a billing model and the five
/// breakdowns. Implemented by [`Job`] and [`ChangeOrder`] so both go through
/// the same calculator.
pub trait Ledger {
    fn billing(&self) -> &JobBilling;
    fn amounts(&self) -> &LedgerAmounts;
}

/// The five breakdowns carried by every job and change order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerAmounts {
    /// Contract value (fixed-price) or not-to-exceed figure
    #[serde(default)]
    pub contract: CostBreakdown,

    /// Original estimate of cost
    #[serde(default)]
    pub budget: CostBreakdown,

    /// Costs incurred to date
    #[serde(default)]
    pub costs: CostBreakdown,

    /// Amount invoiced to date
    #[serde(default)]
    pub invoiced: CostBreakdown,

    /// Estimated remaining cost
    #[serde(default)]
    pub cost_to_complete: CostBreakdown,
}

/// Billing model tag, for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FixedPrice,
    #[serde(rename = "time-material")]
    TimeMaterial,
}

impl JobType {
    pub fn label(self) -> &'static str {
        match self {
            JobType::FixedPrice => "Fixed Price",
            JobType::TimeMaterial => "T&M",
        }
    }
}

/// How a job is billed.
///
/// T&M settings exist only on T&M jobs, and profit targets only on
/// fixed-price jobs.
///
/// ## JSON Example
///
/// ```json
/// {
///   "job_type": "time-material",
///   "labor": { "labor_billing_type": "fixed-rate", "bill_rate": 85.0, "hours": 40.0 },
///   "material_markup": 1.15,
///   "other_markup": 1.1
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "job_type")]
pub enum JobBilling {
    #[serde(rename = "fixed-price")]
    FixedPrice(FixedPriceTerms),
    #[serde(rename = "time-material")]
    TimeAndMaterial(TmSettings),
}

impl JobBilling {
    /// Fixed-price billing with no profit target set
    pub fn fixed_price() -> Self {
        JobBilling::FixedPrice(FixedPriceTerms::default())
    }

    /// T&M billing seeded with the default markups
    pub fn time_and_material() -> Self {
        JobBilling::TimeAndMaterial(TmSettings::default())
    }

    pub fn job_type(&self) -> JobType {
        match self {
            JobBilling::FixedPrice(_) => JobType::FixedPrice,
            JobBilling::TimeAndMaterial(_) => JobType::TimeMaterial,
        }
    }

    pub fn tm_settings(&self) -> Option<&TmSettings> {
        match self {
            JobBilling::TimeAndMaterial(tm) => Some(tm),
            JobBilling::FixedPrice(_) => None,
        }
    }
}

impl Default for JobBilling {
    fn default() -> Self {
        JobBilling::fixed_price()
    }
}

/// Profit targets for a fixed-price job.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FixedPriceTerms {
    #[serde(default)]
    pub target_profit: Option<f64>,
    #[serde(default)]
    pub target_margin: Option<Percent>,
}

/// T&M billing settings.
///
/// Markups are multipliers (`1.5` = 50% markup), never raw percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TmSettings {
    pub labor: LaborBilling,
    pub material_markup: Multiplier,
    pub other_markup: Multiplier,
}

impl Default for TmSettings {
    fn default() -> Self {
        TmSettings {
            labor: LaborBilling::Markup {
                markup: DEFAULT_LABOR_MARKUP,
            },
            material_markup: DEFAULT_MATERIAL_MARKUP,
            other_markup: DEFAULT_OTHER_MARKUP,
        }
    }
}

/// How T&M labor revenue is earned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "labor_billing_type", rename_all = "kebab-case")]
pub enum LaborBilling {
    /// Labor cost times a markup
    Markup { markup: Multiplier },
    /// Hours worked times a bill rate; labor cost is ignored
    FixedRate { bill_rate: f64, hours: f64 },
}

/// Default T&M labor markup
pub const DEFAULT_LABOR_MARKUP: Multiplier = Multiplier(1.5);
/// Default T&M material markup
pub const DEFAULT_MATERIAL_MARKUP: Multiplier = Multiplier(1.15);
/// Default T&M other markup
pub const DEFAULT_OTHER_MARKUP: Multiplier = Multiplier(1.10);

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Bidding,
    #[default]
    Active,
    OnHold,
    Completed,
    Closed,
}

impl JobStatus {
    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Bidding => "Bidding",
            JobStatus::Active => "Active",
            JobStatus::OnHold => "On Hold",
            JobStatus::Completed => "Completed",
            JobStatus::Closed => "Closed",
        }
    }

    /// Whether the job belongs on the open WIP schedule
    pub fn is_open(self) -> bool {
        matches!(self, JobStatus::Active | JobStatus::OnHold)
    }
}

/// A job: the unit of cost accounting.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "3f6c1a9e-0000-4000-8000-000000000001",
///   "job_no": "24-101",
///   "job_name": "Library Renovation",
///   "client": "City of Oakdale",
///   "status": "active",
///   "billing": { "job_type": "fixed-price", "target_profit": 30000.0, "target_margin": 20.0 },
///   "contract": { "labor": 100000.0, "material": 50000.0, "other": 0.0 },
///   "budget": { "labor": 80000.0, "material": 40000.0, "other": 0.0 },
///   "costs": { "labor": 40000.0, "material": 20000.0, "other": 0.0 },
///   "invoiced": { "labor": 55000.0, "material": 20000.0, "other": 0.0 },
///   "cost_to_complete": { "labor": 40000.0, "material": 20000.0, "other": 0.0 },
///   "as_of_date": "2024-06-30"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,

    /// Job number (e.g., "24-101")
    pub job_no: String,

    pub job_name: String,

    pub client: String,

    #[serde(default)]
    pub status: JobStatus,

    pub billing: JobBilling,

    #[serde(flatten)]
    pub amounts: LedgerAmounts,

    /// Date the cost and invoice figures were last brought current
    #[serde(default)]
    pub as_of_date: Option<NaiveDate>,
}

impl Job {
    /// Create a job with all breakdowns zeroed.
    pub fn new(
        job_no: impl Into<String>,
        job_name: impl Into<String>,
        client: impl Into<String>,
        billing: JobBilling,
    ) -> Self {
        Job {
            id: Uuid::new_v4(),
            job_no: job_no.into(),
            job_name: job_name.into(),
            client: client.into(),
            status: JobStatus::default(),
            billing,
            amounts: LedgerAmounts::default(),
            as_of_date: None,
        }
    }

    pub fn job_type(&self) -> JobType {
        self.billing.job_type()
    }

    /// Form-level required-field checks.
    ///
    /// Advisory only: none of the calculators call this.
    pub fn validate(&self) -> CalcResult<()> {
        if self.job_no.trim().is_empty() {
            return Err(CalcError::missing_field("job_no"));
        }
        if self.job_name.trim().is_empty() {
            return Err(CalcError::missing_field("job_name"));
        }
        if let JobBilling::TimeAndMaterial(TmSettings {
            labor: LaborBilling::FixedRate { bill_rate, hours },
            ..
        }) = self.billing
        {
            if bill_rate < 0.0 || hours < 0.0 {
                return Err(CalcError::invalid_input(
                    "labor",
                    format!("{bill_rate} x {hours}"),
                    "Bill rate and hours must not be negative",
                ));
            }
        }
        Ok(())
    }
}

impl Ledger for Job {
    fn billing(&self) -> &JobBilling {
        &self.billing
    }

    fn amounts(&self) -> &LedgerAmounts {
        &self.amounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_defaults() {
        let job = Job::new("24-101", "Library", "City", JobBilling::fixed_price());
        assert_eq!(job.status, JobStatus::Active);
        assert_eq!(job.job_type(), JobType::FixedPrice);
        assert_eq!(job.amounts.contract, CostBreakdown::zero());
        assert!(job.billing.tm_settings().is_none());
        assert!(job.validate().is_ok());
    }

    #[test]
    fn test_default_tm_settings() {
        let billing = JobBilling::time_and_material();
        let tm = billing.tm_settings().unwrap();
        assert_eq!(tm.labor, LaborBilling::Markup { markup: Multiplier(1.5) });
        assert_eq!(tm.material_markup, Multiplier(1.15));
        assert_eq!(tm.other_markup, Multiplier(1.10));
    }

    #[test]
    fn test_validate_required_fields() {
        let job = Job::new("", "Library", "City", JobBilling::fixed_price());
        assert_eq!(job.validate(), Err(CalcError::missing_field("job_no")));

        let mut job = Job::new("24-102", "Shop", "Acme", JobBilling::time_and_material());
        job.billing = JobBilling::TimeAndMaterial(TmSettings {
            labor: LaborBilling::FixedRate { bill_rate: -5.0, hours: 10.0 },
            ..TmSettings::default()
        });
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_job_json_shape() {
        let mut job = Job::new("24-103", "Clinic", "Health Co", JobBilling::time_and_material());
        job.amounts.costs = CostBreakdown::new(3000.0, 1000.0, 500.0);
        let value = serde_json::to_value(&job).unwrap();

        assert_eq!(value["billing"]["job_type"], "time-material");
        assert_eq!(value["billing"]["labor"]["labor_billing_type"], "markup");
        assert_eq!(value["billing"]["labor"]["markup"], 1.5);
        assert_eq!(value["costs"]["labor"], 3000.0);
        assert_eq!(value["status"], "active");

        let roundtrip: Job = serde_json::from_value(value).unwrap();
        assert_eq!(roundtrip, job);
    }

    #[test]
    fn test_fixed_price_json_parses() {
        let json = r#"{
            "id": "3f6c1a9e-0000-4000-8000-000000000001",
            "job_no": "24-101",
            "job_name": "Library Renovation",
            "client": "City of Oakdale",
            "billing": { "job_type": "fixed-price", "target_margin": 20.0 },
            "contract": { "labor": 100000.0, "material": 50000.0, "other": 0.0 }
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.job_type(), JobType::FixedPrice);
        assert_eq!(job.amounts.contract.total(), 150000.0);
        assert_eq!(job.amounts.costs, CostBreakdown::zero());
        match job.billing {
            JobBilling::FixedPrice(terms) => {
                assert_eq!(terms.target_margin, Some(Percent(20.0)));
                assert_eq!(terms.target_profit, None);
            }
            JobBilling::TimeAndMaterial(_) => panic!("expected fixed-price billing"),
        }
    }

    #[test]
    fn test_partial_breakdown_parses() {
        let json = r#"{
            "id": "3f6c1a9e-0000-4000-8000-000000000002",
            "job_no": "24-102",
            "job_name": "Fire Station",
            "client": "City of Oakdale",
            "billing": { "job_type": "fixed-price" },
            "contract": { "labor": 80000.0 },
            "costs": { "material": 12500.0 }
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.amounts.contract, CostBreakdown::new(80000.0, 0.0, 0.0));
        assert_eq!(job.amounts.costs, CostBreakdown::new(0.0, 12500.0, 0.0));
        assert_eq!(job.amounts.contract.total(), 80000.0);
    }

    #[test]
    fn test_status_open() {
        assert!(JobStatus::Active.is_open());
        assert!(JobStatus::OnHold.is_open());
        assert!(!JobStatus::Closed.is_open());
        assert_eq!(serde_json::to_string(&JobStatus::OnHold).unwrap(), "\"on-hold\"");
    }
}
