//! # Business Valuation
//!
//! EBITDA normalization and multiple-based business value.
//!
//! ```text
//! adjusted EBITDA = net profit + owner compensation + depreciation
//!                 + interest expense + taxes + other add-backs
//! business value  = adjusted EBITDA × multiple
//! ```
//!
//! ## Example
//!
//! ```rust
//! use wip_core::valuation::{Valuation, calculate_valuation};
//!
//! let mut v = Valuation::new("FY2024");
//! v.net_profit = 200_000.0;
//! v.owner_compensation = 80_000.0;
//! v.depreciation = 20_000.0;
//! v.interest_expense = 10_000.0;
//! v.taxes = 15_000.0;
//! v.other_addbacks = 5_000.0;
//! v.multiple = 3.5;
//!
//! let result = calculate_valuation(&v);
//! assert_eq!(result.adjusted_ebitda, 330_000.0);
//! assert_eq!(result.business_value, 1_155_000.0);
//! ```

pub mod comparison;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use comparison::{compare_scenarios, ComparisonRow, ScenarioMetric};

/// A valuation scenario.
///
/// At most one valuation per company is current; the company container
/// enforces that, not the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub id: Uuid,

    /// Scenario name (e.g., "FY2024", "With new shop")
    pub name: String,

    #[serde(default)]
    pub valuation_date: Option<NaiveDate>,

    #[serde(default)]
    pub annual_revenue: f64,
    #[serde(default)]
    pub net_profit: f64,
    #[serde(default)]
    pub owner_compensation: f64,
    #[serde(default)]
    pub depreciation: f64,
    #[serde(default)]
    pub interest_expense: f64,
    #[serde(default)]
    pub taxes: f64,
    #[serde(default)]
    pub other_addbacks: f64,

    /// EBITDA multiple
    #[serde(default)]
    pub multiple: f64,

    #[serde(default)]
    pub is_current: bool,

    #[serde(default)]
    pub notes: String,
}

impl Valuation {
    /// Create a scenario with every figure at zero.
    pub fn new(name: impl Into<String>) -> Self {
        Valuation {
            id: Uuid::new_v4(),
            name: name.into(),
            valuation_date: None,
            annual_revenue: 0.0,
            net_profit: 0.0,
            owner_compensation: 0.0,
            depreciation: 0.0,
            interest_expense: 0.0,
            taxes: 0.0,
            other_addbacks: 0.0,
            multiple: 0.0,
            is_current: false,
            notes: String::new(),
        }
    }

    /// Everything added back to net profit
    pub fn total_addbacks(&self) -> f64 {
        self.owner_compensation + self.depreciation + self.interest_expense + self.taxes + self.other_addbacks
    }
}

/// Derived valuation figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub adjusted_ebitda: f64,
    pub business_value: f64,
    /// Adjusted EBITDA as a percent of revenue (0 when revenue is 0)
    pub ebitda_margin: f64,
    /// Business value as a percent of revenue (0 when revenue is 0)
    pub value_to_revenue: f64,
}

/// Compute adjusted EBITDA, business value, and revenue ratios.
pub fn calculate_valuation(valuation: &Valuation) -> ValuationResult {
    let adjusted_ebitda = valuation.net_profit + valuation.total_addbacks();
    let business_value = adjusted_ebitda * valuation.multiple;
    let per_revenue = |amount: f64| {
        if valuation.annual_revenue > 0.0 {
            amount / valuation.annual_revenue * 100.0
        } else {
            0.0
        }
    };

    ValuationResult {
        adjusted_ebitda,
        business_value,
        ebitda_margin: per_revenue(adjusted_ebitda),
        value_to_revenue: per_revenue(business_value),
    }
}
