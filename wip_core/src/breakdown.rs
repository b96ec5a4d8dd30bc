//! # Cost Breakdown
//!
//! Every money figure on a job is split three ways: labor, material, and
//! other. The same shape is used for contract, budget, costs to date,
//! invoiced, and cost to complete.
//!
//! The engine performs no validation on breakdowns. Callers are expected to
//! pass non-negative, well-formed values.

use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

/// Labor / material / other split of an amount.
///
/// ## JSON Example
///
/// ```json
/// { "labor": 40000.0, "material": 20000.0, "other": 0.0 }
/// ```
///
/// Missing components read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CostBreakdown {
    pub labor: f64,
    pub material: f64,
    pub other: f64,
}

impl CostBreakdown {
    pub fn new(labor: f64, material: f64, other: f64) -> Self {
        CostBreakdown { labor, material, other }
    }

    /// All-zero breakdown (the default for a new job)
    pub fn zero() -> Self {
        CostBreakdown::default()
    }

    /// `labor + material + other`
    pub fn total(&self) -> f64 {
        self.labor + self.material + self.other
    }

    /// Combine two breakdowns component by component
    pub fn zip_with(&self, other: &CostBreakdown, f: impl Fn(f64, f64) -> f64) -> CostBreakdown {
        CostBreakdown {
            labor: f(self.labor, other.labor),
            material: f(self.material, other.material),
            other: f(self.other, other.other),
        }
    }
}

/// Total of a breakdown.
///
/// Free-function form of [`CostBreakdown::total`], used wherever totals are
/// needed.
pub fn sum_breakdown(breakdown: &CostBreakdown) -> f64 {
    breakdown.total()
}

impl Add for CostBreakdown {
    type Output = CostBreakdown;
    fn add(self, rhs: CostBreakdown) -> CostBreakdown {
        self.zip_with(&rhs, |a, b| a + b)
    }
}

impl AddAssign for CostBreakdown {
    fn add_assign(&mut self, rhs: CostBreakdown) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for CostBreakdown {
    type Output = CostBreakdown;
    fn mul(self, rhs: f64) -> CostBreakdown {
        CostBreakdown::new(self.labor * rhs, self.material * rhs, self.other * rhs)
    }
}

impl std::iter::Sum for CostBreakdown {
    fn sum<I: Iterator<Item = CostBreakdown>>(iter: I) -> Self {
        iter.fold(CostBreakdown::zero(), |acc, b| acc + b)
    }
}
