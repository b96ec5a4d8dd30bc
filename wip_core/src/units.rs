//! # Unit Types
//!
//! Lightweight `f64` wrappers that keep markups and percentages from being
//! confused with each other at call sites.
//!
//! - [`Multiplier`] - a factor applied to a cost (`1.5` = 50% markup,
//!   `1.16` = 16% labor burden)
//! - [`Percent`] - a plain percentage on a 0-100 scale (e.g., department
//!   allocation)
//!
//! Both serialize as bare numbers, so stored records keep the same JSON shape
//! the backend already uses.
//!
//! ## Example
//!
//! ```rust
//! use wip_core::units::{Multiplier, Percent};
//!
//! let markup = Multiplier::from_percent(15.0);
//! assert!((markup.value() - 1.15).abs() < 1e-12);
//! assert!((markup.to_percent() - 15.0).abs() < 1e-9);
//!
//! let share = Percent(40.0);
//! assert_eq!(share.as_fraction(), 0.4);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Factor applied to a cost. Stored as a multiplier, displayed as a percent.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Multiplier(pub f64);

impl Multiplier {
    /// No markup (`1.0`)
    pub const IDENTITY: Multiplier = Multiplier(1.0);

    /// Convert a display percentage to a multiplier: `1 + percent / 100`
    pub fn from_percent(percent: f64) -> Self {
        Multiplier(1.0 + percent / 100.0)
    }

    /// Convert to a display percentage: `(multiplier - 1) * 100`
    pub fn to_percent(self) -> f64 {
        (self.0 - 1.0) * 100.0
    }

    /// Apply the multiplier to an amount
    pub fn apply(self, amount: f64) -> f64 {
        amount * self.0
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Multiplier::IDENTITY
    }
}

/// Percentage on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(pub f64);

impl Percent {
    /// Convert to a 0-1 fraction
    pub fn as_fraction(self) -> f64 {
        self.0 / 100.0
    }
}

impl std::iter::Sum for Percent {
    fn sum<I: Iterator<Item = Percent>>(iter: I) -> Self {
        Percent(iter.map(|p| p.0).sum())
    }
}

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Multiplier);
impl_arithmetic!(Percent);
