//! Exchange rate between two tokens.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Amount;
use crate::error::AmmError;

/// Units of one token per unit of another, as a finite non-negative `f64`.
///
/// Prices are for display and reporting only. No pricing decision is made
/// in floating point.
///
/// ```
/// use hook_amm::domain::{Amount, Price};
///
/// let p = Price::from_amounts(Amount::new(50_000), Amount::new(1_000)).expect("non-zero");
/// assert!((p.get() - 50.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Price(f64);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(0.0);

    /// Creates a price.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidInput`] for NaN, infinite or negative values.
    pub fn new(value: f64) -> crate::error::Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(AmmError::InvalidInput("price must be finite and non-negative"));
        }
        Ok(Self(value))
    }

    /// `numerator / denominator`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientLiquidity`] if `denominator` is zero.
    pub fn from_amounts(numerator: Amount, denominator: Amount) -> crate::error::Result<Self> {
        if denominator.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        Self::new(numerator.get() as f64 / denominator.get() as f64)
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
