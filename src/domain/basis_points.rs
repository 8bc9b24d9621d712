//! Basis-point representation for rates.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Amount;
use crate::error::AmmError;
use crate::math::{mul_div, Rounding};

/// Denominator that represents 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// A rate expressed in basis points (1 bp = 0.01%, 10 000 bp = 100%).
///
/// Every rate inside the engine is a `BasisPoints`. Fractions only appear at
/// the external boundary (see [`SlippageTolerance`](super::SlippageTolerance)).
///
/// # Examples
///
/// ```
/// use hook_amm::domain::{Amount, BasisPoints};
/// use hook_amm::math::Rounding;
///
/// let bp = BasisPoints::new(30);
/// assert_eq!(bp.apply(Amount::new(1_000_000), Rounding::Down), Ok(Amount::new(3_000)));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BasisPoints(u32);

impl BasisPoints {
    /// Zero basis points (0%).
    pub const ZERO: Self = Self(0);

    /// 100% expressed in basis points.
    pub const MAX_PERCENT: Self = Self(BPS_DENOMINATOR);

    /// Creates a new `BasisPoints` from a raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw basis-point value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the value lies in `0..=10_000`.
    #[must_use]
    pub const fn is_valid_percent(&self) -> bool {
        self.0 <= BPS_DENOMINATOR
    }

    /// Returns `10_000 - self`, the share that remains after applying this rate.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the rate exceeds 100%.
    pub const fn complement(&self) -> crate::error::Result<Self> {
        match BPS_DENOMINATOR.checked_sub(self.0) {
            Some(v) => Ok(Self(v)),
            None => Err(AmmError::ArithmeticOverflow("rate exceeds 100%")),
        }
    }

    /// Computes `amount * self / 10_000` with explicit rounding.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the result does not fit
    /// an [`Amount`].
    pub fn apply(&self, amount: Amount, rounding: Rounding) -> crate::error::Result<Amount> {
        let scaled = mul_div(
            amount.widen(),
            u128::from(self.0),
            u128::from(BPS_DENOMINATOR),
            rounding,
        )?;
        Amount::from_wide(scaled)
    }

    /// Converts to a fraction in `0.0..=1.0` for display.
    #[must_use]
    pub fn as_fraction(&self) -> f64 {
        f64::from(self.0) / f64::from(BPS_DENOMINATOR)
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validity() {
        assert!(BasisPoints::ZERO.is_valid_percent());
        assert!(BasisPoints::MAX_PERCENT.is_valid_percent());
        assert!(!BasisPoints::new(10_001).is_valid_percent());
    }

    #[test]
    fn complement() {
        assert_eq!(BasisPoints::new(30).complement(), Ok(BasisPoints::new(9_970)));
        assert!(BasisPoints::new(10_001).complement().is_err());
    }

    #[test]
    fn apply_rounds_in_requested_direction() {
        let bp = BasisPoints::new(30);
        // 495 * 30 / 10_000 = 1.485
        assert_eq!(bp.apply(Amount::new(495), Rounding::Down), Ok(Amount::new(1)));
        assert_eq!(bp.apply(Amount::new(495), Rounding::Up), Ok(Amount::new(2)));
    }

    #[test]
    fn apply_full_and_zero() {
        let Ok(full) = BasisPoints::MAX_PERCENT.apply(Amount::MAX, Rounding::Down) else {
            panic!("100% of MAX fits");
        };
        assert_eq!(full, Amount::MAX);
        assert_eq!(
            BasisPoints::ZERO.apply(Amount::new(1_000), Rounding::Up),
            Ok(Amount::ZERO)
        );
    }

    #[test]
    fn apply_overflow_is_reported() {
        let result = BasisPoints::new(20_000).apply(Amount::MAX, Rounding::Down);
        assert!(matches!(result, Err(AmmError::ArithmeticOverflow(_))));
    }

    #[test]
    fn display_and_fraction() {
        assert_eq!(BasisPoints::new(30).to_string(), "30bp");
        assert!((BasisPoints::new(50).as_fraction() - 0.005).abs() < f64::EPSILON);
    }
}
