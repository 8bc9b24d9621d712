//! Caller-supplied slippage tolerance.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Amount, BasisPoints};
use crate::error::AmmError;
use crate::math::Rounding;

/// How far below the quoted output a trade may execute, in basis points.
///
/// Callers usually think in fractions (`0.005` for 0.5%); the tolerance is
/// converted to basis points, rounded to nearest, the moment it enters the
/// engine.
///
/// ```
/// use hook_amm::domain::{Amount, SlippageTolerance};
///
/// let tol = SlippageTolerance::from_fraction(0.005).expect("in range");
/// assert_eq!(tol.bps().get(), 50);
/// assert_eq!(tol.minimum_output(Amount::new(10_000)), Ok(Amount::new(9_950)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SlippageTolerance(BasisPoints);

impl SlippageTolerance {
    /// No slippage allowed.
    pub const ZERO: Self = Self(BasisPoints::ZERO);

    /// Builds a tolerance from a fraction in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidInput`] for NaN, infinite or out-of-range
    /// fractions.
    pub fn from_fraction(fraction: f64) -> crate::error::Result<Self> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(AmmError::InvalidInput("slippage must be a fraction in [0, 1]"));
        }
        // Range checked above, so the product lies in [0, 10_000].
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bps = (fraction * 10_000.0).round() as u32;
        Ok(Self(BasisPoints::new(bps)))
    }

    /// Builds a tolerance directly from basis points.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidInput`] above 10 000 bp.
    pub const fn from_bps(bps: u32) -> crate::error::Result<Self> {
        let bp = BasisPoints::new(bps);
        if !bp.is_valid_percent() {
            return Err(AmmError::InvalidInput("slippage must not exceed 10000bp"));
        }
        Ok(Self(bp))
    }

    /// Returns the tolerance in basis points.
    #[must_use]
    pub const fn bps(&self) -> BasisPoints {
        self.0
    }

    /// Smallest acceptable output for a quoted `expected` output:
    /// `expected * (10_000 - bps) / 10_000`, rounded up.
    ///
    /// # Errors
    ///
    /// Propagates arithmetic failures, which cannot occur for a valid tolerance.
    pub fn minimum_output(&self, expected: Amount) -> crate::error::Result<Amount> {
        self.0.complement()?.apply(expected, Rounding::Up)
    }
}

impl fmt::Display for SlippageTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn fraction_rounds_to_nearest_bp() {
        let Ok(t) = SlippageTolerance::from_fraction(0.00126) else {
            panic!("expected Ok");
        };
        assert_eq!(t.bps().get(), 13);
        let Ok(t) = SlippageTolerance::from_fraction(1.0) else {
            panic!("expected Ok");
        };
        assert_eq!(t.bps().get(), 10_000);
    }

    #[test]
    fn fraction_out_of_range() {
        assert!(SlippageTolerance::from_fraction(-0.01).is_err());
        assert!(SlippageTolerance::from_fraction(1.5).is_err());
        assert!(SlippageTolerance::from_fraction(f64::NAN).is_err());
    }

    #[test]
    fn from_bps_bounds() {
        assert!(SlippageTolerance::from_bps(10_000).is_ok());
        assert!(SlippageTolerance::from_bps(10_001).is_err());
    }

    #[test]
    fn minimum_output_zero_tolerance_is_exact() {
        assert_eq!(
            SlippageTolerance::ZERO.minimum_output(Amount::new(493)),
            Ok(Amount::new(493))
        );
    }

    #[test]
    fn minimum_output_rounds_up() {
        let Ok(t) = SlippageTolerance::from_bps(50) else {
            panic!("expected Ok");
        };
        // 493 * 9_950 / 10_000 = 490.535
        assert_eq!(t.minimum_output(Amount::new(493)), Ok(Amount::new(491)));
    }
}
