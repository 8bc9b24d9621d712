//! Pool swap fee rate.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Amount, BasisPoints};
use crate::error::AmmError;
use crate::math::Rounding;

/// Lowest fee a pool may be created with (0.01%).
pub const MIN_FEE_BPS: u32 = 1;

/// Highest fee a pool may be created with (10%).
pub const MAX_FEE_BPS: u32 = 1_000;

/// A validated pool fee rate in basis points, always in `[1, 1000]`.
///
/// The fee is charged on the output side of a swap and stays in the pool,
/// which is what makes `k` grow over time.
///
/// # Examples
///
/// ```
/// use hook_amm::domain::FeeRate;
///
/// let fee = FeeRate::new(30).expect("valid fee");
/// assert_eq!(fee.bps(), 30);
/// assert!(FeeRate::new(0).is_err());
/// assert!(FeeRate::new(1_001).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FeeRate(BasisPoints);

impl FeeRate {
    /// 0.30%, the conventional volatile-pair fee.
    pub const STANDARD: Self = Self(BasisPoints::new(30));

    /// Creates a fee rate after checking the `[1, 1000]` range.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFeeRate`] when `bps` is out of range.
    pub const fn new(bps: u32) -> crate::error::Result<Self> {
        if bps < MIN_FEE_BPS || bps > MAX_FEE_BPS {
            return Err(AmmError::InvalidFeeRate(bps));
        }
        Ok(Self(BasisPoints::new(bps)))
    }

    /// Returns the fee in basis points.
    #[must_use]
    pub const fn bps(&self) -> u32 {
        self.0.get()
    }

    /// Returns the underlying [`BasisPoints`].
    #[must_use]
    pub const fn basis_points(&self) -> BasisPoints {
        self.0
    }

    /// Fee owed on `amount`, rounded up so the pool never undercharges.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the product overflows.
    pub fn fee_on(&self, amount: Amount) -> crate::error::Result<Amount> {
        self.0.apply(amount, Rounding::Up)
    }
}

impl TryFrom<u32> for FeeRate {
    type Error = AmmError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeeRate> for u32 {
    fn from(value: FeeRate) -> Self {
        value.bps()
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
