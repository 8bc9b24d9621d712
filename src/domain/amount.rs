//! Raw token amount in base units.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AmmError;

/// A raw token amount in the token's smallest unit.
///
/// Amounts are `u64`, the width SPL-style token programs use for balances.
/// Any product of two amounts is computed in `u128` through
/// [`widen`](Self::widen), which is wide enough for `u64::MAX²`, so
/// reserve × reserve can never overflow. Narrowing a wide result back into
/// an `Amount` is checked by [`from_wide`](Self::from_wide).
///
/// # Examples
///
/// ```
/// use hook_amm::domain::Amount;
///
/// let reserve = Amount::new(50_000);
/// let paid_out = Amount::new(493);
/// assert_eq!(reserve.checked_sub(&paid_out), Some(Amount::new(49_507)));
/// assert_eq!(paid_out.checked_sub(&reserve), None);
/// assert_eq!(reserve.widen() * reserve.widen(), 2_500_000_000u128);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[must_use]
pub struct Amount(u64);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Maximum representable amount.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates a new `Amount` from raw base units.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying base-unit value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Widens to `u128` for intermediate products.
    #[must_use]
    pub const fn widen(&self) -> u128 {
        self.0 as u128
    }

    /// Narrows a `u128` intermediate back into an `Amount`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if `value` exceeds `u64::MAX`.
    pub const fn from_wide(value: u128) -> crate::error::Result<Self> {
        if value > u64::MAX as u128 {
            return Err(AmmError::ArithmeticOverflow("amount exceeds u64 range"));
        }
        Ok(Self(value as u64))
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Addition that reports overflow as an [`AmmError`].
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] tagged with `context`.
    pub fn try_add(&self, other: &Self, context: &'static str) -> crate::error::Result<Self> {
        self.checked_add(other)
            .ok_or(AmmError::ArithmeticOverflow(context))
    }

    /// Subtraction that reports underflow as an [`AmmError`].
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] tagged with `context`.
    pub fn try_sub(&self, other: &Self, context: &'static str) -> crate::error::Result<Self> {
        self.checked_sub(other)
            .ok_or(AmmError::ArithmeticOverflow(context))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
