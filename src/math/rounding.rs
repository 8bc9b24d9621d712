//! Rounding direction and rounded integer division.
//!
//! Every division in the engine names its rounding direction. The rule is
//! always to round in favour of the pool:
//!
//! | Quantity | Direction |
//! |----------|-----------|
//! | Swap output | [`Rounding::Down`] |
//! | Swap fee | [`Rounding::Up`] |
//! | LP tokens minted | [`Rounding::Down`] |
//! | Withdrawal amounts | [`Rounding::Down`] |
//!
//! # Examples
//!
//! ```
//! use hook_amm::math::{mul_div, Rounding};
//!
//! assert_eq!(mul_div(10, 1, 3, Rounding::Down), Ok(3));
//! assert_eq!(mul_div(10, 1, 3, Rounding::Up), Ok(4));
//! ```

use crate::error::AmmError;

/// Direction an inexact division is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Towards positive infinity.
    Up,
    /// Towards zero.
    Down,
}

impl Rounding {
    /// Returns `true` for [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }
}

/// Divides `numerator` by `denominator` in the given direction.
///
/// Returns `None` when `denominator` is zero.
#[must_use]
pub const fn div_round(numerator: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let q = numerator / denominator;
    match rounding {
        Rounding::Down => Some(q),
        // q + 1 cannot overflow: a non-zero remainder implies d > 1.
        Rounding::Up if numerator % denominator != 0 => Some(q + 1),
        Rounding::Up => Some(q),
    }
}

/// Computes `a * b / d` in `u128` with explicit rounding.
///
/// # Errors
///
/// - [`AmmError::ArithmeticOverflow`] if `a * b` overflows `u128`.
/// - [`AmmError::InsufficientLiquidity`] if `d` is zero; every divisor in
///   the pricing formulas is a reserve or a supply.
pub const fn mul_div(a: u128, b: u128, d: u128, rounding: Rounding) -> crate::error::Result<u128> {
    let Some(product) = a.checked_mul(b) else {
        return Err(AmmError::ArithmeticOverflow("mul_div product overflow"));
    };
    match div_round(product, d, rounding) {
        Some(v) => Ok(v),
        None => Err(AmmError::InsufficientLiquidity),
    }
}
