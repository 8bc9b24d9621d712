//! Integer arithmetic for pricing.
//!
//! All pricing runs on `u64` amounts widened to `u128`. This module holds
//! the two primitives everything else is built from: [`mul_div`] with an
//! explicit [`Rounding`] direction, and [`isqrt`].

mod rounding;
mod sqrt;

pub use rounding::{div_round, mul_div, Rounding};
pub use sqrt::isqrt;
