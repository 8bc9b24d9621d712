//! Pure pricing math for constant-product pools.
//!
//! [`PricingEngine`] never performs I/O and never mutates a pool; it reads
//! an immutable [`Pool`](crate::domain::Pool) snapshot and returns amounts.
//! Callers apply the result only after the ledger confirms it.

mod constant_product;

#[cfg(test)]
mod proptest_properties;

pub use constant_product::{PricingEngine, DEFAULT_RATIO_TOLERANCE};
