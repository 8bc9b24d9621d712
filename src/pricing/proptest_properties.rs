//! Property-based checks of the pricing invariants:
//!
//! 1. **k is non-decreasing** across any priced swap.
//! 2. **Output stays below the reserve** for any input.
//! 3. **Fee monotonicity**: a larger input never yields a smaller fee, and
//!    a higher fee rate never yields a larger output.
//! 4. **Round trip**: depositing then withdrawing never returns more than
//!    was put in.
//! 5. **Swap round trip** A→B→A never returns more than the original input.

#![allow(clippy::panic)]

use proptest::prelude::*;

use super::PricingEngine;
use crate::domain::pool::tests::{funded_pool, funded_pool_with_fee, token};
use crate::domain::{Amount, FeeRate, LiquidityPosition, Side};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn reserve() -> impl Strategy<Value = u64> {
    1_000u64..=1_000_000_000_000
}

fn trade_size() -> impl Strategy<Value = u64> {
    1u64..=10_000_000_000
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn k_never_decreases(ra in reserve(), rb in reserve(), amount in trade_size(), a_to_b in any::<bool>()) {
        let pool = funded_pool(ra, rb);
        let (side, mint) = if a_to_b { (Side::A, token(1).mint()) } else { (Side::B, token(2).mint()) };
        let Ok(q) = PricingEngine::default().quote_swap(&pool, &mint, Amount::new(amount)) else {
            panic!("quote must succeed for funded pool");
        };
        let Ok(after) = pool.apply_swap(side, q.amount_in, q.amount_out, q.fee) else {
            panic!("apply must succeed");
        };
        prop_assert!(after.k() >= pool.k());
    }

    #[test]
    fn output_below_reserve(ra in reserve(), rb in reserve(), amount in any::<u64>().prop_filter("positive", |v| *v > 0)) {
        let pool = funded_pool(ra, rb);
        let Ok(q) = PricingEngine::default().quote_swap(&pool, &token(1).mint(), Amount::new(amount)) else {
            panic!("quote must succeed");
        };
        prop_assert!(q.amount_out < pool.reserve_b());
        prop_assert_eq!(q.output_before_fee.get(), q.amount_out.get() + q.fee.get());
    }

    #[test]
    fn fee_is_monotonic(ra in reserve(), rb in reserve(), small in trade_size(), extra in trade_size()) {
        let pool = funded_pool(ra, rb);
        let engine = PricingEngine::default();
        let mint = token(1).mint();
        let (Ok(lo), Ok(hi)) = (
            engine.quote_swap(&pool, &mint, Amount::new(small)),
            engine.quote_swap(&pool, &mint, Amount::new(small + extra)),
        ) else {
            panic!("quotes must succeed");
        };
        prop_assert!(hi.fee >= lo.fee);
        prop_assert!(hi.amount_out >= lo.amount_out);
    }

    #[test]
    fn output_falls_as_fee_rate_rises(
        ra in reserve(),
        rb in reserve(),
        amount in trade_size(),
        low in 1u32..1_000,
        step in 1u32..=999,
    ) {
        let high = (low + step).min(1_000);
        let (Ok(low_rate), Ok(high_rate)) = (FeeRate::new(low), FeeRate::new(high)) else {
            panic!("rates in range");
        };
        let engine = PricingEngine::default();
        let mint = token(1).mint();
        let (Ok(cheap), Ok(dear)) = (
            engine.quote_swap(&funded_pool_with_fee(ra, rb, low_rate), &mint, Amount::new(amount)),
            engine.quote_swap(&funded_pool_with_fee(ra, rb, high_rate), &mint, Amount::new(amount)),
        ) else {
            panic!("quotes must succeed");
        };
        prop_assert_eq!(cheap.output_before_fee, dear.output_before_fee);
        prop_assert!(dear.amount_out <= cheap.amount_out);
        // Fees round up, so rates closer than one unit of output may tie.
        if u128::from(cheap.output_before_fee.get()) * u128::from(high - low) >= 10_000 {
            prop_assert!(dear.amount_out < cheap.amount_out);
        }
    }

    #[test]
    fn liquidity_round_trip_never_profits(ra in reserve(), rb in reserve(), pct in 1u64..=100) {
        let pool = funded_pool(ra, rb);
        let engine = PricingEngine::default();
        let dep_a = (ra * pct / 100).max(1);
        let dep_b = u64::try_from(u128::from(dep_a) * u128::from(rb) / u128::from(ra)).unwrap_or(u64::MAX);
        prop_assume!(dep_b > 0);
        let Ok(minted) = engine.quote_add_liquidity(&pool, Amount::new(dep_a), Amount::new(dep_b)) else {
            // dust deposits and floored ratios may legitimately be refused
            return Ok(());
        };
        let Ok(grown) = pool.apply_deposit(Amount::new(dep_a), Amount::new(dep_b), minted) else {
            panic!("deposit applies");
        };
        let pos = LiquidityPosition::new(token(9).mint(), grown.id(), minted);
        let Ok((out_a, out_b)) = engine.quote_remove_liquidity(&grown, &pos, minted) else {
            panic!("withdrawal of own position must quote");
        };
        prop_assert!(out_a.get() <= dep_a);
        prop_assert!(out_b.get() <= dep_b);
    }

    #[test]
    fn swap_round_trip_never_profits(ra in reserve(), rb in reserve(), amount in trade_size()) {
        let pool = funded_pool(ra, rb);
        let engine = PricingEngine::default();
        let Ok(there) = engine.quote_swap(&pool, &token(1).mint(), Amount::new(amount)) else {
            panic!("first leg quotes");
        };
        prop_assume!(!there.amount_out.is_zero());
        let Ok(mid) = pool.apply_swap(Side::A, there.amount_in, there.amount_out, there.fee) else {
            panic!("first leg applies");
        };
        let Ok(back) = engine.quote_swap(&mid, &token(2).mint(), there.amount_out) else {
            panic!("second leg quotes");
        };
        prop_assert!(back.amount_out.get() <= amount);
    }
}
