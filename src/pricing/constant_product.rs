//! Constant-product pricing (`x · y = k`).
//!
//! The fee is taken from the **output** side and stays in the pool:
//!
//! 1. `reserve_out' = ceil(reserve_in × reserve_out / (reserve_in + amount_in))`
//! 2. `output_before_fee = reserve_out − reserve_out'`
//! 3. `fee = ceil(output_before_fee × fee_bps / 10 000)`
//! 4. `amount_out = output_before_fee − fee`
//!
//! Rounding the post-trade reserve up floors the gross output, so the
//! pool never pays out more than the curve allows and `k` cannot shrink.

use crate::domain::{
    Address, Amount, BasisPoints, LiquidityPosition, Pool, Price, SwapQuote, BPS_DENOMINATOR,
};
use crate::error::AmmError;
use crate::math::{isqrt, mul_div, Rounding};

/// Ratio tolerance applied to follow-on deposits unless configured.
pub const DEFAULT_RATIO_TOLERANCE: BasisPoints = BasisPoints::new(10);

/// Stateless pricing for constant-product pools.
///
/// The only setting is how far a follow-on deposit may deviate from the
/// pool's reserve ratio.
///
/// # Example
///
/// ```rust
/// use hook_amm::pricing::PricingEngine;
///
/// let engine = PricingEngine::default();
/// assert_eq!(engine.ratio_tolerance().get(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PricingEngine {
    ratio_tolerance: BasisPoints,
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_RATIO_TOLERANCE)
    }
}

impl PricingEngine {
    /// Creates an engine with the given deposit ratio tolerance.
    #[must_use]
    pub const fn new(ratio_tolerance: BasisPoints) -> Self {
        Self { ratio_tolerance }
    }

    /// Returns the deposit ratio tolerance.
    #[must_use]
    pub const fn ratio_tolerance(&self) -> BasisPoints {
        self.ratio_tolerance
    }

    /// Prices swapping `amount_in` of `input_mint` through `pool`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidInput`] for a zero amount or a foreign token.
    /// - [`AmmError::InsufficientLiquidity`] if the pool is unfunded or the
    ///   output would reach the whole reserve.
    /// - [`AmmError::ArithmeticOverflow`] if any step overflows.
    pub fn quote_swap(
        &self,
        pool: &Pool,
        input_mint: &Address,
        amount_in: Amount,
    ) -> crate::error::Result<SwapQuote> {
        if amount_in.is_zero() {
            return Err(AmmError::InvalidInput("input amount must be positive"));
        }
        let (input_side, reserve_in, reserve_out) = pool.orient(input_mint)?;
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }

        let denominator = reserve_in.widen() + amount_in.widen();
        let next_reserve_out = mul_div(
            reserve_in.widen(),
            reserve_out.widen(),
            denominator,
            Rounding::Up,
        )?;
        let output_before_fee = Amount::from_wide(
            reserve_out
                .widen()
                .checked_sub(next_reserve_out)
                .ok_or(AmmError::ArithmeticOverflow("output reserve underflow"))?,
        )?;
        let fee = pool.fee_rate().fee_on(output_before_fee)?;
        let amount_out = output_before_fee.try_sub(&fee, "fee exceeds output")?;
        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }

        let spot_price = Price::from_amounts(reserve_out, reserve_in)?;
        let effective_price = Price::from_amounts(amount_out, amount_in)?;
        let price_impact = price_impact(amount_in, amount_out, reserve_in, reserve_out)?;

        Ok(SwapQuote {
            pool_id: pool.id(),
            input_mint: *input_mint,
            output_mint: pool.pair().token(input_side.other()).mint(),
            amount_in,
            output_before_fee,
            fee,
            amount_out,
            spot_price,
            effective_price,
            price_impact,
            reserve_version: pool.reserve_version(),
        })
    }

    /// LP tokens minted for depositing `amount_a` and `amount_b`.
    ///
    /// The first deposit mints `isqrt(amount_a × amount_b)`. Later deposits
    /// must match the reserve ratio within the tolerance and mint the
    /// smaller of the two pro-rata shares.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidAmount`] if either amount is zero or nothing
    ///   would be minted.
    /// - [`AmmError::InvalidRatio`] if the deposit is off-ratio.
    /// - [`AmmError::ArithmeticOverflow`] if any step overflows.
    pub fn quote_add_liquidity(
        &self,
        pool: &Pool,
        amount_a: Amount,
        amount_b: Amount,
    ) -> crate::error::Result<Amount> {
        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(AmmError::InvalidAmount("both deposit amounts must be positive"));
        }

        let supply = pool.lp_supply();
        if supply.is_zero() {
            let minted = Amount::from_wide(isqrt(amount_a.widen() * amount_b.widen()))?;
            if minted.is_zero() {
                return Err(AmmError::InvalidAmount("deposit too small to mint LP tokens"));
            }
            return Ok(minted);
        }

        let (reserve_a, reserve_b) = (pool.reserve_a(), pool.reserve_b());
        if reserve_a.is_zero() || reserve_b.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        self.check_ratio(amount_a, amount_b, reserve_a, reserve_b)?;

        let share_a = mul_div(amount_a.widen(), supply.widen(), reserve_a.widen(), Rounding::Down)?;
        let share_b = mul_div(amount_b.widen(), supply.widen(), reserve_b.widen(), Rounding::Down)?;
        let minted = Amount::from_wide(share_a.min(share_b))?;
        if minted.is_zero() {
            return Err(AmmError::InvalidAmount("deposit too small to mint LP tokens"));
        }
        Ok(minted)
    }

    /// Token amounts returned for burning `lp_amount` out of `position`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidInput`] if `lp_amount` is zero, exceeds the
    ///   position, or the position belongs to another pool.
    /// - [`AmmError::InsufficientLiquidity`] if it exceeds the pool supply.
    pub fn quote_remove_liquidity(
        &self,
        pool: &Pool,
        position: &LiquidityPosition,
        lp_amount: Amount,
    ) -> crate::error::Result<(Amount, Amount)> {
        if position.pool_id() != pool.id() {
            return Err(AmmError::InvalidInput("position belongs to a different pool"));
        }
        if lp_amount.is_zero() {
            return Err(AmmError::InvalidInput("LP amount must be positive"));
        }
        if lp_amount > position.lp_tokens() {
            return Err(AmmError::InvalidInput("LP amount exceeds position"));
        }
        let supply = pool.lp_supply();
        if lp_amount > supply {
            return Err(AmmError::InsufficientLiquidity);
        }

        let amount_a = mul_div(
            pool.reserve_a().widen(),
            lp_amount.widen(),
            supply.widen(),
            Rounding::Down,
        )?;
        let amount_b = mul_div(
            pool.reserve_b().widen(),
            lp_amount.widen(),
            supply.widen(),
            Rounding::Down,
        )?;
        Ok((Amount::from_wide(amount_a)?, Amount::from_wide(amount_b)?))
    }

    /// Units of the other token per unit of `base_mint`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidInput`] if `base_mint` is not in the pool.
    /// - [`AmmError::InsufficientLiquidity`] if the base reserve is empty.
    pub fn spot_price(
        &self,
        pool: &Pool,
        base_mint: &Address,
    ) -> crate::error::Result<Price> {
        let (_, reserve_base, reserve_quote) = pool.orient(base_mint)?;
        Price::from_amounts(reserve_quote, reserve_base)
    }

    /// `|a·Rb − b·Ra| ≤ tolerance × a·Rb`, all in `u128`.
    fn check_ratio(
        &self,
        amount_a: Amount,
        amount_b: Amount,
        reserve_a: Amount,
        reserve_b: Amount,
    ) -> crate::error::Result<()> {
        let expected = amount_a.widen() * reserve_b.widen();
        let offered = amount_b.widen() * reserve_a.widen();
        let deviation = expected.abs_diff(offered);
        if deviation > bps_of(expected, self.ratio_tolerance) {
            return Err(AmmError::InvalidRatio("amounts must match the pool reserve ratio"));
        }
        Ok(())
    }
}

/// `floor(value × bps / 10 000)` without forming `value × bps`.
const fn bps_of(value: u128, bps: BasisPoints) -> u128 {
    let d = BPS_DENOMINATOR as u128;
    let b = bps.get() as u128;
    value / d * b + value % d * b / d
}

/// Shortfall of the effective price against spot, in basis points.
///
/// `effective / spot = out × Rin / (in × Rout)`. Splitting the product as
/// `(out × Rin / in) × 10 000 / Rout` keeps every step inside `u128`.
fn price_impact(
    amount_in: Amount,
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
) -> crate::error::Result<BasisPoints> {
    let scaled = mul_div(
        amount_out.widen(),
        reserve_in.widen(),
        amount_in.widen(),
        Rounding::Down,
    )?;
    let ratio = mul_div(
        scaled,
        u128::from(BPS_DENOMINATOR),
        reserve_out.widen(),
        Rounding::Down,
    )?;
    let ratio = u32::try_from(ratio.min(u128::from(BPS_DENOMINATOR)))
        .map_err(|_| AmmError::ArithmeticOverflow("price impact out of range"))?;
    Ok(BasisPoints::new(BPS_DENOMINATOR - ratio))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::pool::tests::{funded_pool, token};
    use crate::domain::PoolId;

    fn engine() -> PricingEngine {
        PricingEngine::default()
    }

    fn position(pool: &Pool, lp: u64) -> LiquidityPosition {
        LiquidityPosition::new(Address::from_bytes([9u8; 32]), pool.id(), Amount::new(lp))
    }

    // -- quote_swap -----------------------------------------------------------

    #[test]
    fn swap_reference_scenario() {
        let pool = funded_pool(1_000, 50_000);
        let Ok(q) = engine().quote_swap(&pool, &token(1).mint(), Amount::new(10)) else {
            panic!("expected Ok");
        };
        assert_eq!(q.output_before_fee, Amount::new(495));
        assert_eq!(q.fee, Amount::new(2));
        assert_eq!(q.amount_out, Amount::new(493));
        assert_eq!(q.output_mint, token(2).mint());
        assert_eq!(q.reserve_version, pool.reserve_version());
    }

    #[test]
    fn swap_reverse_direction() {
        let pool = funded_pool(1_000, 50_000);
        let Ok(q) = engine().quote_swap(&pool, &token(2).mint(), Amount::new(500)) else {
            panic!("expected Ok");
        };
        // ceil(50_000_000 / 50_500) = 991, so 9 out before fee, fee 1
        assert_eq!(q.output_before_fee, Amount::new(9));
        assert_eq!(q.fee, Amount::new(1));
        assert_eq!(q.amount_out, Amount::new(8));
    }

    #[test]
    fn swap_zero_input_rejected() {
        let pool = funded_pool(1_000, 50_000);
        let result = engine().quote_swap(&pool, &token(1).mint(), Amount::ZERO);
        assert!(matches!(result, Err(AmmError::InvalidInput(_))));
    }

    #[test]
    fn swap_foreign_token_rejected() {
        let pool = funded_pool(1_000, 50_000);
        let result = engine().quote_swap(&pool, &token(3).mint(), Amount::new(10));
        assert!(matches!(result, Err(AmmError::InvalidInput(_))));
    }

    #[test]
    fn swap_huge_input_never_drains_reserve() {
        let pool = funded_pool(1_000, 50_000);
        let Ok(q) = engine().quote_swap(&pool, &token(1).mint(), Amount::MAX) else {
            panic!("expected Ok");
        };
        assert!(q.amount_out < pool.reserve_b());
        assert_eq!(q.output_before_fee, Amount::new(49_999));
    }

    #[test]
    fn swap_tiny_input_can_price_to_zero() {
        let pool = funded_pool(1_000_000, 1_000);
        let Ok(q) = engine().quote_swap(&pool, &token(1).mint(), Amount::new(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(q.amount_out, Amount::ZERO);
    }

    #[test]
    fn swap_unfunded_pool() {
        let pool = funded_pool(1_000, 50_000);
        let Ok(empty) = pool.apply_withdrawal(
            pool.reserve_a(),
            pool.reserve_b(),
            pool.lp_supply(),
        ) else {
            panic!("full withdrawal");
        };
        assert_eq!(
            engine().quote_swap(&empty, &token(1).mint(), Amount::new(10)),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn swap_k_does_not_decrease() {
        let pool = funded_pool(1_000, 50_000);
        let Ok(q) = engine().quote_swap(&pool, &token(1).mint(), Amount::new(10)) else {
            panic!("expected Ok");
        };
        let Ok(after) = pool.apply_swap(
            crate::domain::Side::A,
            q.amount_in,
            q.amount_out,
            q.fee,
        ) else {
            panic!("apply ok");
        };
        assert!(after.k() > pool.k());
    }

    #[test]
    fn swap_reports_prices_and_impact() {
        let pool = funded_pool(1_000, 50_000);
        let Ok(q) = engine().quote_swap(&pool, &token(1).mint(), Amount::new(10)) else {
            panic!("expected Ok");
        };
        assert!((q.spot_price.get() - 50.0).abs() < 1e-9);
        assert!((q.effective_price.get() - 49.3).abs() < 1e-9);
        // 493 * 1000 / 10 = 49_300; 49_300 * 10_000 / 50_000 = 9_860
        assert_eq!(q.price_impact, BasisPoints::new(140));
    }

    // -- quote_add_liquidity --------------------------------------------------

    #[test]
    fn first_deposit_mints_geometric_mean() {
        let pool = funded_pool(1_000, 50_000);
        let Ok(empty) = pool.apply_withdrawal(
            pool.reserve_a(),
            pool.reserve_b(),
            pool.lp_supply(),
        ) else {
            panic!("full withdrawal");
        };
        assert_eq!(
            engine().quote_add_liquidity(&empty, Amount::new(100), Amount::new(400)),
            Ok(Amount::new(200))
        );
    }

    #[test]
    fn proportional_deposit() {
        let pool = funded_pool(1_000, 50_000);
        // supply 7_071: 100 * 7_071 / 1_000 = 707
        assert_eq!(
            engine().quote_add_liquidity(&pool, Amount::new(100), Amount::new(5_000)),
            Ok(Amount::new(707))
        );
    }

    #[test]
    fn deposit_within_tolerance_mints_smaller_share() {
        let pool = funded_pool(1_000, 50_000);
        // 4_996 is 8bp short of 5_000
        let Ok(minted) = engine().quote_add_liquidity(&pool, Amount::new(100), Amount::new(4_996))
        else {
            panic!("within 10bp");
        };
        // 4_996 * 7_071 / 50_000 = 706.5
        assert_eq!(minted, Amount::new(706));
    }

    #[test]
    fn off_ratio_deposit_rejected() {
        let pool = funded_pool(1_000, 50_000);
        let result = engine().quote_add_liquidity(&pool, Amount::new(100), Amount::new(6_000));
        assert!(matches!(result, Err(AmmError::InvalidRatio(_))));
    }

    #[test]
    fn zero_tolerance_requires_exact_ratio() {
        let strict = PricingEngine::new(BasisPoints::ZERO);
        let pool = funded_pool(1_000, 50_000);
        assert!(strict
            .quote_add_liquidity(&pool, Amount::new(100), Amount::new(5_000))
            .is_ok());
        assert!(strict
            .quote_add_liquidity(&pool, Amount::new(100), Amount::new(5_001))
            .is_err());
    }

    #[test]
    fn zero_deposit_rejected() {
        let pool = funded_pool(1_000, 50_000);
        let result = engine().quote_add_liquidity(&pool, Amount::ZERO, Amount::new(5));
        assert!(matches!(result, Err(AmmError::InvalidAmount(_))));
    }

    #[test]
    fn dust_deposit_mints_nothing() {
        let pool = funded_pool(1_000_000, 1_000_000);
        let result = engine().quote_add_liquidity(&pool, Amount::new(1), Amount::new(1));
        // 1 * 1_000_000 / 1_000_000 = 1, so this mints; make it dust by skewing supply
        assert_eq!(result, Ok(Amount::new(1)));
        let Ok(thin) = pool.apply_withdrawal(Amount::ZERO, Amount::ZERO, Amount::new(999_999))
        else {
            panic!("supply reduction");
        };
        let result = engine().quote_add_liquidity(&thin, Amount::new(1), Amount::new(1));
        assert!(matches!(result, Err(AmmError::InvalidAmount(_))));
    }

    // -- quote_remove_liquidity -----------------------------------------------

    #[test]
    fn remove_pro_rata_floors() {
        let pool = funded_pool(1_000, 50_000);
        let pos = position(&pool, 707);
        let Ok((a, b)) = engine().quote_remove_liquidity(&pool, &pos, Amount::new(707)) else {
            panic!("expected Ok");
        };
        // 1_000 * 707 / 7_071 = 99.98, 50_000 * 707 / 7_071 = 4_999.29
        assert_eq!(a, Amount::new(99));
        assert_eq!(b, Amount::new(4_999));
    }

    #[test]
    fn remove_more_than_position_rejected() {
        let pool = funded_pool(1_000, 50_000);
        let pos = position(&pool, 10);
        let result = engine().quote_remove_liquidity(&pool, &pos, Amount::new(11));
        assert_eq!(result, Err(AmmError::InvalidInput("LP amount exceeds position")));
    }

    #[test]
    fn remove_zero_rejected() {
        let pool = funded_pool(1_000, 50_000);
        let pos = position(&pool, 10);
        assert!(engine()
            .quote_remove_liquidity(&pool, &pos, Amount::ZERO)
            .is_err());
    }

    #[test]
    fn remove_from_wrong_pool_rejected() {
        let pool = funded_pool(1_000, 50_000);
        let pos = LiquidityPosition::new(
            Address::from_bytes([9u8; 32]),
            PoolId::new(Address::from_bytes([1u8; 32])),
            Amount::new(10),
        );
        assert!(engine()
            .quote_remove_liquidity(&pool, &pos, Amount::new(1))
            .is_err());
    }

    #[test]
    fn remove_entire_supply_returns_reserves() {
        let pool = funded_pool(1_000, 50_000);
        let pos = position(&pool, 7_071);
        assert_eq!(
            engine().quote_remove_liquidity(&pool, &pos, Amount::new(7_071)),
            Ok((Amount::new(1_000), Amount::new(50_000)))
        );
    }

    // -- spot_price -----------------------------------------------------------

    #[test]
    fn spot_price_both_directions() {
        let pool = funded_pool(1_000, 50_000);
        let (Ok(a), Ok(b)) = (
            engine().spot_price(&pool, &token(1).mint()),
            engine().spot_price(&pool, &token(2).mint()),
        ) else {
            panic!("expected Ok");
        };
        assert!((a.get() - 50.0).abs() < 1e-9);
        assert!((b.get() - 0.02).abs() < 1e-9);
    }

    #[test]
    fn bps_of_is_exact_floor() {
        assert_eq!(bps_of(50_000_000, BasisPoints::new(10)), 50_000);
        assert_eq!(bps_of(9_999, BasisPoints::new(1)), 0);
        assert_eq!(bps_of(u128::MAX, BasisPoints::MAX_PERCENT), u128::MAX);
    }
}
