//! Constant-product pool state.

use serde::{Deserialize, Serialize};

use super::{Address, Amount, FeeRate, PoolId, Side, Token, TokenPair};
use crate::error::AmmError;

/// Cumulative trading statistics of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolStats {
    /// Total input volume of token A.
    pub volume_a: u128,
    /// Total input volume of token B.
    pub volume_b: u128,
    /// Fees retained in token A.
    pub fees_a: u128,
    /// Fees retained in token B.
    pub fees_b: u128,
    /// Confirmed swaps.
    pub trade_count: u64,
}

/// A snapshot of a two-asset constant-product pool.
///
/// Pools are immutable values: every mutation (`apply_*`, `resync`) returns
/// a new snapshot with `reserve_version` bumped, so a quote that recorded a
/// version can tell whether it still describes the current reserves.
///
/// # Invariants
///
/// - Once initialized, `reserve_a > 0` and `reserve_b > 0`.
/// - `reserve_a * reserve_b` never decreases across a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    id: PoolId,
    pair: TokenPair,
    fee_rate: FeeRate,
    lp_mint: Address,
    reserve_a: Amount,
    reserve_b: Amount,
    lp_supply: Amount,
    reserve_version: u64,
    stats: PoolStats,
}

impl Pool {
    /// Creates an empty pool at version 0.
    #[must_use]
    pub fn new(id: PoolId, pair: TokenPair, fee_rate: FeeRate) -> Self {
        Self {
            lp_mint: id.lp_mint(),
            id,
            pair,
            fee_rate,
            reserve_a: Amount::ZERO,
            reserve_b: Amount::ZERO,
            lp_supply: Amount::ZERO,
            reserve_version: 0,
            stats: PoolStats::default(),
        }
    }

    /// Returns the pool id.
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Returns the token pair.
    #[must_use]
    pub const fn pair(&self) -> &TokenPair {
        &self.pair
    }

    /// Returns token A.
    #[must_use]
    pub const fn token_a(&self) -> &Token {
        self.pair.token_a()
    }

    /// Returns token B.
    #[must_use]
    pub const fn token_b(&self) -> &Token {
        self.pair.token_b()
    }

    /// Returns the swap fee.
    #[must_use]
    pub const fn fee_rate(&self) -> FeeRate {
        self.fee_rate
    }

    /// Returns the LP mint.
    #[must_use]
    pub const fn lp_mint(&self) -> Address {
        self.lp_mint
    }

    /// Returns reserve A.
    #[must_use]
    pub const fn reserve_a(&self) -> Amount {
        self.reserve_a
    }

    /// Returns reserve B.
    #[must_use]
    pub const fn reserve_b(&self) -> Amount {
        self.reserve_b
    }

    /// Returns the reserve on `side`.
    #[must_use]
    pub const fn reserve(&self, side: Side) -> Amount {
        match side {
            Side::A => self.reserve_a,
            Side::B => self.reserve_b,
        }
    }

    /// Returns the outstanding LP supply.
    #[must_use]
    pub const fn lp_supply(&self) -> Amount {
        self.lp_supply
    }

    /// Returns the reserve version.
    #[must_use]
    pub const fn reserve_version(&self) -> u64 {
        self.reserve_version
    }

    /// Returns cumulative statistics.
    #[must_use]
    pub const fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Returns `true` once both reserves are funded.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        !self.reserve_a.is_zero() && !self.reserve_b.is_zero()
    }

    /// The constant-product invariant `reserve_a * reserve_b`.
    #[must_use]
    pub const fn k(&self) -> u128 {
        self.reserve_a.widen() * self.reserve_b.widen()
    }

    /// Vault holding the reserve on `side`.
    #[must_use]
    pub fn vault(&self, side: Side) -> Address {
        self.id.vault(&self.pair.token(side).mint())
    }

    /// Resolves an input mint to `(input_side, reserve_in, reserve_out)`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidInput`] if `mint` is not in the pool.
    pub fn orient(&self, mint: &Address) -> crate::error::Result<(Side, Amount, Amount)> {
        let side = self
            .pair
            .side_of(mint)
            .ok_or(AmmError::InvalidInput("token is not part of this pool"))?;
        Ok((side, self.reserve(side), self.reserve(side.other())))
    }

    /// Applies a confirmed swap of `amount_in` on `input_side` that paid out
    /// `amount_out` and retained `fee` on the output side.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if a reserve would overflow
    /// or underflow.
    pub fn apply_swap(
        &self,
        input_side: Side,
        amount_in: Amount,
        amount_out: Amount,
        fee: Amount,
    ) -> crate::error::Result<Self> {
        let mut next = self.clone();
        let reserve_in = self
            .reserve(input_side)
            .try_add(&amount_in, "input reserve overflow")?;
        let reserve_out = self
            .reserve(input_side.other())
            .try_sub(&amount_out, "output reserve underflow")?;
        next.set_reserve(input_side, reserve_in);
        next.set_reserve(input_side.other(), reserve_out);
        match input_side {
            Side::A => {
                next.stats.volume_a += amount_in.widen();
                next.stats.fees_b += fee.widen();
            }
            Side::B => {
                next.stats.volume_b += amount_in.widen();
                next.stats.fees_a += fee.widen();
            }
        }
        next.stats.trade_count += 1;
        next.reserve_version += 1;
        Ok(next)
    }

    /// Applies a confirmed deposit that minted `lp_minted`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] on reserve or supply overflow.
    pub fn apply_deposit(
        &self,
        amount_a: Amount,
        amount_b: Amount,
        lp_minted: Amount,
    ) -> crate::error::Result<Self> {
        let mut next = self.clone();
        next.reserve_a = self.reserve_a.try_add(&amount_a, "reserve A overflow")?;
        next.reserve_b = self.reserve_b.try_add(&amount_b, "reserve B overflow")?;
        next.lp_supply = self.lp_supply.try_add(&lp_minted, "LP supply overflow")?;
        next.reserve_version += 1;
        Ok(next)
    }

    /// Applies a confirmed withdrawal that burned `lp_burned`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] on underflow.
    pub fn apply_withdrawal(
        &self,
        amount_a: Amount,
        amount_b: Amount,
        lp_burned: Amount,
    ) -> crate::error::Result<Self> {
        let mut next = self.clone();
        next.reserve_a = self.reserve_a.try_sub(&amount_a, "reserve A underflow")?;
        next.reserve_b = self.reserve_b.try_sub(&amount_b, "reserve B underflow")?;
        next.lp_supply = self.lp_supply.try_sub(&lp_burned, "LP supply underflow")?;
        next.reserve_version += 1;
        Ok(next)
    }

    /// Replaces reserves and supply with values read from the ledger.
    ///
    /// Returns `None` if nothing changed, so callers only bump the version
    /// when the cache was actually stale.
    #[must_use]
    pub fn resync(&self, reserve_a: Amount, reserve_b: Amount, lp_supply: Amount) -> Option<Self> {
        if self.reserve_a == reserve_a && self.reserve_b == reserve_b && self.lp_supply == lp_supply
        {
            return None;
        }
        let mut next = self.clone();
        next.reserve_a = reserve_a;
        next.reserve_b = reserve_b;
        next.lp_supply = lp_supply;
        next.reserve_version += 1;
        Some(next)
    }

    fn set_reserve(&mut self, side: Side, value: Amount) {
        match side {
            Side::A => self.reserve_a = value,
            Side::B => self.reserve_b = value,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::Decimals;

    pub(crate) fn token(byte: u8) -> Token {
        let Ok(d) = Decimals::new(6) else {
            panic!("valid decimals");
        };
        Token::new(Address::from_bytes([byte; 32]), d)
    }

    /// Pool with reserves `(a, b)`, LP supply `isqrt(a*b)`, 30 bp fee.
    pub(crate) fn funded_pool(a: u64, b: u64) -> Pool {
        funded_pool_with_fee(a, b, FeeRate::STANDARD)
    }

    /// [`funded_pool`] with an explicit fee rate.
    pub(crate) fn funded_pool_with_fee(a: u64, b: u64, fee_rate: FeeRate) -> Pool {
        let Ok(pair) = TokenPair::new(token(1), token(2)) else {
            panic!("distinct tokens");
        };
        let id = PoolId::derive(&Address::ZERO, &pair.token_a().mint(), &pair.token_b().mint());
        let lp = crate::math::isqrt(u128::from(a) * u128::from(b));
        let Ok(lp) = Amount::from_wide(lp) else {
            panic!("lp fits");
        };
        let Ok(pool) = Pool::new(id, pair, fee_rate).apply_deposit(
            Amount::new(a),
            Amount::new(b),
            lp,
        ) else {
            panic!("deposit fits");
        };
        pool
    }

    #[test]
    fn new_pool_is_empty() {
        let Ok(pair) = TokenPair::new(token(1), token(2)) else {
            panic!("distinct tokens");
        };
        let id = PoolId::new(Address::from_bytes([8u8; 32]));
        let pool = Pool::new(id, pair, FeeRate::STANDARD);
        assert!(!pool.is_initialized());
        assert_eq!(pool.reserve_version(), 0);
        assert_eq!(pool.lp_mint(), id.lp_mint());
    }

    #[test]
    fn deposit_bumps_version() {
        let pool = funded_pool(1_000, 50_000);
        assert!(pool.is_initialized());
        assert_eq!(pool.reserve_version(), 1);
        assert_eq!(pool.k(), 50_000_000);
        assert_eq!(pool.lp_supply(), Amount::new(7_071));
    }

    #[test]
    fn orient_by_mint() {
        let pool = funded_pool(1_000, 50_000);
        let Ok((side, rin, rout)) = pool.orient(&token(2).mint()) else {
            panic!("token B is in the pool");
        };
        assert_eq!(side, Side::B);
        assert_eq!(rin, Amount::new(50_000));
        assert_eq!(rout, Amount::new(1_000));
        assert!(pool.orient(&token(3).mint()).is_err());
    }

    #[test]
    fn apply_swap_moves_reserves_and_stats() {
        let pool = funded_pool(1_000, 50_000);
        let Ok(next) = pool.apply_swap(Side::A, Amount::new(10), Amount::new(493), Amount::new(2))
        else {
            panic!("expected Ok");
        };
        assert_eq!(next.reserve_a(), Amount::new(1_010));
        assert_eq!(next.reserve_b(), Amount::new(49_507));
        assert_eq!(next.reserve_version(), pool.reserve_version() + 1);
        assert_eq!(next.stats().volume_a, 10);
        assert_eq!(next.stats().fees_b, 2);
        assert_eq!(next.stats().trade_count, 1);
        assert!(next.k() >= pool.k());
        // the original snapshot is untouched
        assert_eq!(pool.reserve_a(), Amount::new(1_000));
    }

    #[test]
    fn apply_swap_underflow() {
        let pool = funded_pool(1_000, 50_000);
        let result = pool.apply_swap(Side::A, Amount::new(1), Amount::new(50_001), Amount::ZERO);
        assert!(matches!(result, Err(AmmError::ArithmeticOverflow(_))));
    }

    #[test]
    fn withdrawal_and_resync() {
        let pool = funded_pool(1_000, 50_000);
        let Ok(next) = pool.apply_withdrawal(Amount::new(100), Amount::new(5_000), Amount::new(707))
        else {
            panic!("expected Ok");
        };
        assert_eq!(next.lp_supply(), Amount::new(6_364));
        assert!(next
            .resync(next.reserve_a(), next.reserve_b(), next.lp_supply())
            .is_none());
        let Some(synced) = next.resync(Amount::new(1), Amount::new(2), Amount::new(3)) else {
            panic!("changed state must resync");
        };
        assert_eq!(synced.reserve_version(), next.reserve_version() + 1);
    }
}
