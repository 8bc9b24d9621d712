//! Liquidity-provider position.

use serde::{Deserialize, Serialize};

use super::{Address, Amount, PoolId};

/// LP tokens held by one owner in one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiquidityPosition {
    owner: Address,
    pool_id: PoolId,
    lp_tokens: Amount,
}

impl LiquidityPosition {
    /// Creates a position record.
    #[must_use]
    pub const fn new(owner: Address, pool_id: PoolId, lp_tokens: Amount) -> Self {
        Self {
            owner,
            pool_id,
            lp_tokens,
        }
    }

    /// Returns the owner.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// Returns the LP tokens held.
    #[must_use]
    pub const fn lp_tokens(&self) -> Amount {
        self.lp_tokens
    }

    /// Returns a copy with a different LP balance.
    #[must_use]
    pub const fn with_lp_tokens(&self, lp_tokens: Amount) -> Self {
        Self::new(self.owner, self.pool_id, lp_tokens)
    }
}
