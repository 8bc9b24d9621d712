//! Account state as read back from the ledger.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, Amount, Decimals, PoolId};

/// Address of the token account holding `owner`'s balance of `mint`.
#[must_use]
pub fn token_account_address(owner: &Address, mint: &Address) -> Address {
    Address::derive("token_account", &[owner.as_bytes(), mint.as_bytes()])
}

/// A mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintAccount {
    /// Decimal precision.
    pub decimals: Decimals,
    /// Circulating supply.
    pub supply: Amount,
    /// Transfer-hook program declared by the mint.
    pub transfer_hook: Option<Address>,
    /// Mint authority.
    pub authority: Address,
}

/// A pool as the AMM program stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAccount {
    /// Mint of token A.
    pub mint_a: Address,
    /// Mint of token B.
    pub mint_b: Address,
    /// Reserve of token A.
    pub reserve_a: Amount,
    /// Reserve of token B.
    pub reserve_b: Amount,
    /// LP mint.
    pub lp_mint: Address,
    /// Outstanding LP supply.
    pub lp_supply: Amount,
    /// Swap fee in basis points.
    pub fee_bps: u32,
    /// Rent deposit held by the account.
    pub lamports: u64,
}

/// An LP position record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionAccount {
    /// Liquidity provider.
    pub owner: Address,
    /// Pool.
    pub pool: PoolId,
    /// LP tokens held.
    pub lp_tokens: Amount,
}

/// A token balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    /// Owner.
    pub owner: Address,
    /// Mint.
    pub mint: Address,
    /// Balance.
    pub amount: Amount,
}

/// Any account the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountState {
    /// A mint.
    Mint(MintAccount),
    /// An AMM pool.
    Pool(PoolAccount),
    /// An LP position.
    Position(PositionAccount),
    /// A token balance.
    TokenAccount(TokenAccount),
}

impl AccountState {
    /// Returns the mint, if this is one.
    #[must_use]
    pub const fn as_mint(&self) -> Option<&MintAccount> {
        match self {
            Self::Mint(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the pool, if this is one.
    #[must_use]
    pub const fn as_pool(&self) -> Option<&PoolAccount> {
        match self {
            Self::Pool(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the position, if this is one.
    #[must_use]
    pub const fn as_position(&self) -> Option<&PositionAccount> {
        match self {
            Self::Position(p) => Some(p),
            _ => None,
        }
    }
}
