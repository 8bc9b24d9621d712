//! Instructions understood by the AMM program.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, Amount, Decimals, PoolId};

/// One step of a transaction. A transaction commits all of its
/// instructions or none of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Moves `amount` of `mint` from `from` to `to`. Invokes the mint's
    /// transfer hook, if any.
    Transfer {
        /// Mint being moved.
        mint: Address,
        /// Owner of the source token account.
        from: Address,
        /// Owner of the destination token account.
        to: Address,
        /// Base units moved.
        amount: Amount,
    },
    /// Creates a mint controlled by `authority`.
    InitializeMint {
        /// New mint address.
        mint: Address,
        /// Decimal precision.
        decimals: Decimals,
        /// Mint authority.
        authority: Address,
    },
    /// Creates an empty pool account, funded with `lamports` for rent.
    InitializePool {
        /// Pool being created.
        pool: PoolId,
        /// Mint of token A.
        mint_a: Address,
        /// Mint of token B.
        mint_b: Address,
        /// LP mint.
        lp_mint: Address,
        /// Swap fee in basis points.
        fee_bps: u32,
        /// Account paying rent.
        funder: Address,
        /// Rent deposit.
        lamports: u64,
    },
    /// Records a deposit into the reserves and mints LP tokens to `owner`.
    AddLiquidity {
        /// Target pool.
        pool: PoolId,
        /// Liquidity provider.
        owner: Address,
        /// Token A deposited.
        amount_a: Amount,
        /// Token B deposited.
        amount_b: Amount,
        /// LP tokens minted.
        lp_minted: Amount,
    },
    /// Burns `owner`'s LP tokens and records the withdrawal from reserves.
    RemoveLiquidity {
        /// Target pool.
        pool: PoolId,
        /// Liquidity provider.
        owner: Address,
        /// LP tokens burned.
        lp_burned: Amount,
        /// Token A withdrawn.
        amount_a: Amount,
        /// Token B withdrawn.
        amount_b: Amount,
    },
    /// Records a swap against the reserves.
    Swap {
        /// Target pool.
        pool: PoolId,
        /// Trader.
        trader: Address,
        /// Mint paid in.
        input_mint: Address,
        /// Amount paid in.
        amount_in: Amount,
        /// Amount paid out.
        amount_out: Amount,
    },
}

impl Instruction {
    /// Mint moved by this instruction, for transfer instructions.
    #[must_use]
    pub const fn transferred_mint(&self) -> Option<Address> {
        match self {
            Self::Transfer { mint, .. } => Some(*mint),
            _ => None,
        }
    }
}
