//! Transaction layouts for pool operations.
//!
//! Each builder returns the full instruction list for one atomic
//! submission. Token movements are explicit `Transfer`s so the ledger runs
//! the mints' transfer hooks on them; the pool-program instructions only
//! update pool and LP bookkeeping.

use crate::chain::{Instruction, UnsignedTransaction};
use crate::domain::{Address, Amount, Decimals, Pool, Side};

/// LP mint, pool account, both funding transfers and the initial LP mint.
pub(crate) fn create_pool(
    pool: &Pool,
    funder: Address,
    amount_a: Amount,
    amount_b: Amount,
    lp_minted: Amount,
    lp_decimals: Decimals,
    rent_lamports: u64,
) -> UnsignedTransaction {
    let id = pool.id();
    let mut instructions = vec![
        Instruction::InitializeMint {
            mint: pool.lp_mint(),
            decimals: lp_decimals,
            authority: id.address(),
        },
        Instruction::InitializePool {
            pool: id,
            mint_a: pool.token_a().mint(),
            mint_b: pool.token_b().mint(),
            lp_mint: pool.lp_mint(),
            fee_bps: pool.fee_rate().bps(),
            funder,
            lamports: rent_lamports,
        },
    ];
    instructions.extend(deposit(pool, funder, amount_a, amount_b, lp_minted));
    UnsignedTransaction::new(funder, instructions)
}

/// Both deposits into the vaults, then the LP mint.
pub(crate) fn add_liquidity(
    pool: &Pool,
    owner: Address,
    amount_a: Amount,
    amount_b: Amount,
    lp_minted: Amount,
) -> UnsignedTransaction {
    UnsignedTransaction::new(
        owner,
        deposit(pool, owner, amount_a, amount_b, lp_minted).to_vec(),
    )
}

/// LP burn, then both payouts from the vaults.
pub(crate) fn remove_liquidity(
    pool: &Pool,
    owner: Address,
    lp_burned: Amount,
    amount_a: Amount,
    amount_b: Amount,
) -> UnsignedTransaction {
    UnsignedTransaction::new(
        owner,
        vec![
            Instruction::RemoveLiquidity {
                pool: pool.id(),
                owner,
                lp_burned,
                amount_a,
                amount_b,
            },
            Instruction::Transfer {
                mint: pool.token_a().mint(),
                from: pool.vault(Side::A),
                to: owner,
                amount: amount_a,
            },
            Instruction::Transfer {
                mint: pool.token_b().mint(),
                from: pool.vault(Side::B),
                to: owner,
                amount: amount_b,
            },
        ],
    )
}

/// Input into its vault, output out of its vault, then the reserve update.
pub(crate) fn swap(
    pool: &Pool,
    trader: Address,
    input_side: Side,
    amount_in: Amount,
    amount_out: Amount,
) -> UnsignedTransaction {
    let output_side = input_side.other();
    let input_mint = pool.pair().token(input_side).mint();
    UnsignedTransaction::new(
        trader,
        vec![
            Instruction::Transfer {
                mint: input_mint,
                from: trader,
                to: pool.vault(input_side),
                amount: amount_in,
            },
            Instruction::Transfer {
                mint: pool.pair().token(output_side).mint(),
                from: pool.vault(output_side),
                to: trader,
                amount: amount_out,
            },
            Instruction::Swap {
                pool: pool.id(),
                trader,
                input_mint,
                amount_in,
                amount_out,
            },
        ],
    )
}

fn deposit(
    pool: &Pool,
    owner: Address,
    amount_a: Amount,
    amount_b: Amount,
    lp_minted: Amount,
) -> [Instruction; 3] {
    [
        Instruction::Transfer {
            mint: pool.token_a().mint(),
            from: owner,
            to: pool.vault(Side::A),
            amount: amount_a,
        },
        Instruction::Transfer {
            mint: pool.token_b().mint(),
            from: owner,
            to: pool.vault(Side::B),
            amount: amount_b,
        },
        Instruction::AddLiquidity {
            pool: pool.id(),
            owner,
            amount_a,
            amount_b,
            lp_minted,
        },
    ]
}
