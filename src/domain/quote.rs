//! Swap quotes.

use serde::{Deserialize, Serialize};

use super::{Address, Amount, BasisPoints, PoolId, Price};

/// The result of pricing a swap against one pool snapshot.
///
/// A quote is only meaningful for the snapshot it was computed from;
/// `reserve_version` records which one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapQuote {
    /// Pool that was priced.
    pub pool_id: PoolId,
    /// Token paid in.
    pub input_mint: Address,
    /// Token paid out.
    pub output_mint: Address,
    /// Amount paid in.
    pub amount_in: Amount,
    /// Output before the fee is withheld.
    pub output_before_fee: Amount,
    /// Fee withheld from the output; it stays in the pool.
    pub fee: Amount,
    /// Output the trader receives.
    pub amount_out: Amount,
    /// Output-per-input price before the trade.
    pub spot_price: Price,
    /// Realised output-per-input price of this trade.
    pub effective_price: Price,
    /// How far the effective price falls short of spot.
    pub price_impact: BasisPoints,
    /// Reserve version of the snapshot the quote was computed against.
    pub reserve_version: u64,
}
