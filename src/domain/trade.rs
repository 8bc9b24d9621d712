//! Trade requests and results.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Address, Amount, PoolId, Price, SlippageTolerance, SwapQuote, TxId};
use crate::error::AmmError;

/// A request to swap through one pool.
///
/// Built from the [`SwapQuote`] the user was shown: `expected_output` is the
/// slippage reference and `quote_version` is the reserve version the quote
/// saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    /// Pool to trade through.
    pub pool_id: PoolId,
    /// Token paid in.
    pub input_mint: Address,
    /// Token expected out.
    pub output_mint: Address,
    /// Amount paid in.
    pub amount_in: Amount,
    /// Output the user was quoted.
    pub expected_output: Amount,
    /// Maximum tolerated shortfall against `expected_output`.
    pub slippage: SlippageTolerance,
    /// Identity paying and receiving.
    pub requester: Address,
    /// Reserve version the quote was computed against.
    pub quote_version: u64,
}

impl TradeRequest {
    /// Builds a request that executes `quote` for `requester`.
    #[must_use]
    pub const fn from_quote(
        quote: &SwapQuote,
        slippage: SlippageTolerance,
        requester: Address,
    ) -> Self {
        Self {
            pool_id: quote.pool_id,
            input_mint: quote.input_mint,
            output_mint: quote.output_mint,
            amount_in: quote.amount_in,
            expected_output: quote.amount_out,
            slippage,
            requester,
            quote_version: quote.reserve_version,
        }
    }

    /// Checks the request shape before anything is read or priced.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidInput`] for a zero input amount or
    /// identical input and output tokens.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.amount_in.is_zero() {
            return Err(AmmError::InvalidInput("input amount must be positive"));
        }
        if self.input_mint == self.output_mint {
            return Err(AmmError::InvalidInput("input and output tokens must differ"));
        }
        Ok(())
    }
}

/// How the final outcome of a trade was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeStatus {
    /// The ledger confirmed the submission.
    Confirmed,
    /// The submission timed out, and a ledger read showed it landed.
    Reconciled,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed => f.write_str("confirmed"),
            Self::Reconciled => f.write_str("reconciled"),
        }
    }
}

/// Outcome of a completed trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeResult {
    /// Submission identifier.
    pub tx_id: TxId,
    /// Output received.
    pub amount_out: Amount,
    /// Fee retained by the pool.
    pub fee: Amount,
    /// Output per unit of input.
    pub effective_price: Price,
    /// How the outcome was established.
    pub status: TradeStatus,
    /// Pool reserve version after the trade.
    pub reserve_version: u64,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn request(amount_in: u64, output: u8) -> TradeRequest {
        TradeRequest {
            pool_id: PoolId::new(Address::from_bytes([1u8; 32])),
            input_mint: Address::from_bytes([2u8; 32]),
            output_mint: Address::from_bytes([output; 32]),
            amount_in: Amount::new(amount_in),
            expected_output: Amount::new(1),
            slippage: SlippageTolerance::ZERO,
            requester: Address::from_bytes([4u8; 32]),
            quote_version: 1,
        }
    }

    #[test]
    fn valid_request() {
        assert_eq!(request(10, 3).validate(), Ok(()));
    }

    #[test]
    fn zero_amount_rejected() {
        assert_eq!(
            request(0, 3).validate(),
            Err(AmmError::InvalidInput("input amount must be positive"))
        );
    }

    #[test]
    fn same_token_rejected() {
        assert!(request(10, 2).validate().is_err());
    }

    #[test]
    fn status_display() {
        assert_eq!(TradeStatus::Reconciled.to_string(), "reconciled");
    }
}
