//! Unified error types for the hook-gated AMM engine.
//!
//! All fallible operations across the crate return [`AmmError`], so callers
//! can match on one enum whether the failure came from pricing math, the
//! trade gate, a race against another submission, or the ledger itself.
//! [`AmmError::kind`] groups the variants into the coarse categories a UI or
//! API layer usually needs.

use core::fmt;

use thiserror::Error;

use crate::chain::ChainError;
use crate::domain::{Address, Amount, PoolId, TxId};

/// Convenience alias used by every fallible function in the crate.
pub type Result<T, E = AmmError> = core::result::Result<T, E>;

/// Every failure the engine can surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    /// Malformed request; rejected before any I/O.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Liquidity deposit does not match the pool's reserve ratio.
    #[error("deposit ratio deviates from pool reserves: {0}")]
    InvalidRatio(&'static str),

    /// Fee rate outside the accepted `[1, 1000]` basis-point range.
    #[error("fee rate {0}bp is outside [1, 1000]")]
    InvalidFeeRate(u32),

    /// Both sides of a pool refer to the same token.
    #[error("pool requires two distinct tokens")]
    InvalidPair,

    /// Amount is zero or otherwise unusable for the operation.
    #[error("invalid amount: {0}")]
    InvalidAmount(&'static str),

    /// Reserves cannot satisfy the requested trade or withdrawal.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// Checked arithmetic overflowed or underflowed.
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(&'static str),

    /// A token in the trade declares a hook program that is not whitelisted.
    #[error("transfer hook {0} is not whitelisted")]
    HookNotWhitelisted(Address),

    /// The hook program rejected the simulated transfer.
    #[error("transfer hook {program} denied the transfer: {reason}")]
    HookDeniedTransfer {
        /// Hook program that rejected the transfer.
        program: Address,
        /// Reason reported by the simulation.
        reason: String,
    },

    /// Simulation failed for a reason other than a hook rejection.
    #[error("simulation failed: {0}")]
    SimulationFailed(String),

    /// The pool moved between quote and submission.
    #[error("stale quote: quoted against version {quoted}, pool is at {current}")]
    StaleQuote {
        /// Reserve version the quote or approval was computed against.
        quoted: u64,
        /// Reserve version observed when the check ran.
        current: u64,
    },

    /// The executable output is worse than the caller's tolerance allows.
    #[error("slippage exceeded: output {actual} is below minimum {minimum}")]
    SlippageExceeded {
        /// Smallest output the caller accepts.
        minimum: Amount,
        /// Output the current reserves would produce.
        actual: Amount,
    },

    /// The ledger rejected the submitted transaction.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    /// Outcome unknown after a timeout; reconcile before trusting local state.
    #[error("outcome of transaction {tx_id} is indeterminate")]
    Indeterminate {
        /// Identifier of the transaction whose outcome is unknown.
        tx_id: TxId,
    },

    /// A pool for this token pair is already registered.
    #[error("pool {0} already exists")]
    PoolExists(PoolId),

    /// No pool with this id is known to the manager.
    #[error("pool {0} not found")]
    PoolNotFound(PoolId),

    /// The caller cancelled the operation before it was dispatched.
    #[error("operation cancelled before dispatch")]
    Cancelled,

    /// Engine configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A ledger read failed after the retry budget was exhausted.
    #[error("ledger read failed: {0}")]
    Chain(ChainError),
}

/// Coarse classification of [`AmmError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed requests and configuration.
    Validation,
    /// Domain precondition violations (ratio, fee, pair, amount, pool existence).
    Domain,
    /// Detected by the pricing engine.
    Pricing,
    /// Rejected by the trade gate (policy or simulation).
    Gate,
    /// Lost a race or the market moved; re-quote and try again.
    Race,
    /// Interaction with the ledger failed or is unresolved.
    Ledger,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::Domain => "domain",
            Self::Pricing => "pricing",
            Self::Gate => "gate",
            Self::Race => "race",
            Self::Ledger => "ledger",
        };
        f.write_str(label)
    }
}

impl AmmError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::InvalidConfig(_) | Self::Cancelled => {
                ErrorKind::Validation
            }
            Self::InvalidRatio(_)
            | Self::InvalidFeeRate(_)
            | Self::InvalidPair
            | Self::InvalidAmount(_)
            | Self::PoolExists(_)
            | Self::PoolNotFound(_) => ErrorKind::Domain,
            Self::InsufficientLiquidity | Self::ArithmeticOverflow(_) => ErrorKind::Pricing,
            Self::HookNotWhitelisted(_)
            | Self::HookDeniedTransfer { .. }
            | Self::SimulationFailed(_) => ErrorKind::Gate,
            Self::StaleQuote { .. } | Self::SlippageExceeded { .. } => ErrorKind::Race,
            Self::SubmissionFailed(_) | Self::Indeterminate { .. } | Self::Chain(_) => {
                ErrorKind::Ledger
            }
        }
    }

    /// `true` when fetching a fresh quote and resubmitting may succeed.
    #[must_use]
    pub const fn is_recoverable_by_requote(&self) -> bool {
        matches!(self, Self::StaleQuote { .. } | Self::SlippageExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_errors_are_distinguishable_from_ledger_errors() {
        let policy = AmmError::HookNotWhitelisted(Address::from_bytes([7u8; 32]));
        let chain = AmmError::SubmissionFailed("blockhash expired".to_string());
        assert_eq!(policy.kind(), ErrorKind::Gate);
        assert_eq!(chain.kind(), ErrorKind::Ledger);
    }

    #[test]
    fn only_race_errors_are_requotable() {
        let stale = AmmError::StaleQuote {
            quoted: 1,
            current: 2,
        };
        let slip = AmmError::SlippageExceeded {
            minimum: Amount::new(10),
            actual: Amount::new(9),
        };
        assert!(stale.is_recoverable_by_requote());
        assert!(slip.is_recoverable_by_requote());
        assert!(!AmmError::InsufficientLiquidity.is_recoverable_by_requote());
        assert!(!AmmError::SimulationFailed("x".to_string()).is_recoverable_by_requote());
    }

    #[test]
    fn display_includes_versions() {
        let e = AmmError::StaleQuote {
            quoted: 3,
            current: 5,
        };
        let text = e.to_string();
        assert!(text.contains('3'));
        assert!(text.contains('5'));
    }

    #[test]
    fn kind_display() {
        assert_eq!(ErrorKind::Race.to_string(), "race");
        assert_eq!(AmmError::InvalidPair.kind(), ErrorKind::Domain);
        assert_eq!(
            AmmError::ArithmeticOverflow("x").kind(),
            ErrorKind::Pricing
        );
    }
}
