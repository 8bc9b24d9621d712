//! The ledger seam.
//!
//! The engine never talks to a network directly. It consumes two async
//! traits, [`ChainClient`] for reads, simulation and submission and
//! [`Signer`] for signing, and wraps the client in a [`LedgerGateway`] that
//! owns retries and timeouts. `crate::testing` provides in-memory
//! implementations of both.

mod account;
mod gateway;
mod instruction;
mod transaction;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Address;

pub use account::{
    token_account_address, AccountState, MintAccount, PoolAccount, PositionAccount, TokenAccount,
};
pub use gateway::{CallTimeouts, LedgerGateway, RetryPolicy, SubmitOutcome};
pub use instruction::Instruction;
pub use transaction::{
    Confirmation, SignedTransaction, SimulationError, SimulationOutcome, UnsignedTransaction,
};

/// Failure reported by a [`ChainClient`] or [`Signer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Temporary failure; idempotent reads may be retried.
    #[error("transient ledger error: {0}")]
    Transient(String),
    /// The ledger refused the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),
    /// The ledger cannot be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    /// A message could not be encoded.
    #[error("encoding failed: {0}")]
    Encoding(String),
}

impl ChainError {
    /// Returns `true` for failures worth retrying on an idempotent read.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Reads, simulates and submits against the ledger.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Reads an account. `Ok(None)` means it does not exist.
    async fn fetch_account(&self, address: &Address) -> Result<Option<AccountState>, ChainError>;

    /// Dry-runs a transaction without committing anything.
    async fn simulate(&self, tx: &UnsignedTransaction) -> Result<SimulationOutcome, ChainError>;

    /// Submits a signed transaction and waits for it to commit.
    async fn submit(&self, tx: &SignedTransaction) -> Result<Confirmation, ChainError>;

    /// Lamports an account of `space` bytes must hold to be rent exempt.
    async fn min_balance_for_space(&self, space: u64) -> Result<u64, ChainError>;
}

/// Holds an identity and signs transactions for it.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Public identity of the signer.
    fn identity(&self) -> Address;

    /// Signs `tx`.
    async fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, ChainError>;
}
