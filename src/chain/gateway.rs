//! Retry and timeout policy around a [`ChainClient`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::{
    AccountState, ChainClient, ChainError, Confirmation, SignedTransaction, SimulationOutcome,
    UnsignedTransaction,
};
use crate::domain::{Address, TxId};
use crate::error::AmmError;

/// Exponential backoff for idempotent reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// Delay after the `attempt`-th failure (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << shift)
    }
}

/// Deadlines for the two calls that can hang.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTimeouts {
    /// Deadline for a dry run.
    pub simulate: Duration,
    /// Deadline for submit-and-confirm.
    pub submit: Duration,
}

impl Default for CallTimeouts {
    fn default() -> Self {
        Self {
            simulate: Duration::from_millis(5_000),
            submit: Duration::from_millis(30_000),
        }
    }
}

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Committed.
    Confirmed(Confirmation),
    /// Definitively refused; nothing was committed.
    Failed(ChainError),
    /// No answer before the deadline; the transaction may or may not have
    /// landed.
    TimedOut(TxId),
}

/// The engine's only path to the ledger.
///
/// Reads are retried on [`ChainError::Transient`]; simulations and
/// submissions are bounded by [`CallTimeouts`] and never retried.
#[derive(Clone)]
pub struct LedgerGateway {
    client: Arc<dyn ChainClient>,
    retry: RetryPolicy,
}

impl core::fmt::Debug for LedgerGateway {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LedgerGateway")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl LedgerGateway {
    /// Wraps `client`.
    #[must_use]
    pub fn new(client: Arc<dyn ChainClient>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Reads an account, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Chain`] once retries are exhausted or on a
    /// non-transient failure.
    pub async fn fetch_account(&self, address: &Address) -> crate::error::Result<Option<AccountState>> {
        self.with_retry("fetch_account", || self.client.fetch_account(address))
            .await
    }

    /// Rent-exempt minimum for `space` bytes, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Chain`] once retries are exhausted.
    pub async fn min_balance_for_space(&self, space: u64) -> crate::error::Result<u64> {
        self.with_retry("min_balance_for_space", || {
            self.client.min_balance_for_space(space)
        })
        .await
    }

    /// Dry-runs `tx` within `deadline`.
    ///
    /// # Errors
    ///
    /// [`AmmError::SimulationFailed`] if the deadline passes or the ledger
    /// cannot run the simulation.
    pub async fn simulate(
        &self,
        tx: &UnsignedTransaction,
        deadline: Duration,
    ) -> crate::error::Result<SimulationOutcome> {
        match tokio::time::timeout(deadline, self.client.simulate(tx)).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "simulation could not run");
                Err(AmmError::SimulationFailed(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(?deadline, "simulation timed out");
                Err(AmmError::SimulationFailed(format!(
                    "simulation timed out after {}ms",
                    deadline.as_millis()
                )))
            }
        }
    }

    /// Submits `tx` and waits up to `deadline` for confirmation.
    pub async fn submit(&self, tx: &SignedTransaction, deadline: Duration) -> SubmitOutcome {
        let tx_id = tx.tx_id();
        match tokio::time::timeout(deadline, self.client.submit(tx)).await {
            Ok(Ok(confirmation)) => {
                tracing::info!(%tx_id, slot = confirmation.slot, "transaction confirmed");
                SubmitOutcome::Confirmed(confirmation)
            }
            Ok(Err(e)) => {
                tracing::warn!(%tx_id, error = %e, "transaction failed");
                SubmitOutcome::Failed(e)
            }
            Err(_) => {
                tracing::warn!(%tx_id, ?deadline, "submission timed out");
                SubmitOutcome::TimedOut(tx_id)
            }
        }
    }

    async fn with_retry<T, F, Fut>(&self, op: &'static str, mut call: F) -> crate::error::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ChainError>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::debug!(op, attempt, ?delay, error = %e, "retrying ledger read");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(AmmError::Chain(e)),
            }
        }
    }
}
