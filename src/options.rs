//! Per-call deadlines and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::chain::CallTimeouts;
use crate::error::AmmError;

/// Deadlines and a cancellation token for one state-changing call.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Simulate and submit deadlines.
    pub timeouts: CallTimeouts,
    /// Checked at every step before dispatch.
    pub cancel: CancelToken,
}

impl CallOptions {
    /// Options with `timeouts` and a fresh token.
    #[must_use]
    pub fn new(timeouts: CallTimeouts) -> Self {
        Self {
            timeouts,
            cancel: CancelToken::new(),
        }
    }

    /// Replaces the cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// A shared flag the caller flips to abandon an operation.
///
/// Operations poll the token at each step up to dispatch. Once a
/// transaction has been handed to the ledger the token is ignored and the
/// operation waits for the definitive outcome.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Fails with [`AmmError::Cancelled`] if cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Cancelled`].
    pub fn check(&self) -> crate::error::Result<()> {
        if self.is_cancelled() {
            return Err(AmmError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(clone.check().is_ok());
        token.cancel();
        assert!(clone.is_cancelled());
        assert_eq!(clone.check(), Err(AmmError::Cancelled));
    }
}
