//! In-memory implementations of the ledger seam.
//!
//! [`InMemoryLedger`] implements [`ChainClient`](crate::chain::ChainClient)
//! with real account state, hook programs whose behaviour the test chooses,
//! call counters and failure injection. [`KeypairSigner`] is a deterministic
//! [`Signer`](crate::chain::Signer). Both are used by the test suite and the
//! demo.

mod ledger;
mod signer;

pub use ledger::{HookBehavior, InMemoryLedger};
pub use signer::KeypairSigner;
