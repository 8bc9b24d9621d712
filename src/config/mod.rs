//! Engine configuration.
//!
//! [`EngineConfig`] is the declarative blueprint an
//! [`AmmEngine`](crate::engine::AmmEngine) is built from: program id, hook
//! whitelist, pricing tolerance, timeouts and retry policy.

mod engine_config;

pub use engine_config::{EngineConfig, RetryConfig};
