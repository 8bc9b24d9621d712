//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use hook_amm::prelude::*;
//! ```

pub use crate::chain::{CallTimeouts, ChainClient, Signer};
pub use crate::config::EngineConfig;
pub use crate::domain::{
    Address, Amount, BasisPoints, Decimals, FeeRate, LiquidityPosition, Pool, PoolId,
    SlippageTolerance, SwapQuote, Token, TradeRequest, TradeResult, TradeStatus, TxId,
};
pub use crate::engine::AmmEngine;
pub use crate::error::{AmmError, ErrorKind, Result};
pub use crate::manager::{LiquidityReceipt, NewPool};
pub use crate::options::{CallOptions, CancelToken};
