//! Domain value types.
//!
//! Newtypes with validated constructors for everything the engine passes
//! around: identities, amounts, rates, tokens, pools and trades.

mod address;
mod amount;
mod basis_points;
mod decimals;
mod fee_rate;
pub(crate) mod pool;
mod position;
mod price;
mod quote;
mod slippage;
mod token;
mod token_pair;
mod trade;

pub use address::{Address, PoolId, Signature, TxId, ADDRESS_LEN, SIGNATURE_LEN};
pub use amount::Amount;
pub use basis_points::{BasisPoints, BPS_DENOMINATOR};
pub use decimals::Decimals;
pub use fee_rate::{FeeRate, MAX_FEE_BPS, MIN_FEE_BPS};
pub use pool::{Pool, PoolStats};
pub use position::LiquidityPosition;
pub use price::Price;
pub use quote::SwapQuote;
pub use slippage::SlippageTolerance;
pub use token::Token;
pub use token_pair::{Side, TokenPair};
pub use trade::{TradeRequest, TradeResult, TradeStatus};
