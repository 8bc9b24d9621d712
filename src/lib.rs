//! # Hook AMM
//!
//! Constant-product AMM engine for tokens whose transfers run
//! programmable transfer hooks.
//!
//! A hook can accept or reject any transfer at execution time, so a trade
//! that prices correctly can still fail mid-flight. This crate keeps the
//! pool invariants intact anyway: every state-changing submission is
//! priced against an immutable reserve snapshot, cleared by a two-phase
//! gate (hook whitelist, then a dry run of the exact transaction), and
//! submitted under a per-pool lock that re-checks the snapshot version.
//! The local reserve cache only moves once the ledger confirms.
//!
//! ## Create a pool and execute a swap
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hook_amm::prelude::*;
//! use hook_amm::testing::{InMemoryLedger, KeypairSigner};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 1. A ledger with two mints and a funded liquidity provider
//! let ledger = Arc::new(InMemoryLedger::new());
//! let usdc = Address::from_bytes([1u8; 32]);
//! let sol = Address::from_bytes([2u8; 32]);
//! ledger.create_mint(usdc, Decimals::new(6)?, None);
//! ledger.create_mint(sol, Decimals::new(9)?, None);
//!
//! let lp = KeypairSigner::from_seed(b"lp");
//! ledger.mint_to(&lp.identity(), &usdc, Amount::new(2_000_000))?;
//! ledger.mint_to(&lp.identity(), &sol, Amount::new(50_000_000))?;
//! ledger.airdrop(&lp.identity(), 1_000_000_000);
//!
//! // 2. An engine over that ledger
//! let engine = AmmEngine::new(EngineConfig::default(), ledger.clone())?;
//!
//! // 3. Create the pool; token metadata comes from the mint accounts
//! let token_a = engine.load_token(usdc, "USDC").await?;
//! let token_b = engine.load_token(sol, "SOL").await?;
//! let pool_id = engine
//!     .create_pool(token_a, token_b, Amount::new(1_000_000), Amount::new(50_000_000), 30, &lp)
//!     .await?;
//!
//! // 4. Quote, then execute within 0.5% of the quote
//! let quote = engine.quote_trade(pool_id, &usdc, Amount::new(10_000))?;
//! let slippage = SlippageTolerance::from_fraction(0.005)?;
//! let request = TradeRequest::from_quote(&quote, slippage, lp.identity());
//! let result = engine.execute_trade(&request, &lp).await?;
//!
//! assert_eq!(result.amount_out, quote.amount_out);
//! assert_eq!(result.status, TradeStatus::Confirmed);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  AmmEngine   │  built from EngineConfig
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐      ┌──────────────┐
//! │ TradeExecutor│─────▶│ PoolManager  │  snapshots, per-pool locks, positions
//! └──────────────┘      └──────┬───────┘
//!                              │ priced by PricingEngine
//!                              ▼
//!                       ┌──────────────┐
//!                       │  TradeGate   │  HookRegistry check, then simulate
//!                       └──────┬───────┘
//!                              ▼
//!                       ┌──────────────┐
//!                       │LedgerGateway │  retries, timeouts
//!                       └──────┬───────┘
//!                              ▼
//!                     ChainClient + Signer
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`engine`] | [`AmmEngine`](engine::AmmEngine) facade |
//! | [`executor`] | [`TradeExecutor`](executor::TradeExecutor): quote → gate → submit → confirm |
//! | [`manager`] | [`PoolManager`](manager::PoolManager): pool lifecycle and reserve cache |
//! | [`gate`] | [`TradeGate`](gate::TradeGate) and its typestate stages |
//! | [`hooks`] | [`HookRegistry`](hooks::HookRegistry) whitelist |
//! | [`pricing`] | [`PricingEngine`](pricing::PricingEngine): swap and liquidity math |
//! | [`chain`] | [`ChainClient`](chain::ChainClient) / [`Signer`](chain::Signer) seams, instructions, [`LedgerGateway`](chain::LedgerGateway) |
//! | [`domain`] | Value types: [`Amount`](domain::Amount), [`Pool`](domain::Pool), [`TradeRequest`](domain::TradeRequest), ... |
//! | [`math`] | Widened integer arithmetic with explicit rounding |
//! | [`config`] | [`EngineConfig`](config::EngineConfig), loadable from TOML |
//! | [`options`] | [`CallOptions`](options::CallOptions) and [`CancelToken`](options::CancelToken) |
//! | [`testing`] | In-memory ledger and deterministic signer |
//! | [`error`] | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports |

pub mod chain;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod executor;
pub mod gate;
pub mod hooks;
pub mod manager;
pub mod math;
pub mod options;
pub mod prelude;
pub mod pricing;
pub mod testing;
