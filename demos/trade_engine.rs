//! Hook-gated trading walkthrough.
//!
//! Sets up an in-memory ledger with a plain token and a token guarded by a
//! transfer hook, then creates a pool, trades, shows a hook rejection and a
//! stale quote, and withdraws liquidity.
//!
//! # Run
//!
//! ```bash
//! cargo run --example trade_engine
//! ```

use std::sync::Arc;

use hook_amm::prelude::*;
use hook_amm::testing::{HookBehavior, InMemoryLedger, KeypairSigner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    println!("=== Hook-gated constant-product AMM ===\n");

    // ── 1. Ledger, mints and accounts ───────────────────────────────────
    let usdc = Address::from_bytes([1u8; 32]);
    let gated = Address::from_bytes([2u8; 32]);
    let hook = Address::from_bytes([77u8; 32]);

    let ledger = Arc::new(InMemoryLedger::new());
    ledger.create_mint(usdc, Decimals::new(6)?, None);
    ledger.create_mint(gated, Decimals::new(6)?, Some(hook));

    let lp = KeypairSigner::from_seed(b"demo-lp");
    let trader = KeypairSigner::from_seed(b"demo-trader");
    for who in [lp.identity(), trader.identity()] {
        ledger.mint_to(&who, &usdc, Amount::new(5_000_000))?;
        ledger.mint_to(&who, &gated, Amount::new(5_000_000))?;
        ledger.airdrop(&who, 1_000_000_000);
    }

    // ── 2. Engine with the hook whitelisted ─────────────────────────────
    let config = EngineConfig::from_toml_str(&format!("whitelisted_hooks = [\"{hook}\"]\n"))?;
    let engine = AmmEngine::new(config, ledger.clone())?;
    println!("Whitelisted hooks: {:?}", engine.whitelisted_hooks());

    // ── 3. Create a pool ────────────────────────────────────────────────
    let token_a = engine.load_token(usdc, "USDC").await?;
    let token_b = engine.load_token(gated, "GATED").await?;
    let pool_id = engine
        .create_pool(token_a, token_b, Amount::new(1_000_000), Amount::new(2_000_000), 30, &lp)
        .await?;
    let pool = engine.get_pool(pool_id)?;
    println!("\nPool {pool_id}");
    println!("  Reserves:  {} / {}", pool.reserve_a(), pool.reserve_b());
    println!("  LP supply: {}", pool.lp_supply());

    // ── 4. Quote and execute ────────────────────────────────────────────
    let quote = engine.quote_trade(pool_id, &usdc, Amount::new(10_000))?;
    println!("\nQuote 10000 USDC:");
    println!("  Out:     {}", quote.amount_out);
    println!("  Fee:     {}", quote.fee);
    println!("  Impact:  {} bps", quote.price_impact.get());
    let slippage = SlippageTolerance::from_fraction(0.005)?;
    let request = TradeRequest::from_quote(&quote, slippage, trader.identity());
    let result = engine.execute_trade(&request, &trader).await?;
    println!("Executed {}: {} out ({:?})", result.tx_id, result.amount_out, result.status);

    // ── 5. The hook refuses large transfers ─────────────────────────────
    ledger.set_hook_behavior(hook, HookBehavior::DenyAbove(Amount::new(50_000)));
    let quote = engine.quote_trade(pool_id, &gated, Amount::new(100_000))?;
    let request = TradeRequest::from_quote(&quote, slippage, trader.identity());
    match engine.execute_trade(&request, &trader).await {
        Err(e) => println!("\nLarge trade rejected ({}): {e}", e.kind()),
        Ok(r) => println!("\nLarge trade unexpectedly executed: {}", r.tx_id),
    }

    // ── 6. A quote goes stale when the pool moves ───────────────────────
    let quote = engine.quote_trade(pool_id, &usdc, Amount::new(1_000))?;
    let stale = TradeRequest::from_quote(&quote, slippage, trader.identity());
    let pool = engine.get_pool(pool_id)?;
    let deposit_a = 10_000u64;
    let deposit_b = u128::from(deposit_a) * u128::from(pool.reserve_b().get())
        / u128::from(pool.reserve_a().get());
    engine
        .add_liquidity(
            pool_id,
            Amount::new(deposit_a),
            Amount::new(u64::try_from(deposit_b)?),
            &lp,
        )
        .await?;
    if let Err(e) = engine.execute_trade(&stale, &trader).await {
        println!(
            "\nStale request: {e} (requote and retry: {})",
            e.is_recoverable_by_requote()
        );
    }

    // ── 7. Withdraw the provider's whole position ───────────────────────
    ledger.set_hook_behavior(hook, HookBehavior::Allow);
    if let Some(position) = engine.position(&lp.identity(), pool_id) {
        let receipt = engine
            .remove_liquidity(pool_id, position.lp_tokens(), &lp)
            .await?;
        println!(
            "\nWithdrew {} LP -> {} USDC + {} GATED",
            receipt.lp_tokens, receipt.amount_a, receipt.amount_b
        );
    }

    let pool = engine.get_pool(pool_id)?;
    println!("Final reserves: {} / {}", pool.reserve_a(), pool.reserve_b());
    println!("Trades: {}", pool.stats().trade_count);
    Ok(())
}
