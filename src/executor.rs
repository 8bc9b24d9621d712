//! Quote, gate, submit, confirm.

use std::sync::Arc;

use crate::chain::Signer;
use crate::domain::{Address, Amount, PoolId, SwapQuote, TradeRequest, TradeResult};
use crate::error::AmmError;
use crate::manager::{tx, PoolManager};
use crate::options::CallOptions;

/// Drives a [`TradeRequest`] through pricing, the gate and the ledger.
///
/// The executor holds no state of its own. Reserves, locks and the gate
/// live in the [`PoolManager`]; the executor re-prices the request against
/// the current snapshot, applies the caller's slippage bound, and hands the
/// approved swap to the manager's submit path.
#[derive(Debug, Clone)]
pub struct TradeExecutor {
    manager: Arc<PoolManager>,
}

impl TradeExecutor {
    /// Creates an executor over `manager`.
    #[must_use]
    pub const fn new(manager: Arc<PoolManager>) -> Self {
        Self { manager }
    }

    /// Prices a swap against the current snapshot of `pool_id`.
    ///
    /// # Errors
    ///
    /// [`AmmError::PoolNotFound`], plus anything
    /// [`PricingEngine::quote_swap`](crate::pricing::PricingEngine::quote_swap)
    /// returns.
    pub fn quote(
        &self,
        pool_id: PoolId,
        input_mint: &Address,
        amount_in: Amount,
    ) -> crate::error::Result<SwapQuote> {
        let pool = self.manager.get_pool(pool_id)?;
        self.manager
            .pricing()
            .quote_swap(&pool, input_mint, amount_in)
    }

    /// Executes `request`, signed by `signer`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidInput`] for a malformed request, a requester
    ///   other than the signer, a foreign output token or a zero output.
    /// - [`AmmError::StaleQuote`] if the pool moved since the quote, either
    ///   before gating or while waiting for the pool lock.
    /// - [`AmmError::SlippageExceeded`] if the output falls below the
    ///   caller's minimum.
    /// - Gate rejections, [`AmmError::Cancelled`],
    ///   [`AmmError::SubmissionFailed`] and [`AmmError::Indeterminate`].
    pub async fn execute(
        &self,
        request: &TradeRequest,
        signer: &dyn Signer,
        options: &CallOptions,
    ) -> crate::error::Result<TradeResult> {
        request.validate()?;
        if request.requester != signer.identity() {
            return Err(AmmError::InvalidInput("requester must be the signing identity"));
        }
        options.cancel.check()?;

        let pool = self.manager.get_pool(request.pool_id)?;
        if pool.reserve_version() != request.quote_version {
            return Err(AmmError::StaleQuote {
                quoted: request.quote_version,
                current: pool.reserve_version(),
            });
        }
        let quote = self
            .manager
            .pricing()
            .quote_swap(&pool, &request.input_mint, request.amount_in)?;
        if quote.output_mint != request.output_mint {
            return Err(AmmError::InvalidInput("output token is not the pool's other token"));
        }
        if quote.amount_out.is_zero() {
            return Err(AmmError::InvalidInput("trade is too small to produce any output"));
        }
        let minimum = request.slippage.minimum_output(request.expected_output)?;
        if quote.amount_out < minimum {
            return Err(AmmError::SlippageExceeded {
                minimum,
                actual: quote.amount_out,
            });
        }

        let (input_side, _, _) = pool.orient(&request.input_mint)?;
        let transaction = tx::swap(
            &pool,
            request.requester,
            input_side,
            quote.amount_in,
            quote.amount_out,
        );
        let approval = self.manager.approve(&pool, transaction, options).await?;
        tracing::debug!(
            pool = %request.pool_id,
            version = approval.reserve_version(),
            "trade approved"
        );

        let settled = self
            .manager
            .settle(approval, signer, options, |current| {
                current.apply_swap(input_side, quote.amount_in, quote.amount_out, quote.fee)
            })
            .await?;
        tracing::info!(
            pool = %request.pool_id,
            tx_id = %settled.tx_id,
            amount_in = %quote.amount_in,
            amount_out = %quote.amount_out,
            fee = %quote.fee,
            status = ?settled.status,
            "trade executed"
        );
        Ok(TradeResult {
            tx_id: settled.tx_id,
            amount_out: quote.amount_out,
            fee: quote.fee,
            effective_price: quote.effective_price,
            status: settled.status,
            reserve_version: settled.pool.reserve_version(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::chain::{CallTimeouts, LedgerGateway, RetryPolicy};
    use crate::domain::{Decimals, Pool, SlippageTolerance, Token, TradeStatus};
    use crate::gate::TradeGate;
    use crate::hooks::HookRegistry;
    use crate::manager::NewPool;
    use crate::pricing::PricingEngine;
    use crate::testing::{InMemoryLedger, KeypairSigner};

    const MINT_A: Address = Address::from_bytes([1u8; 32]);
    const MINT_B: Address = Address::from_bytes([2u8; 32]);

    struct Fixture {
        ledger: Arc<InMemoryLedger>,
        executor: TradeExecutor,
        trader: KeypairSigner,
        pool: Arc<Pool>,
    }

    async fn fixture() -> Fixture {
        let ledger = Arc::new(InMemoryLedger::new());
        let gateway = LedgerGateway::new(ledger.clone(), RetryPolicy::default());
        let gate = TradeGate::new(Arc::new(HookRegistry::new([])), gateway.clone());
        let manager = Arc::new(PoolManager::new(
            Address::from_bytes([200u8; 32]),
            Decimals::LP_DEFAULT,
            PricingEngine::default(),
            gate,
            gateway,
        ));
        ledger.create_mint(MINT_A, Decimals::ZERO, None);
        ledger.create_mint(MINT_B, Decimals::ZERO, None);
        let lp = KeypairSigner::from_seed(b"lp");
        let trader = KeypairSigner::from_seed(b"trader");
        let funded = ledger
            .mint_to(&lp.identity(), &MINT_A, Amount::new(1_000))
            .and_then(|()| ledger.mint_to(&lp.identity(), &MINT_B, Amount::new(50_000)))
            .and_then(|()| ledger.mint_to(&trader.identity(), &MINT_A, Amount::new(1_000)))
            .and_then(|()| ledger.mint_to(&trader.identity(), &MINT_B, Amount::new(1_000)));
        let Ok(()) = funded else {
            panic!("funding succeeds");
        };
        ledger.airdrop(&lp.identity(), 1_000_000_000);
        let params = NewPool {
            token_a: Token::new(MINT_A, Decimals::ZERO),
            token_b: Token::new(MINT_B, Decimals::ZERO),
            amount_a: Amount::new(1_000),
            amount_b: Amount::new(50_000),
            fee_bps: 30,
        };
        let Ok(pool) = manager.create_pool(params, &lp, &options()).await else {
            panic!("pool created");
        };
        Fixture {
            ledger,
            executor: TradeExecutor::new(manager),
            trader,
            pool,
        }
    }

    fn options() -> CallOptions {
        CallOptions::new(CallTimeouts::default())
    }

    fn request(f: &Fixture, input: Address, amount: u64, slippage_bps: u32) -> TradeRequest {
        let Ok(quote) = f.executor.quote(f.pool.id(), &input, Amount::new(amount)) else {
            panic!("quote succeeds");
        };
        let Ok(slippage) = SlippageTolerance::from_bps(slippage_bps) else {
            panic!("valid tolerance");
        };
        TradeRequest::from_quote(&quote, slippage, f.trader.identity())
    }

    #[tokio::test]
    async fn executes_the_quoted_trade() {
        let f = fixture().await;
        let req = request(&f, MINT_A, 10, 50);
        let Ok(result) = f.executor.execute(&req, &f.trader, &options()).await else {
            panic!("trade succeeds");
        };
        assert_eq!(result.amount_out, Amount::new(493));
        assert_eq!(result.fee, Amount::new(2));
        assert_eq!(result.status, TradeStatus::Confirmed);
        assert_eq!(result.reserve_version, f.pool.reserve_version() + 1);
        assert_eq!(
            f.ledger.balance(&f.trader.identity(), &MINT_B),
            Amount::new(1_493)
        );

        let Ok(after) = f.executor.quote(f.pool.id(), &MINT_A, Amount::new(1)) else {
            panic!("pool still quotable");
        };
        assert_eq!(after.reserve_version, result.reserve_version);
    }

    #[tokio::test]
    async fn stale_request_is_rejected_before_gating() {
        let f = fixture().await;
        let first = request(&f, MINT_A, 10, 50);
        let second = request(&f, MINT_A, 20, 50);
        let Ok(_) = f.executor.execute(&first, &f.trader, &options()).await else {
            panic!("first trade succeeds");
        };
        let simulations = f.ledger.simulate_calls();
        let Err(AmmError::StaleQuote { quoted, current }) =
            f.executor.execute(&second, &f.trader, &options()).await
        else {
            panic!("second trade is stale");
        };
        assert_eq!(current, quoted + 1);
        assert_eq!(f.ledger.simulate_calls(), simulations);
    }

    #[tokio::test]
    async fn slippage_bound_is_enforced() {
        let f = fixture().await;
        let mut req = request(&f, MINT_A, 10, 0);
        req.expected_output = Amount::new(500);
        let Err(AmmError::SlippageExceeded { minimum, actual }) =
            f.executor.execute(&req, &f.trader, &options()).await
        else {
            panic!("expected slippage rejection");
        };
        assert_eq!(minimum, Amount::new(500));
        assert_eq!(actual, Amount::new(493));
        assert_eq!(f.ledger.submit_calls(), 1);
    }

    #[tokio::test]
    async fn zero_output_is_invalid_input() {
        let f = fixture().await;
        // ceil(1_000 * 50_000 / 50_001) = 1_000, so nothing comes out.
        let req = request(&f, MINT_B, 1, 50);
        let Err(AmmError::InvalidInput(_)) =
            f.executor.execute(&req, &f.trader, &options()).await
        else {
            panic!("zero output is rejected");
        };
    }

    #[tokio::test]
    async fn requester_must_sign() {
        let f = fixture().await;
        let mut req = request(&f, MINT_A, 10, 50);
        req.requester = Address::from_bytes([5u8; 32]);
        let Err(AmmError::InvalidInput(_)) =
            f.executor.execute(&req, &f.trader, &options()).await
        else {
            panic!("foreign requester is rejected");
        };
    }

    #[tokio::test]
    async fn ledger_rejection_leaves_cache_untouched() {
        let f = fixture().await;
        let req = request(&f, MINT_A, 10, 50);
        f.ledger.fail_next_submit("blockhash expired");
        let Err(AmmError::SubmissionFailed(reason)) =
            f.executor.execute(&req, &f.trader, &options()).await
        else {
            panic!("submission fails");
        };
        assert!(reason.contains("blockhash expired"));
        let Ok(quote) = f.executor.quote(f.pool.id(), &MINT_A, Amount::new(10)) else {
            panic!("pool still quotable");
        };
        assert_eq!(quote.reserve_version, f.pool.reserve_version());
    }
}
