//! The engine facade.

use std::sync::Arc;

use crate::chain::{ChainClient, LedgerGateway, Signer};
use crate::config::EngineConfig;
use crate::domain::{
    Address, Amount, LiquidityPosition, Pool, PoolId, SwapQuote, Token, TradeRequest,
    TradeResult,
};
use crate::error::AmmError;
use crate::executor::TradeExecutor;
use crate::gate::TradeGate;
use crate::hooks::HookRegistry;
use crate::manager::{LiquidityReceipt, NewPool, PoolManager};
use crate::options::CallOptions;

/// Hook-gated constant-product AMM.
///
/// Wires a [`PoolManager`], a [`TradeExecutor`] and a [`TradeGate`] around
/// one [`ChainClient`], configured from an [`EngineConfig`]. Every
/// state-changing call has a plain form that uses the configured deadlines
/// and a `_with` form that takes explicit [`CallOptions`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use hook_amm::config::EngineConfig;
/// use hook_amm::domain::Address;
/// use hook_amm::engine::AmmEngine;
/// use hook_amm::testing::InMemoryLedger;
///
/// let engine = AmmEngine::new(EngineConfig::default(), Arc::new(InMemoryLedger::new()))
///     .expect("default config is valid");
/// let hook = Address::from_bytes([7u8; 32]);
/// assert!(!engine.is_hook_safe(&hook));
/// engine.register_hook(hook);
/// assert!(engine.is_hook_safe(&hook));
/// ```
#[derive(Debug)]
pub struct AmmEngine {
    config: EngineConfig,
    registry: Arc<HookRegistry>,
    gateway: LedgerGateway,
    manager: Arc<PoolManager>,
    executor: TradeExecutor,
}

impl AmmEngine {
    /// Validates `config` and builds an engine over `client`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: EngineConfig, client: Arc<dyn ChainClient>) -> crate::error::Result<Self> {
        config.validate()?;
        let registry = Arc::new(HookRegistry::new(config.hook_addresses()?));
        let gateway = LedgerGateway::new(client, config.retry_policy());
        let gate = TradeGate::new(Arc::clone(&registry), gateway.clone());
        let manager = Arc::new(PoolManager::new(
            config.program_address()?,
            config.lp_mint_decimals()?,
            config.pricing_engine(),
            gate,
            gateway.clone(),
        ));
        let executor = TradeExecutor::new(Arc::clone(&manager));
        tracing::info!(
            program = %manager.program_id(),
            hooks = registry.whitelisted().len(),
            "engine ready"
        );
        Ok(Self {
            config,
            registry,
            gateway,
            manager,
            executor,
        })
    }

    /// Configuration the engine was built from.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pool manager, for callers that need lower-level access.
    #[must_use]
    pub const fn manager(&self) -> &Arc<PoolManager> {
        &self.manager
    }

    /// Options with the configured deadlines and a fresh cancel token.
    #[must_use]
    pub fn default_options(&self) -> CallOptions {
        CallOptions::new(self.config.timeouts())
    }

    // -- pools ------------------------------------------------------------

    /// Creates a pool funded by `signer` and returns its id.
    ///
    /// # Errors
    ///
    /// See [`PoolManager::create_pool`].
    pub async fn create_pool(
        &self,
        token_a: Token,
        token_b: Token,
        amount_a: Amount,
        amount_b: Amount,
        fee_bps: u32,
        signer: &dyn Signer,
    ) -> crate::error::Result<PoolId> {
        let params = NewPool {
            token_a,
            token_b,
            amount_a,
            amount_b,
            fee_bps,
        };
        let pool = self
            .create_pool_with(params, signer, &self.default_options())
            .await?;
        Ok(pool.id())
    }

    /// [`create_pool`](Self::create_pool) with explicit options, returning
    /// the new snapshot.
    ///
    /// # Errors
    ///
    /// See [`PoolManager::create_pool`].
    pub async fn create_pool_with(
        &self,
        params: NewPool,
        signer: &dyn Signer,
        options: &CallOptions,
    ) -> crate::error::Result<Arc<Pool>> {
        self.manager.create_pool(params, signer, options).await
    }

    /// Current snapshot of a pool.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`].
    pub fn get_pool(&self, pool_id: PoolId) -> crate::error::Result<Arc<Pool>> {
        self.manager.get_pool(pool_id)
    }

    /// Pools that trade `mint`.
    #[must_use]
    pub fn list_pools_for_token(&self, mint: &Address) -> Vec<Arc<Pool>> {
        self.manager.list_pools_for_token(mint)
    }

    /// Re-reads a pool, and optionally `owner`'s position, from the ledger.
    ///
    /// # Errors
    ///
    /// See [`PoolManager::reconcile`].
    pub async fn reconcile_pool(
        &self,
        pool_id: PoolId,
        owner: Option<Address>,
    ) -> crate::error::Result<Arc<Pool>> {
        self.manager.reconcile(pool_id, owner).await
    }

    // -- trading ----------------------------------------------------------

    /// Prices a swap against the current snapshot.
    ///
    /// # Errors
    ///
    /// See [`TradeExecutor::quote`].
    pub fn quote_trade(
        &self,
        pool_id: PoolId,
        input_mint: &Address,
        amount_in: Amount,
    ) -> crate::error::Result<SwapQuote> {
        self.executor.quote(pool_id, input_mint, amount_in)
    }

    /// Executes a trade with the configured deadlines.
    ///
    /// # Errors
    ///
    /// See [`TradeExecutor::execute`].
    pub async fn execute_trade(
        &self,
        request: &TradeRequest,
        signer: &dyn Signer,
    ) -> crate::error::Result<TradeResult> {
        self.execute_trade_with(request, signer, &self.default_options())
            .await
    }

    /// Executes a trade with explicit options.
    ///
    /// # Errors
    ///
    /// See [`TradeExecutor::execute`].
    pub async fn execute_trade_with(
        &self,
        request: &TradeRequest,
        signer: &dyn Signer,
        options: &CallOptions,
    ) -> crate::error::Result<TradeResult> {
        self.executor.execute(request, signer, options).await
    }

    // -- liquidity --------------------------------------------------------

    /// Deposits into `pool_id` on behalf of `signer`.
    ///
    /// # Errors
    ///
    /// See [`PoolManager::add_liquidity`].
    pub async fn add_liquidity(
        &self,
        pool_id: PoolId,
        amount_a: Amount,
        amount_b: Amount,
        signer: &dyn Signer,
    ) -> crate::error::Result<LiquidityReceipt> {
        self.add_liquidity_with(pool_id, amount_a, amount_b, signer, &self.default_options())
            .await
    }

    /// [`add_liquidity`](Self::add_liquidity) with explicit options.
    ///
    /// # Errors
    ///
    /// See [`PoolManager::add_liquidity`].
    pub async fn add_liquidity_with(
        &self,
        pool_id: PoolId,
        amount_a: Amount,
        amount_b: Amount,
        signer: &dyn Signer,
        options: &CallOptions,
    ) -> crate::error::Result<LiquidityReceipt> {
        self.manager
            .add_liquidity(pool_id, amount_a, amount_b, signer, options)
            .await
    }

    /// Withdraws from `pool_id` on behalf of `signer`.
    ///
    /// # Errors
    ///
    /// See [`PoolManager::remove_liquidity`].
    pub async fn remove_liquidity(
        &self,
        pool_id: PoolId,
        lp_amount: Amount,
        signer: &dyn Signer,
    ) -> crate::error::Result<LiquidityReceipt> {
        self.remove_liquidity_with(pool_id, lp_amount, signer, &self.default_options())
            .await
    }

    /// [`remove_liquidity`](Self::remove_liquidity) with explicit options.
    ///
    /// # Errors
    ///
    /// See [`PoolManager::remove_liquidity`].
    pub async fn remove_liquidity_with(
        &self,
        pool_id: PoolId,
        lp_amount: Amount,
        signer: &dyn Signer,
        options: &CallOptions,
    ) -> crate::error::Result<LiquidityReceipt> {
        self.manager
            .remove_liquidity(pool_id, lp_amount, signer, options)
            .await
    }

    /// `owner`'s position in `pool_id`.
    #[must_use]
    pub fn position(&self, owner: &Address, pool_id: PoolId) -> Option<LiquidityPosition> {
        self.manager.position(owner, pool_id)
    }

    /// Every position held by `owner`.
    #[must_use]
    pub fn positions_for(&self, owner: &Address) -> Vec<LiquidityPosition> {
        self.manager.positions_for(owner)
    }

    // -- hooks ------------------------------------------------------------

    /// Whitelists a hook program. Returns `false` if it already was.
    pub fn register_hook(&self, program: Address) -> bool {
        self.registry.register(program)
    }

    /// Removes a hook program. Returns `false` if it was not whitelisted.
    pub fn remove_hook(&self, program: &Address) -> bool {
        self.registry.remove(program)
    }

    /// `true` if `program` is whitelisted.
    #[must_use]
    pub fn is_hook_safe(&self, program: &Address) -> bool {
        self.registry.is_safe(program)
    }

    /// Whitelisted hook programs, sorted.
    #[must_use]
    pub fn whitelisted_hooks(&self) -> Vec<Address> {
        self.registry.whitelisted()
    }

    // -- tokens -----------------------------------------------------------

    /// Builds a [`Token`] from the ledger's mint account, so decimals and
    /// the declared transfer hook come from the mint itself.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidInput`] if `mint` has no account or is not a mint.
    /// - [`AmmError::Chain`] if the ledger cannot be read.
    pub async fn load_token(
        &self,
        mint: Address,
        symbol: impl Into<String> + Send,
    ) -> crate::error::Result<Token> {
        let state = self
            .gateway
            .fetch_account(&mint)
            .await?
            .ok_or(AmmError::InvalidInput("mint account does not exist"))?;
        let account = state
            .as_mint()
            .ok_or(AmmError::InvalidInput("account is not a mint"))?;
        let token = Token::new(mint, account.decimals).with_symbol(symbol);
        Ok(match account.transfer_hook {
            Some(program) => token.with_transfer_hook(program),
            None => token,
        })
    }
}
