//! Pool lifecycle and the cached view of reserves.
//!
//! [`PoolManager`] owns one immutable [`Pool`] snapshot per pool behind an
//! `Arc`. Readers clone the `Arc` and price against it without blocking
//! anyone. Writers take the pool's submit lock ([`PoolGuard`]), re-check the
//! reserve version their approval was priced against, submit, and swap in
//! the next snapshot only once the ledger has confirmed.
//!
//! ```text
//! snapshot ──quote──▶ plan ──gate──▶ Approval ──lock──▶ version check ──▶ submit
//!                                                                  │
//!                         Confirmed / Reconciled ◀── commit ◀──────┘
//! ```

pub(crate) mod tx;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::chain::{
    AccountState, LedgerGateway, PoolAccount, Signer, SubmitOutcome, UnsignedTransaction,
};
use crate::domain::{
    Address, Amount, Decimals, FeeRate, LiquidityPosition, Pool, PoolId, Token, TokenPair,
    TradeStatus, TxId,
};
use crate::error::AmmError;
use crate::gate::{Approval, TradeGate, TransferPlan};
use crate::options::CallOptions;
use crate::pricing::PricingEngine;

/// Bytes allocated for a pool account: an 8-byte discriminator, five
/// addresses (two mints, two vaults, LP mint), three `u64` amounts, a
/// `u16` fee and a bump seed.
pub const POOL_ACCOUNT_SPACE: u64 = 8 + 5 * 32 + 3 * 8 + 2 + 1;

/// Parameters for [`PoolManager::create_pool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPool {
    /// First token. Becomes side A.
    pub token_a: Token,
    /// Second token. Becomes side B.
    pub token_b: Token,
    /// Initial deposit of token A.
    pub amount_a: Amount,
    /// Initial deposit of token B.
    pub amount_b: Amount,
    /// Swap fee in basis points, `[1, 1000]`.
    pub fee_bps: u32,
}

/// Outcome of a confirmed liquidity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityReceipt {
    /// Submitted transaction.
    pub tx_id: TxId,
    /// How the outcome was established.
    pub status: TradeStatus,
    /// Token A deposited or withdrawn.
    pub amount_a: Amount,
    /// Token B deposited or withdrawn.
    pub amount_b: Amount,
    /// LP tokens minted or burned.
    pub lp_tokens: Amount,
    /// Pool reserve version after the change.
    pub reserve_version: u64,
}

/// Exclusive right to submit against one pool.
///
/// Obtained from [`PoolManager::lock_pool`]; dropping it releases the pool.
#[derive(Debug)]
pub struct PoolGuard {
    pool_id: PoolId,
    _lock: OwnedMutexGuard<()>,
}

impl PoolGuard {
    /// Pool this guard covers.
    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool_id
    }
}

/// A submission that reached a definitive, successful outcome.
#[derive(Debug, Clone)]
pub(crate) struct Settlement {
    pub(crate) tx_id: TxId,
    pub(crate) status: TradeStatus,
    pub(crate) pool: Arc<Pool>,
}

#[derive(Debug, Clone)]
struct PoolSlot {
    snapshot: Arc<Pool>,
    submit_lock: Arc<AsyncMutex<()>>,
}

/// Removes its pair from the pending set when dropped, whether creation
/// succeeded, failed, or was cancelled.
struct PendingPair<'a> {
    pending: &'a Mutex<HashSet<(Address, Address)>>,
    key: (Address, Address),
}

impl Drop for PendingPair<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Creates pools, moves liquidity, and holds the reserve cache.
#[derive(Debug)]
pub struct PoolManager {
    program_id: Address,
    lp_decimals: Decimals,
    pricing: PricingEngine,
    gate: TradeGate,
    gateway: LedgerGateway,
    pools: RwLock<HashMap<PoolId, PoolSlot>>,
    positions: RwLock<HashMap<(Address, PoolId), LiquidityPosition>>,
    pending: Mutex<HashSet<(Address, Address)>>,
}

impl PoolManager {
    /// Creates an empty manager for pools owned by `program_id`.
    #[must_use]
    pub fn new(
        program_id: Address,
        lp_decimals: Decimals,
        pricing: PricingEngine,
        gate: TradeGate,
        gateway: LedgerGateway,
    ) -> Self {
        Self {
            program_id,
            lp_decimals,
            pricing,
            gate,
            gateway,
            pools: RwLock::new(HashMap::new()),
            positions: RwLock::new(HashMap::new()),
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Program that owns the pools.
    #[must_use]
    pub const fn program_id(&self) -> Address {
        self.program_id
    }

    /// Pricing engine used for every quote.
    #[must_use]
    pub const fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Gate every submission passes through.
    #[must_use]
    pub const fn gate(&self) -> &TradeGate {
        &self.gate
    }

    // -- snapshots --------------------------------------------------------

    /// Current snapshot of a pool.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] for an unknown id.
    pub fn get_pool(&self, pool_id: PoolId) -> crate::error::Result<Arc<Pool>> {
        self.pools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&pool_id)
            .map(|slot| Arc::clone(&slot.snapshot))
            .ok_or(AmmError::PoolNotFound(pool_id))
    }

    /// Every pool that trades `mint`, ordered by pool id.
    #[must_use]
    pub fn list_pools_for_token(&self, mint: &Address) -> Vec<Arc<Pool>> {
        let mut pools: Vec<Arc<Pool>> = self
            .pools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.snapshot.pair().contains(mint))
            .map(|slot| Arc::clone(&slot.snapshot))
            .collect();
        pools.sort_by_key(|pool| pool.id());
        pools
    }

    /// Every registered pool, ordered by pool id.
    #[must_use]
    pub fn pools(&self) -> Vec<Arc<Pool>> {
        let mut pools: Vec<Arc<Pool>> = self
            .pools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|slot| Arc::clone(&slot.snapshot))
            .collect();
        pools.sort_by_key(|pool| pool.id());
        pools
    }

    /// `owner`'s position in `pool_id`, if any.
    #[must_use]
    pub fn position(&self, owner: &Address, pool_id: PoolId) -> Option<LiquidityPosition> {
        self.positions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(*owner, pool_id))
            .copied()
    }

    /// Every position held by `owner`, ordered by pool id.
    #[must_use]
    pub fn positions_for(&self, owner: &Address) -> Vec<LiquidityPosition> {
        let mut positions: Vec<LiquidityPosition> = self
            .positions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|p| p.owner() == *owner)
            .copied()
            .collect();
        positions.sort_by_key(LiquidityPosition::pool_id);
        positions
    }

    /// Waits for exclusive submit rights on `pool_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] for an unknown id.
    pub async fn lock_pool(&self, pool_id: PoolId) -> crate::error::Result<PoolGuard> {
        let lock = self
            .pools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&pool_id)
            .map(|slot| Arc::clone(&slot.submit_lock))
            .ok_or(AmmError::PoolNotFound(pool_id))?;
        Ok(PoolGuard {
            pool_id,
            _lock: lock.lock_owned().await,
        })
    }

    // -- lifecycle --------------------------------------------------------

    /// Creates and funds a pool in one atomic submission.
    ///
    /// The pool is registered locally only after the ledger confirms it.
    /// The signer funds the deposit and the rent, and receives the initial
    /// LP tokens.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidFeeRate`], [`AmmError::InvalidPair`],
    ///   [`AmmError::InvalidAmount`] for bad parameters.
    /// - [`AmmError::PoolExists`] if the pair is registered, being created,
    ///   or already has a pool account on the ledger.
    /// - [`AmmError::InvalidInput`] if a token does not match its mint account.
    /// - Any gate error, [`AmmError::Cancelled`], [`AmmError::SubmissionFailed`]
    ///   or [`AmmError::Indeterminate`].
    pub async fn create_pool(
        &self,
        params: NewPool,
        signer: &dyn Signer,
        options: &CallOptions,
    ) -> crate::error::Result<Arc<Pool>> {
        let fee_rate = FeeRate::new(params.fee_bps)?;
        let pair = TokenPair::new(params.token_a, params.token_b)?;
        if params.amount_a.is_zero() || params.amount_b.is_zero() {
            return Err(AmmError::InvalidAmount("initial deposit must be positive"));
        }
        let pool_id = PoolId::derive(
            &self.program_id,
            &pair.token_a().mint(),
            &pair.token_b().mint(),
        );
        if self.get_pool(pool_id).is_ok() {
            return Err(AmmError::PoolExists(pool_id));
        }
        let _pending = self.reserve_pair(pair.key(), pool_id)?;

        if self.gateway.fetch_account(&pool_id.address()).await?.is_some() {
            return Err(AmmError::PoolExists(pool_id));
        }
        self.verify_token(pair.token_a()).await?;
        self.verify_token(pair.token_b()).await?;

        let pool = Pool::new(pool_id, pair, fee_rate);
        let lp_minted = self
            .pricing
            .quote_add_liquidity(&pool, params.amount_a, params.amount_b)?;
        let expected = pool.apply_deposit(params.amount_a, params.amount_b, lp_minted)?;
        let rent = self.gateway.min_balance_for_space(POOL_ACCOUNT_SPACE).await?;
        let owner = signer.identity();
        let transaction = tx::create_pool(
            &pool,
            owner,
            params.amount_a,
            params.amount_b,
            lp_minted,
            self.lp_decimals,
            rent,
        );
        let plan = TransferPlan::new(
            pool_id,
            pool.reserve_version(),
            vec![pool.token_a().clone(), pool.token_b().clone()],
            transaction,
        )?;
        let approval = self.gate.evaluate(plan, options.timeouts.simulate).await?;

        options.cancel.check()?;
        let signed = signer
            .sign(approval.transaction())
            .await
            .map_err(|e| AmmError::SubmissionFailed(e.to_string()))?;
        let status = match self.gateway.submit(&signed, options.timeouts.submit).await {
            SubmitOutcome::Confirmed(_) => TradeStatus::Confirmed,
            SubmitOutcome::Failed(e) => return Err(AmmError::SubmissionFailed(e.to_string())),
            SubmitOutcome::TimedOut(tx_id) => {
                let landed = self
                    .read_pool_account(pool_id)
                    .await
                    .is_some_and(|account| matches_pool(&account, &expected));
                if !landed {
                    tracing::warn!(pool = %pool_id, %tx_id, "pool creation outcome unknown");
                    return Err(AmmError::Indeterminate { tx_id });
                }
                TradeStatus::Reconciled
            }
        };

        let snapshot = Arc::new(expected);
        self.pools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                pool_id,
                PoolSlot {
                    snapshot: Arc::clone(&snapshot),
                    submit_lock: Arc::new(AsyncMutex::new(())),
                },
            );
        self.set_position(owner, pool_id, lp_minted);
        tracing::info!(
            pool = %pool_id,
            pair = %format_pair(&snapshot),
            fee = %fee_rate,
            lp_minted = %lp_minted,
            ?status,
            "pool created"
        );
        Ok(snapshot)
    }

    /// Deposits both tokens at the pool's ratio and mints LP tokens to the
    /// signer.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolNotFound`], [`AmmError::InvalidAmount`],
    ///   [`AmmError::InvalidRatio`] before any I/O.
    /// - Any gate error, [`AmmError::StaleQuote`], [`AmmError::Cancelled`],
    ///   [`AmmError::SubmissionFailed`] or [`AmmError::Indeterminate`].
    pub async fn add_liquidity(
        &self,
        pool_id: PoolId,
        amount_a: Amount,
        amount_b: Amount,
        signer: &dyn Signer,
        options: &CallOptions,
    ) -> crate::error::Result<LiquidityReceipt> {
        let owner = signer.identity();
        let pool = self.get_pool(pool_id)?;
        let lp_minted = self.pricing.quote_add_liquidity(&pool, amount_a, amount_b)?;
        let transaction = tx::add_liquidity(&pool, owner, amount_a, amount_b, lp_minted);
        let approval = self.approve(&pool, transaction, options).await?;

        let settled = self
            .settle(approval, signer, options, |current| {
                current.apply_deposit(amount_a, amount_b, lp_minted)
            })
            .await?;
        self.adjust_position(owner, pool_id, |held| {
            held.try_add(&lp_minted, "LP position overflow")
        })?;
        tracing::info!(pool = %pool_id, %owner, lp_minted = %lp_minted, "liquidity added");
        Ok(LiquidityReceipt {
            tx_id: settled.tx_id,
            status: settled.status,
            amount_a,
            amount_b,
            lp_tokens: lp_minted,
            reserve_version: settled.pool.reserve_version(),
        })
    }

    /// Burns `lp_amount` of the signer's LP tokens for a pro-rata share of
    /// both reserves.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolNotFound`].
    /// - [`AmmError::InvalidInput`] if `lp_amount` is zero or exceeds the
    ///   signer's position. Nothing is submitted and reserves stay put.
    /// - Any gate error, [`AmmError::StaleQuote`], [`AmmError::Cancelled`],
    ///   [`AmmError::SubmissionFailed`] or [`AmmError::Indeterminate`].
    pub async fn remove_liquidity(
        &self,
        pool_id: PoolId,
        lp_amount: Amount,
        signer: &dyn Signer,
        options: &CallOptions,
    ) -> crate::error::Result<LiquidityReceipt> {
        let owner = signer.identity();
        let pool = self.get_pool(pool_id)?;
        let position = self
            .position(&owner, pool_id)
            .unwrap_or_else(|| LiquidityPosition::new(owner, pool_id, Amount::ZERO));
        let (amount_a, amount_b) =
            self.pricing
                .quote_remove_liquidity(&pool, &position, lp_amount)?;
        let transaction = tx::remove_liquidity(&pool, owner, lp_amount, amount_a, amount_b);
        let approval = self.approve(&pool, transaction, options).await?;

        let settled = self
            .settle(approval, signer, options, |current| {
                current.apply_withdrawal(amount_a, amount_b, lp_amount)
            })
            .await?;
        self.adjust_position(owner, pool_id, |held| {
            held.try_sub(&lp_amount, "LP position underflow")
        })?;
        tracing::info!(pool = %pool_id, %owner, lp_burned = %lp_amount, "liquidity removed");
        Ok(LiquidityReceipt {
            tx_id: settled.tx_id,
            status: settled.status,
            amount_a,
            amount_b,
            lp_tokens: lp_amount,
            reserve_version: settled.pool.reserve_version(),
        })
    }

    /// Re-reads the pool account, and `owner`'s position account when
    /// given, and overwrites the cache with what the ledger holds.
    ///
    /// The reserve version is bumped only if the reserves or supply changed.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolNotFound`] if the pool is unknown locally or has
    ///   no account on the ledger.
    /// - [`AmmError::Chain`] if the ledger cannot be read.
    pub async fn reconcile(
        &self,
        pool_id: PoolId,
        owner: Option<Address>,
    ) -> crate::error::Result<Arc<Pool>> {
        let guard = self.lock_pool(pool_id).await?;
        let current = self.get_pool(pool_id)?;
        let account = self
            .gateway
            .fetch_account(&pool_id.address())
            .await?
            .as_ref()
            .and_then(AccountState::as_pool)
            .copied()
            .ok_or(AmmError::PoolNotFound(pool_id))?;
        let snapshot = match current.resync(account.reserve_a, account.reserve_b, account.lp_supply)
        {
            Some(next) => {
                tracing::info!(
                    pool = %pool_id,
                    version = next.reserve_version(),
                    "cache overwritten from ledger"
                );
                self.commit(&guard, next)?
            }
            None => current,
        };

        if let Some(owner) = owner {
            let held = self
                .gateway
                .fetch_account(&pool_id.position_account(&owner))
                .await?
                .as_ref()
                .and_then(AccountState::as_position)
                .map_or(Amount::ZERO, |p| p.lp_tokens);
            self.set_position(owner, pool_id, held);
        }
        Ok(snapshot)
    }

    // -- submission -------------------------------------------------------

    /// Runs both gate phases for a transaction priced against `pool`.
    pub(crate) async fn approve(
        &self,
        pool: &Pool,
        transaction: UnsignedTransaction,
        options: &CallOptions,
    ) -> crate::error::Result<Approval> {
        options.cancel.check()?;
        let plan = TransferPlan::new(
            pool.id(),
            pool.reserve_version(),
            vec![pool.token_a().clone(), pool.token_b().clone()],
            transaction,
        )?;
        self.gate.evaluate(plan, options.timeouts.simulate).await
    }

    /// Submits an approved transaction under the pool lock.
    ///
    /// `apply` computes the post-state from the locked snapshot. It is
    /// evaluated before dispatch and committed only on a definitive
    /// success: a confirmation, or a timeout after which the ledger shows
    /// exactly that post-state.
    pub(crate) async fn settle<F>(
        &self,
        approval: Approval,
        signer: &dyn Signer,
        options: &CallOptions,
        apply: F,
    ) -> crate::error::Result<Settlement>
    where
        F: FnOnce(&Pool) -> crate::error::Result<Pool> + Send,
    {
        options.cancel.check()?;
        let guard = self.lock_pool(approval.pool_id()).await?;
        let current = self.get_pool(approval.pool_id())?;
        approval.ensure_current(current.reserve_version())?;
        let expected = apply(&current)?;
        options.cancel.check()?;

        let signed = signer
            .sign(approval.transaction())
            .await
            .map_err(|e| AmmError::SubmissionFailed(e.to_string()))?;
        match self.gateway.submit(&signed, options.timeouts.submit).await {
            SubmitOutcome::Confirmed(confirmation) => Ok(Settlement {
                tx_id: confirmation.tx_id,
                status: TradeStatus::Confirmed,
                pool: self.commit(&guard, expected)?,
            }),
            SubmitOutcome::Failed(e) => Err(AmmError::SubmissionFailed(e.to_string())),
            SubmitOutcome::TimedOut(tx_id) => {
                self.reconcile_timeout(&guard, &current, expected, tx_id)
                    .await
            }
        }
    }

    async fn reconcile_timeout(
        &self,
        guard: &PoolGuard,
        current: &Pool,
        expected: Pool,
        tx_id: TxId,
    ) -> crate::error::Result<Settlement> {
        let pool_id = current.id();
        let Some(account) = self.read_pool_account(pool_id).await else {
            tracing::warn!(pool = %pool_id, %tx_id, "ledger unreadable after timeout");
            return Err(AmmError::Indeterminate { tx_id });
        };
        if matches_pool(&account, &expected) {
            tracing::info!(pool = %pool_id, %tx_id, "timed-out submission found on ledger");
            return Ok(Settlement {
                tx_id,
                status: TradeStatus::Reconciled,
                pool: self.commit(guard, expected)?,
            });
        }
        if let Some(next) = current.resync(account.reserve_a, account.reserve_b, account.lp_supply)
        {
            self.commit(guard, next)?;
        }
        tracing::warn!(pool = %pool_id, %tx_id, "timed-out submission not reflected on ledger");
        Err(AmmError::Indeterminate { tx_id })
    }

    /// Swaps in the next snapshot. Requires the pool's guard.
    fn commit(&self, guard: &PoolGuard, next: Pool) -> crate::error::Result<Arc<Pool>> {
        if guard.pool_id != next.id() {
            return Err(AmmError::InvalidInput("guard does not cover this pool"));
        }
        let snapshot = Arc::new(next);
        let mut pools = self.pools.write().unwrap_or_else(PoisonError::into_inner);
        let slot = pools
            .get_mut(&guard.pool_id)
            .ok_or(AmmError::PoolNotFound(guard.pool_id))?;
        slot.snapshot = Arc::clone(&snapshot);
        tracing::debug!(
            pool = %guard.pool_id,
            version = snapshot.reserve_version(),
            "snapshot committed"
        );
        Ok(snapshot)
    }

    // -- helpers ----------------------------------------------------------

    fn reserve_pair(
        &self,
        key: (Address, Address),
        pool_id: PoolId,
    ) -> crate::error::Result<PendingPair<'_>> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.insert(key) {
            return Err(AmmError::PoolExists(pool_id));
        }
        Ok(PendingPair {
            pending: &self.pending,
            key,
        })
    }

    async fn verify_token(&self, token: &Token) -> crate::error::Result<()> {
        let mint = self
            .gateway
            .fetch_account(&token.mint())
            .await?
            .as_ref()
            .and_then(AccountState::as_mint)
            .copied()
            .ok_or(AmmError::InvalidInput("mint account does not exist"))?;
        if mint.decimals != token.decimals() || mint.transfer_hook != token.transfer_hook() {
            return Err(AmmError::InvalidInput(
                "token metadata does not match its mint account",
            ));
        }
        Ok(())
    }

    async fn read_pool_account(&self, pool_id: PoolId) -> Option<PoolAccount> {
        match self.gateway.fetch_account(&pool_id.address()).await {
            Ok(state) => state.as_ref().and_then(AccountState::as_pool).copied(),
            Err(e) => {
                tracing::warn!(pool = %pool_id, error = %e, "pool account read failed");
                None
            }
        }
    }

    fn set_position(&self, owner: Address, pool_id: PoolId, lp_tokens: Amount) {
        let mut positions = self
            .positions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        store_position(&mut positions, owner, pool_id, lp_tokens);
    }

    /// Reads and rewrites one position under a single write lock.
    fn adjust_position<F>(
        &self,
        owner: Address,
        pool_id: PoolId,
        change: F,
    ) -> crate::error::Result<Amount>
    where
        F: FnOnce(Amount) -> crate::error::Result<Amount>,
    {
        let mut positions = self
            .positions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let held = positions
            .get(&(owner, pool_id))
            .map_or(Amount::ZERO, LiquidityPosition::lp_tokens);
        let next = change(held)?;
        store_position(&mut positions, owner, pool_id, next);
        Ok(next)
    }
}

fn store_position(
    positions: &mut HashMap<(Address, PoolId), LiquidityPosition>,
    owner: Address,
    pool_id: PoolId,
    lp_tokens: Amount,
) {
    if lp_tokens.is_zero() {
        positions.remove(&(owner, pool_id));
    } else {
        positions.insert(
            (owner, pool_id),
            LiquidityPosition::new(owner, pool_id, lp_tokens),
        );
    }
}

fn matches_pool(account: &PoolAccount, pool: &Pool) -> bool {
    account.reserve_a == pool.reserve_a()
        && account.reserve_b == pool.reserve_b()
        && account.lp_supply == pool.lp_supply()
}

fn format_pair(pool: &Pool) -> String {
    format!("{}/{}", pool.token_a().symbol(), pool.token_b().symbol())
}
