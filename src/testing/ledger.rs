use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::chain::{
    token_account_address, AccountState, ChainClient, ChainError, Confirmation, Instruction,
    MintAccount, PoolAccount, PositionAccount, SignedTransaction, SimulationError,
    SimulationOutcome, TokenAccount, UnsignedTransaction,
};
use crate::domain::{Address, Amount, Decimals, PoolId};

const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;
const RENT_PER_BYTE: u64 = 6_960;

/// How a hook program responds to a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookBehavior {
    /// Accept every transfer.
    Allow,
    /// Reject every transfer with the given reason.
    Deny(String),
    /// Reject transfers strictly larger than the limit.
    DenyAbove(Amount),
}

enum Rejection {
    Hook { program: Address, reason: String },
    Program(String),
}

impl Rejection {
    fn program(reason: impl Into<String>) -> Self {
        Self::Program(reason.into())
    }

    fn into_simulation_error(self) -> SimulationError {
        match self {
            Self::Hook { program, reason } => SimulationError::HookRejected { program, reason },
            Self::Program(reason) => SimulationError::Failed(reason),
        }
    }

    fn into_chain_error(self) -> ChainError {
        match self {
            Self::Hook { program, reason } => {
                ChainError::Rejected(format!("transfer hook {program} failed: {reason}"))
            }
            Self::Program(reason) => ChainError::Rejected(reason),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    accounts: HashMap<Address, AccountState>,
    lamports: HashMap<Address, u64>,
}

impl LedgerState {
    fn mint(&self, mint: &Address) -> Result<MintAccount, Rejection> {
        self.accounts
            .get(mint)
            .and_then(AccountState::as_mint)
            .copied()
            .ok_or_else(|| Rejection::program(format!("unknown mint {mint}")))
    }

    fn pool(&self, pool: &PoolId) -> Result<PoolAccount, Rejection> {
        self.accounts
            .get(&pool.address())
            .and_then(AccountState::as_pool)
            .copied()
            .ok_or_else(|| Rejection::program(format!("unknown pool {pool}")))
    }

    fn balance(&self, owner: &Address, mint: &Address) -> Amount {
        match self.accounts.get(&token_account_address(owner, mint)) {
            Some(AccountState::TokenAccount(acc)) => acc.amount,
            _ => Amount::ZERO,
        }
    }

    fn set_balance(&mut self, owner: &Address, mint: &Address, amount: Amount) {
        self.accounts.insert(
            token_account_address(owner, mint),
            AccountState::TokenAccount(TokenAccount {
                owner: *owner,
                mint: *mint,
                amount,
            }),
        );
    }

    fn credit(&mut self, owner: &Address, mint: &Address, amount: Amount) -> Result<(), Rejection> {
        let next = self
            .balance(owner, mint)
            .checked_add(&amount)
            .ok_or_else(|| Rejection::program("token balance overflow"))?;
        self.set_balance(owner, mint, next);
        Ok(())
    }

    fn debit(&mut self, owner: &Address, mint: &Address, amount: Amount) -> Result<(), Rejection> {
        let next = self
            .balance(owner, mint)
            .checked_sub(&amount)
            .ok_or_else(|| Rejection::program("insufficient funds"))?;
        self.set_balance(owner, mint, next);
        Ok(())
    }

    fn adjust_supply(&mut self, mint: &Address, minted: Amount, burned: Amount) -> Result<(), Rejection> {
        let mut account = self.mint(mint)?;
        account.supply = account
            .supply
            .checked_add(&minted)
            .and_then(|s| s.checked_sub(&burned))
            .ok_or_else(|| Rejection::program("mint supply out of range"))?;
        self.accounts.insert(*mint, AccountState::Mint(account));
        Ok(())
    }

    fn apply(
        &mut self,
        tx: &UnsignedTransaction,
        hooks: &HashMap<Address, HookBehavior>,
    ) -> Result<(), Rejection> {
        let mut touched = BTreeSet::new();
        for ix in &tx.instructions {
            self.apply_instruction(ix, hooks, &mut touched)?;
        }
        for pool in touched {
            self.check_vaults(&pool)?;
        }
        Ok(())
    }

    fn apply_instruction(
        &mut self,
        ix: &Instruction,
        hooks: &HashMap<Address, HookBehavior>,
        touched: &mut BTreeSet<PoolId>,
    ) -> Result<(), Rejection> {
        match ix {
            Instruction::Transfer {
                mint,
                from,
                to,
                amount,
            } => {
                if let Some(program) = self.mint(mint)?.transfer_hook {
                    run_hook(hooks, program, *amount)?;
                }
                self.debit(from, mint, *amount)?;
                self.credit(to, mint, *amount)
            }
            Instruction::InitializeMint {
                mint,
                decimals,
                authority,
            } => {
                if self.accounts.contains_key(mint) {
                    return Err(Rejection::program("account already in use"));
                }
                self.accounts.insert(
                    *mint,
                    AccountState::Mint(MintAccount {
                        decimals: *decimals,
                        supply: Amount::ZERO,
                        transfer_hook: None,
                        authority: *authority,
                    }),
                );
                Ok(())
            }
            Instruction::InitializePool {
                pool,
                mint_a,
                mint_b,
                lp_mint,
                fee_bps,
                funder,
                lamports,
            } => {
                if self.accounts.contains_key(&pool.address()) {
                    return Err(Rejection::program("account already in use"));
                }
                let balance = self.lamports.get(funder).copied().unwrap_or(0);
                let remaining = balance
                    .checked_sub(*lamports)
                    .ok_or_else(|| Rejection::program("insufficient lamports for rent"))?;
                self.lamports.insert(*funder, remaining);
                self.accounts.insert(
                    pool.address(),
                    AccountState::Pool(PoolAccount {
                        mint_a: *mint_a,
                        mint_b: *mint_b,
                        reserve_a: Amount::ZERO,
                        reserve_b: Amount::ZERO,
                        lp_mint: *lp_mint,
                        lp_supply: Amount::ZERO,
                        fee_bps: *fee_bps,
                        lamports: *lamports,
                    }),
                );
                Ok(())
            }
            Instruction::AddLiquidity {
                pool,
                owner,
                amount_a,
                amount_b,
                lp_minted,
            } => {
                let mut account = self.pool(pool)?;
                account.reserve_a = add(account.reserve_a, *amount_a)?;
                account.reserve_b = add(account.reserve_b, *amount_b)?;
                account.lp_supply = add(account.lp_supply, *lp_minted)?;
                self.credit(owner, &account.lp_mint, *lp_minted)?;
                self.adjust_supply(&account.lp_mint, *lp_minted, Amount::ZERO)?;
                self.adjust_position(pool, owner, *lp_minted, Amount::ZERO)?;
                self.accounts.insert(pool.address(), AccountState::Pool(account));
                touched.insert(*pool);
                Ok(())
            }
            Instruction::RemoveLiquidity {
                pool,
                owner,
                lp_burned,
                amount_a,
                amount_b,
            } => {
                let mut account = self.pool(pool)?;
                self.debit(owner, &account.lp_mint, *lp_burned)
                    .map_err(|_| Rejection::program("insufficient LP balance"))?;
                self.adjust_supply(&account.lp_mint, Amount::ZERO, *lp_burned)?;
                self.adjust_position(pool, owner, Amount::ZERO, *lp_burned)?;
                account.reserve_a = sub(account.reserve_a, *amount_a)?;
                account.reserve_b = sub(account.reserve_b, *amount_b)?;
                account.lp_supply = sub(account.lp_supply, *lp_burned)?;
                self.accounts.insert(pool.address(), AccountState::Pool(account));
                touched.insert(*pool);
                Ok(())
            }
            Instruction::Swap {
                pool,
                input_mint,
                amount_in,
                amount_out,
                ..
            } => {
                let mut account = self.pool(pool)?;
                let k_before = account.reserve_a.widen() * account.reserve_b.widen();
                if *input_mint == account.mint_a {
                    account.reserve_a = add(account.reserve_a, *amount_in)?;
                    account.reserve_b = sub(account.reserve_b, *amount_out)?;
                } else if *input_mint == account.mint_b {
                    account.reserve_b = add(account.reserve_b, *amount_in)?;
                    account.reserve_a = sub(account.reserve_a, *amount_out)?;
                } else {
                    return Err(Rejection::program("input mint not in pool"));
                }
                let k_after = account.reserve_a.widen() * account.reserve_b.widen();
                if k_after < k_before {
                    return Err(Rejection::program("constant product violated"));
                }
                self.accounts.insert(pool.address(), AccountState::Pool(account));
                touched.insert(*pool);
                Ok(())
            }
        }
    }

    fn adjust_position(
        &mut self,
        pool: &PoolId,
        owner: &Address,
        added: Amount,
        removed: Amount,
    ) -> Result<(), Rejection> {
        let address = pool.position_account(owner);
        let held = match self.accounts.get(&address) {
            Some(AccountState::Position(p)) => p.lp_tokens,
            _ => Amount::ZERO,
        };
        let next = held
            .checked_add(&added)
            .and_then(|v| v.checked_sub(&removed))
            .ok_or_else(|| Rejection::program("insufficient LP position"))?;
        if next.is_zero() {
            self.accounts.remove(&address);
        } else {
            self.accounts.insert(
                address,
                AccountState::Position(PositionAccount {
                    owner: *owner,
                    pool: *pool,
                    lp_tokens: next,
                }),
            );
        }
        Ok(())
    }

    fn check_vaults(&self, pool: &PoolId) -> Result<(), Rejection> {
        let account = self.pool(pool)?;
        let vault_a = self.balance(&pool.vault(&account.mint_a), &account.mint_a);
        let vault_b = self.balance(&pool.vault(&account.mint_b), &account.mint_b);
        if vault_a != account.reserve_a || vault_b != account.reserve_b {
            return Err(Rejection::program("vault balances do not match reserves"));
        }
        Ok(())
    }
}

fn run_hook(
    hooks: &HashMap<Address, HookBehavior>,
    program: Address,
    amount: Amount,
) -> Result<(), Rejection> {
    match hooks.get(&program) {
        None | Some(HookBehavior::Allow) => Ok(()),
        Some(HookBehavior::Deny(reason)) => Err(Rejection::Hook {
            program,
            reason: reason.clone(),
        }),
        Some(HookBehavior::DenyAbove(limit)) if amount > *limit => Err(Rejection::Hook {
            program,
            reason: format!("transfer of {amount} exceeds limit {limit}"),
        }),
        Some(HookBehavior::DenyAbove(_)) => Ok(()),
    }
}

fn add(a: Amount, b: Amount) -> Result<Amount, Rejection> {
    a.checked_add(&b)
        .ok_or_else(|| Rejection::program("reserve overflow"))
}

fn sub(a: Amount, b: Amount) -> Result<Amount, Rejection> {
    a.checked_sub(&b)
        .ok_or_else(|| Rejection::program("reserve underflow"))
}

/// A ledger held in memory.
///
/// Every transaction is applied to a copy of the state and only swapped in
/// if all instructions succeed, so submissions are atomic. Simulations run
/// the same code on a throwaway copy.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    hooks: Mutex<HashMap<Address, HookBehavior>>,
    simulate_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    read_failures: AtomicU32,
    submit_failure: Mutex<Option<String>>,
    submit_delay: Mutex<Option<Duration>>,
    simulate_delay: Mutex<Option<Duration>>,
    stalled: AtomicBool,
    slot: AtomicU64,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hooks_snapshot(&self) -> HashMap<Address, HookBehavior> {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Creates a mint, optionally declaring a transfer hook.
    pub fn create_mint(&self, mint: Address, decimals: Decimals, transfer_hook: Option<Address>) {
        self.state().accounts.insert(
            mint,
            AccountState::Mint(MintAccount {
                decimals,
                supply: Amount::ZERO,
                transfer_hook,
                authority: Address::ZERO,
            }),
        );
    }

    /// Mints `amount` of `mint` to `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Rejected`] for an unknown mint or overflow.
    pub fn mint_to(&self, owner: &Address, mint: &Address, amount: Amount) -> Result<(), ChainError> {
        let mut state = self.state();
        state
            .adjust_supply(mint, amount, Amount::ZERO)
            .and_then(|()| state.credit(owner, mint, amount))
            .map_err(Rejection::into_chain_error)
    }

    /// Credits native lamports to `owner`.
    pub fn airdrop(&self, owner: &Address, lamports: u64) {
        let mut state = self.state();
        let balance = state.lamports.entry(*owner).or_insert(0);
        *balance = balance.saturating_add(lamports);
    }

    /// Token balance of `owner` in `mint`.
    #[must_use]
    pub fn balance(&self, owner: &Address, mint: &Address) -> Amount {
        self.state().balance(owner, mint)
    }

    /// Native lamports held by `owner`.
    #[must_use]
    pub fn lamports(&self, owner: &Address) -> u64 {
        self.state().lamports.get(owner).copied().unwrap_or(0)
    }

    /// Reads an account without going through the async client path.
    #[must_use]
    pub fn account(&self, address: &Address) -> Option<AccountState> {
        self.state().accounts.get(address).copied()
    }

    /// Sets how the hook `program` responds to transfers.
    pub fn set_hook_behavior(&self, program: Address, behavior: HookBehavior) {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(program, behavior);
    }

    /// Applies `tx` as if another party had submitted it.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Rejected`] if any instruction fails.
    pub fn apply_external(&self, tx: &UnsignedTransaction) -> Result<(), ChainError> {
        self.commit(tx).map(|_| ())
    }

    /// Number of `simulate` calls so far.
    #[must_use]
    pub fn simulate_calls(&self) -> usize {
        self.simulate_calls.load(Ordering::SeqCst)
    }

    /// Number of `submit` calls so far.
    #[must_use]
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Makes the next `count` reads fail with [`ChainError::Transient`].
    pub fn fail_next_reads(&self, count: u32) {
        self.read_failures.store(count, Ordering::SeqCst);
    }

    /// Makes the next submission fail with [`ChainError::Rejected`].
    pub fn fail_next_submit(&self, reason: impl Into<String>) {
        *self
            .submit_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(reason.into());
    }

    /// Delays confirmations. The transaction is committed before the
    /// delay, so a caller that gives up early still finds it on the ledger.
    pub fn set_submit_delay(&self, delay: Duration) {
        *self
            .submit_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(delay);
    }

    /// Delays simulation results.
    pub fn set_simulate_delay(&self, delay: Duration) {
        *self
            .simulate_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(delay);
    }

    /// When set, submissions hang forever without committing.
    pub fn stall_submissions(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    fn take_read_failure(&self) -> bool {
        self.read_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn commit(&self, tx: &UnsignedTransaction) -> Result<u64, ChainError> {
        let hooks = self.hooks_snapshot();
        let mut state = self.state();
        let mut next = state.clone();
        next.apply(tx, &hooks).map_err(Rejection::into_chain_error)?;
        *state = next;
        Ok(self.slot.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl ChainClient for InMemoryLedger {
    async fn fetch_account(&self, address: &Address) -> Result<Option<AccountState>, ChainError> {
        if self.take_read_failure() {
            return Err(ChainError::Transient("injected read failure".to_string()));
        }
        Ok(self.account(address))
    }

    async fn simulate(&self, tx: &UnsignedTransaction) -> Result<SimulationOutcome, ChainError> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self
            .simulate_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let hooks = self.hooks_snapshot();
        let mut scratch = self.state().clone();
        Ok(match scratch.apply(tx, &hooks) {
            Ok(()) => SimulationOutcome::success(),
            Err(rejection) => SimulationOutcome::failure(rejection.into_simulation_error()),
        })
    }

    async fn submit(&self, tx: &SignedTransaction) -> Result<Confirmation, ChainError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let injected = self
            .submit_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(reason) = injected {
            return Err(ChainError::Rejected(reason));
        }
        let slot = self.commit(&tx.message)?;
        let delay = *self
            .submit_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Confirmation {
            tx_id: tx.tx_id(),
            slot,
        })
    }

    async fn min_balance_for_space(&self, space: u64) -> Result<u64, ChainError> {
        if self.take_read_failure() {
            return Err(ChainError::Transient("injected read failure".to_string()));
        }
        Ok(space.saturating_add(ACCOUNT_STORAGE_OVERHEAD).saturating_mul(RENT_PER_BYTE))
    }
}
