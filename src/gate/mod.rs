//! Two-phase pre-trade validation.
//!
//! Every state-changing submission passes through the gate:
//!
//! ```text
//! Quoted ──check_hooks──▶ HookChecked ──simulate──▶ Approval
//!    │                        │
//!    └── HookNotWhitelisted   └── HookDeniedTransfer / SimulationFailed
//! ```
//!
//! Each stage is its own type and every transition consumes its input, so
//! a plan cannot be simulated before its hooks were checked, and an
//! [`Approval`] can only come out of a clean simulation.

mod plan;

use std::sync::Arc;
use std::time::Duration;

use crate::chain::{LedgerGateway, SimulationError, UnsignedTransaction};
use crate::domain::PoolId;
use crate::error::AmmError;
use crate::hooks::HookRegistry;

pub use plan::TransferPlan;

/// Stage a plan has reached, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateStage {
    /// Priced, not yet checked.
    Quoted,
    /// Every declared hook is whitelisted.
    HookChecked,
    /// Dry run completed.
    Simulated,
    /// Cleared for submission.
    Approved,
    /// Refused.
    Rejected,
}

/// A plan that has been priced but not yet checked.
#[derive(Debug)]
pub struct Quoted {
    plan: TransferPlan,
}

/// A plan whose hooks are all whitelisted.
#[derive(Debug)]
pub struct HookChecked {
    plan: TransferPlan,
}

/// Proof that a transaction passed both gate phases.
///
/// Only the gate constructs approvals. The executor submits exactly
/// [`transaction`](Self::transaction) and must compare
/// [`reserve_version`](Self::reserve_version) with the live pool first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pool_id: PoolId,
    reserve_version: u64,
    transaction: UnsignedTransaction,
}

impl Approval {
    /// Pool the approval is for.
    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// Reserve version the plan was priced against.
    #[must_use]
    pub const fn reserve_version(&self) -> u64 {
        self.reserve_version
    }

    /// The transaction that was simulated.
    #[must_use]
    pub const fn transaction(&self) -> &UnsignedTransaction {
        &self.transaction
    }

    /// Checks the approval still describes `current_version`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::StaleQuote`] on mismatch.
    pub const fn ensure_current(&self, current_version: u64) -> crate::error::Result<()> {
        if self.reserve_version != current_version {
            return Err(AmmError::StaleQuote {
                quoted: self.reserve_version,
                current: current_version,
            });
        }
        Ok(())
    }
}

impl Quoted {
    /// Enters the gate.
    #[must_use]
    pub const fn new(plan: TransferPlan) -> Self {
        Self { plan }
    }

    /// Phase one: every token that declares a hook must name a whitelisted
    /// program.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::HookNotWhitelisted`] for the first unknown hook.
    pub fn check_hooks(self, registry: &HookRegistry) -> crate::error::Result<HookChecked> {
        for program in self.plan.hook_programs() {
            if !registry.is_safe(&program) {
                tracing::warn!(
                    pool = %self.plan.pool_id(),
                    %program,
                    stage = ?GateStage::Rejected,
                    "hook is not whitelisted"
                );
                return Err(AmmError::HookNotWhitelisted(program));
            }
        }
        tracing::debug!(
            pool = %self.plan.pool_id(),
            stage = ?GateStage::HookChecked,
            "hooks cleared"
        );
        Ok(HookChecked { plan: self.plan })
    }
}

impl HookChecked {
    /// Phase two: dry-run the exact transaction.
    ///
    /// # Errors
    ///
    /// - [`AmmError::HookDeniedTransfer`] if a hook refused the transfer.
    /// - [`AmmError::SimulationFailed`] for any other failure, a timeout,
    ///   or a ledger that could not run the simulation.
    pub async fn simulate(
        self,
        gateway: &LedgerGateway,
        deadline: Duration,
    ) -> crate::error::Result<Approval> {
        let pool_id = self.plan.pool_id();
        let outcome = gateway
            .simulate(self.plan.transaction(), deadline)
            .await
            .map_err(|err| {
                tracing::warn!(pool = %pool_id, stage = ?GateStage::Rejected, error = %err, "simulation did not run");
                err
            })?;
        tracing::debug!(
            pool = %pool_id,
            stage = ?GateStage::Simulated,
            ok = outcome.will_succeed,
            "simulation finished"
        );
        if !outcome.will_succeed {
            let err = match outcome.error {
                Some(SimulationError::HookRejected { program, reason }) => {
                    AmmError::HookDeniedTransfer { program, reason }
                }
                Some(SimulationError::Failed(reason)) => AmmError::SimulationFailed(reason),
                None => AmmError::SimulationFailed("simulation reported failure".to_string()),
            };
            tracing::warn!(pool = %pool_id, stage = ?GateStage::Rejected, error = %err, "simulation rejected plan");
            return Err(err);
        }
        let (pool_id, reserve_version, transaction) = self.plan.into_parts();
        tracing::debug!(pool = %pool_id, reserve_version, stage = ?GateStage::Approved, "plan approved");
        Ok(Approval {
            pool_id,
            reserve_version,
            transaction,
        })
    }
}

/// Runs both gate phases against a shared registry and ledger.
#[derive(Debug, Clone)]
pub struct TradeGate {
    registry: Arc<HookRegistry>,
    gateway: LedgerGateway,
}

impl TradeGate {
    /// Creates a gate.
    #[must_use]
    pub const fn new(registry: Arc<HookRegistry>, gateway: LedgerGateway) -> Self {
        Self { registry, gateway }
    }

    /// Returns the hook registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Checks hooks, then simulates. No simulation is issued if any hook is
    /// unknown.
    ///
    /// # Errors
    ///
    /// See [`Quoted::check_hooks`] and [`HookChecked::simulate`].
    pub async fn evaluate(
        &self,
        plan: TransferPlan,
        simulate_deadline: Duration,
    ) -> crate::error::Result<Approval> {
        Quoted::new(plan)
            .check_hooks(&self.registry)?
            .simulate(&self.gateway, simulate_deadline)
            .await
    }
}
