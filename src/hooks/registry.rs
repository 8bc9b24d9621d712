//! Whitelist of transfer-hook programs that are safe for automated trading.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::domain::Address;

/// Safety classification of a hook program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookStatus {
    /// Reviewed and approved for automated trading.
    Whitelisted,
    /// Not in the registry; trades touching it are refused.
    Unknown,
}

/// A hook program and its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookEntry {
    /// Hook program id.
    pub program: Address,
    /// Current classification.
    pub status: HookStatus,
}

impl HookEntry {
    /// Returns `true` if the program may be traded through.
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        matches!(self.status, HookStatus::Whitelisted)
    }
}

/// Set of whitelisted hook programs.
///
/// Reads are O(1) and take a shared lock. Writes only happen through the
/// administrative [`register`](Self::register) and [`remove`](Self::remove)
/// calls. The registry is shared behind an `Arc` by the gate and the engine
/// facade.
///
/// ```
/// use hook_amm::domain::Address;
/// use hook_amm::hooks::HookRegistry;
///
/// let hook = Address::from_bytes([5u8; 32]);
/// let registry = HookRegistry::new([hook]);
/// assert!(registry.is_safe(&hook));
/// assert!(!registry.is_safe(&Address::from_bytes([6u8; 32])));
/// ```
#[derive(Debug, Default)]
pub struct HookRegistry {
    whitelisted: RwLock<HashSet<Address>>,
}

impl HookRegistry {
    /// Creates a registry seeded with `programs`.
    #[must_use]
    pub fn new(programs: impl IntoIterator<Item = Address>) -> Self {
        Self {
            whitelisted: RwLock::new(programs.into_iter().collect()),
        }
    }

    /// Whitelists `program`. Returns `false` if it was already present.
    pub fn register(&self, program: Address) -> bool {
        let inserted = self
            .whitelisted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(program);
        if inserted {
            tracing::info!(%program, "transfer hook whitelisted");
        }
        inserted
    }

    /// Removes `program` from the whitelist. Returns `false` if it was absent.
    pub fn remove(&self, program: &Address) -> bool {
        let removed = self
            .whitelisted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(program);
        if removed {
            tracing::warn!(%program, "transfer hook removed from whitelist");
        }
        removed
    }

    /// Returns `true` if `program` is whitelisted.
    #[must_use]
    pub fn is_safe(&self, program: &Address) -> bool {
        self.whitelisted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(program)
    }

    /// Returns the classification of `program`.
    #[must_use]
    pub fn entry(&self, program: &Address) -> HookEntry {
        let status = if self.is_safe(program) {
            HookStatus::Whitelisted
        } else {
            HookStatus::Unknown
        };
        HookEntry {
            program: *program,
            status,
        }
    }

    /// Lists whitelisted programs in sorted order.
    #[must_use]
    pub fn whitelisted(&self) -> Vec<Address> {
        let mut programs: Vec<Address> = self
            .whitelisted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect();
        programs.sort_unstable();
        programs
    }
}
