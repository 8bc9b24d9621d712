//! Transaction messages, signatures and ledger responses.

use serde::{Deserialize, Serialize};

use super::{ChainError, Instruction};
use crate::domain::{Address, Signature, TxId};

/// A proposed transaction: a fee payer and an ordered instruction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Account paying fees; also the required signer.
    pub fee_payer: Address,
    /// Instructions, applied in order and atomically.
    pub instructions: Vec<Instruction>,
}

impl UnsignedTransaction {
    /// Creates a transaction.
    #[must_use]
    pub const fn new(fee_payer: Address, instructions: Vec<Instruction>) -> Self {
        Self {
            fee_payer,
            instructions,
        }
    }

    /// Canonical bytes that get signed: the `bincode` encoding of the message.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Encoding`] if serialization fails.
    pub fn message_bytes(&self) -> Result<Vec<u8>, ChainError> {
        bincode::serialize(self).map_err(|e| ChainError::Encoding(e.to_string()))
    }

    /// Mints moved by any transfer in this transaction, deduplicated and in
    /// first-seen order.
    #[must_use]
    pub fn transferred_mints(&self) -> Vec<Address> {
        let mut mints = Vec::new();
        for mint in self.instructions.iter().filter_map(Instruction::transferred_mint) {
            if !mints.contains(&mint) {
                mints.push(mint);
            }
        }
        mints
    }
}

/// A transaction with the fee payer's signature attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The signed message.
    pub message: UnsignedTransaction,
    /// Signature over [`UnsignedTransaction::message_bytes`].
    pub signature: Signature,
}

impl SignedTransaction {
    /// The transaction id, derived from the signature.
    #[must_use]
    pub const fn tx_id(&self) -> TxId {
        TxId::from_signature(self.signature)
    }
}

/// Proof that a transaction was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    /// Committed transaction.
    pub tx_id: TxId,
    /// Ledger slot it landed in.
    pub slot: u64,
}

/// Why a dry run would fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// A transfer hook refused the transfer.
    HookRejected {
        /// Hook program that refused.
        program: Address,
        /// Reason it gave.
        reason: String,
    },
    /// Any other program error.
    Failed(String),
}

/// Result of a non-committing dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutcome {
    /// `true` if the transaction would commit.
    pub will_succeed: bool,
    /// Failure detail when `will_succeed` is `false`.
    pub error: Option<SimulationError>,
}

impl SimulationOutcome {
    /// A clean simulation.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            will_succeed: true,
            error: None,
        }
    }

    /// A failed simulation.
    #[must_use]
    pub const fn failure(error: SimulationError) -> Self {
        Self {
            will_succeed: false,
            error: Some(error),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Amount;

    fn transfer(mint: u8) -> Instruction {
        Instruction::Transfer {
            mint: Address::from_bytes([mint; 32]),
            from: Address::from_bytes([1u8; 32]),
            to: Address::from_bytes([2u8; 32]),
            amount: Amount::new(5),
        }
    }

    #[test]
    fn message_bytes_are_deterministic() {
        let tx = UnsignedTransaction::new(Address::from_bytes([1u8; 32]), vec![transfer(3)]);
        let (Ok(a), Ok(b)) = (tx.message_bytes(), tx.clone().message_bytes()) else {
            panic!("encodable");
        };
        assert_eq!(a, b);
        let other = UnsignedTransaction::new(Address::from_bytes([1u8; 32]), vec![transfer(4)]);
        let Ok(c) = other.message_bytes() else {
            panic!("encodable");
        };
        assert_ne!(a, c);
    }

    #[test]
    fn transferred_mints_deduplicates() {
        let tx = UnsignedTransaction::new(
            Address::from_bytes([1u8; 32]),
            vec![transfer(3), transfer(4), transfer(3)],
        );
        assert_eq!(
            tx.transferred_mints(),
            vec![Address::from_bytes([3u8; 32]), Address::from_bytes([4u8; 32])]
        );
    }

    #[test]
    fn simulation_constructors() {
        assert!(SimulationOutcome::success().will_succeed);
        let failed = SimulationOutcome::failure(SimulationError::Failed("boom".to_string()));
        assert!(!failed.will_succeed);
        assert!(failed.error.is_some());
    }
}
