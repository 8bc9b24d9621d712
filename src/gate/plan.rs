use crate::chain::UnsignedTransaction;
use crate::domain::{Address, PoolId, Token};
use crate::error::AmmError;

/// What the gate is asked to approve: a transaction, the tokens it moves,
/// and the pool snapshot it was priced against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pool_id: PoolId,
    reserve_version: u64,
    tokens: Vec<Token>,
    transaction: UnsignedTransaction,
}

impl TransferPlan {
    /// Creates a plan.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidInput`] if the transaction moves a mint
    /// that `tokens` does not describe, since its hook could not be checked.
    pub fn new(
        pool_id: PoolId,
        reserve_version: u64,
        tokens: Vec<Token>,
        transaction: UnsignedTransaction,
    ) -> crate::error::Result<Self> {
        let undeclared = transaction
            .transferred_mints()
            .into_iter()
            .any(|mint| !tokens.iter().any(|t| t.mint() == mint));
        if undeclared {
            return Err(AmmError::InvalidInput(
                "transaction moves a token the plan does not declare",
            ));
        }
        Ok(Self {
            pool_id,
            reserve_version,
            tokens,
            transaction,
        })
    }

    /// Pool being traded against.
    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// Reserve version the plan was priced against.
    #[must_use]
    pub const fn reserve_version(&self) -> u64 {
        self.reserve_version
    }

    /// The transaction to simulate and submit.
    #[must_use]
    pub const fn transaction(&self) -> &UnsignedTransaction {
        &self.transaction
    }

    /// Hook programs declared by the moved tokens, deduplicated.
    #[must_use]
    pub fn hook_programs(&self) -> Vec<Address> {
        let mut programs: Vec<Address> = Vec::new();
        for program in self.tokens.iter().filter_map(Token::transfer_hook) {
            if !programs.contains(&program) {
                programs.push(program);
            }
        }
        programs
    }

    pub(crate) fn into_parts(self) -> (PoolId, u64, UnsignedTransaction) {
        (self.pool_id, self.reserve_version, self.transaction)
    }
}
