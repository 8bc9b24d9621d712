use async_trait::async_trait;
use sha2::{Digest, Sha256, Sha512};

use crate::chain::{ChainError, SignedTransaction, Signer, UnsignedTransaction};
use crate::domain::{Address, Signature, SIGNATURE_LEN};

/// A deterministic signer derived from a seed.
///
/// The identity is `sha256("identity" || seed)` and signatures are
/// `sha512(secret || message)`. Not cryptographically meaningful, but
/// stable, so transaction ids are reproducible across runs.
#[derive(Clone)]
pub struct KeypairSigner {
    secret: [u8; 32],
    identity: Address,
}

impl core::fmt::Debug for KeypairSigner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeypairSigner")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl KeypairSigner {
    /// Derives a signer from `seed`.
    #[must_use]
    pub fn from_seed(seed: &[u8]) -> Self {
        let secret: [u8; 32] = Sha256::digest(seed).into();
        let identity = Address::derive("identity", &[seed]);
        Self { secret, identity }
    }
}

#[async_trait]
impl Signer for KeypairSigner {
    fn identity(&self) -> Address {
        self.identity
    }

    async fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, ChainError> {
        if tx.fee_payer != self.identity {
            return Err(ChainError::Rejected(
                "fee payer does not match signer identity".to_string(),
            ));
        }
        let mut hasher = Sha512::new();
        hasher.update(self.secret);
        hasher.update(tx.message_bytes()?);
        let digest = hasher.finalize();
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes.copy_from_slice(&digest);
        Ok(SignedTransaction {
            message: tx.clone(),
            signature: Signature::from_bytes(bytes),
        })
    }
}
