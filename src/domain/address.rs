//! 32-byte ledger identities, derived addresses and transaction ids.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AmmError;

/// Length of an [`Address`] in bytes.
pub const ADDRESS_LEN: usize = 32;

/// Length of a [`Signature`] in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// An opaque 32-byte identity: a mint, pool, owner, vault or program.
///
/// Rendered and parsed as base58 text.
///
/// # Examples
///
/// ```
/// use hook_amm::domain::Address;
///
/// let addr = Address::from_bytes([1u8; 32]);
/// let text = addr.to_string();
/// assert_eq!(text.parse::<Address>(), Ok(addr));
/// ```
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Creates an address from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Returns `true` for the all-zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Derives a deterministic address as `sha256(tag || seed_0 || seed_1 ...)`.
    ///
    /// Each seed is length-prefixed so `["ab", "c"]` and `["a", "bc"]`
    /// never collide.
    #[must_use]
    pub fn derive(tag: &str, seeds: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tag.as_bytes());
        for seed in seeds {
            hasher.update((seed.len() as u64).to_le_bytes());
            hasher.update(seed);
        }
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| AmmError::InvalidInput("address is not valid base58"))?;
        let bytes: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AmmError::InvalidInput("address must decode to 32 bytes"))?;
        Ok(Self(bytes))
    }
}

/// Identity of a pool: the address derived from the program id and the
/// canonical (sorted) mint pair.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PoolId(Address);

impl PoolId {
    /// Wraps an existing address as a pool id.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// Derives the pool id for a mint pair. Argument order does not matter.
    #[must_use]
    pub fn derive(program: &Address, mint_a: &Address, mint_b: &Address) -> Self {
        let (lo, hi) = if mint_a <= mint_b {
            (mint_a, mint_b)
        } else {
            (mint_b, mint_a)
        };
        Self(Address::derive(
            "pool",
            &[program.as_bytes(), lo.as_bytes(), hi.as_bytes()],
        ))
    }

    /// Returns the pool account address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.0
    }

    /// Vault holding this pool's reserve of `mint`.
    #[must_use]
    pub fn vault(&self, mint: &Address) -> Address {
        Address::derive("vault", &[self.0.as_bytes(), mint.as_bytes()])
    }

    /// Mint of this pool's LP token.
    #[must_use]
    pub fn lp_mint(&self) -> Address {
        Address::derive("lp_mint", &[self.0.as_bytes()])
    }

    /// Account recording `owner`'s LP position in this pool.
    #[must_use]
    pub fn position_account(&self, owner: &Address) -> Address {
        Address::derive("position", &[self.0.as_bytes(), owner.as_bytes()])
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId({})", self.0)
    }
}

/// A 64-byte transaction signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    /// Wraps raw signature bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", bs58::encode(self.0).into_string())
    }
}

/// Submission identifier: the transaction's first signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(Signature);

impl TxId {
    /// Builds the id from the fee payer's signature.
    #[must_use]
    pub const fn from_signature(signature: Signature) -> Self {
        Self(signature)
    }

    /// Returns the underlying signature.
    #[must_use]
    pub const fn signature(&self) -> &Signature {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0.as_bytes()).into_string())
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({self})")
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn base58_round_trip() {
        let addr = Address::from_bytes([9u8; 32]);
        let Ok(parsed) = addr.to_string().parse::<Address>() else {
            panic!("expected Ok");
        };
        assert_eq!(parsed, addr);
    }

    #[test]
    fn zero_address_renders_as_ones() {
        assert_eq!(Address::ZERO.to_string(), "11111111111111111111111111111111");
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn rejects_bad_text() {
        let Err(e) = "0OIl".parse::<Address>() else {
            panic!("expected Err");
        };
        assert_eq!(e, AmmError::InvalidInput("address is not valid base58"));
        let Err(e) = "abc".parse::<Address>() else {
            panic!("expected Err");
        };
        assert_eq!(e, AmmError::InvalidInput("address must decode to 32 bytes"));
    }

    #[test]
    fn derive_is_deterministic_and_tagged() {
        let a = Address::derive("vault", &[b"x"]);
        assert_eq!(a, Address::derive("vault", &[b"x"]));
        assert_ne!(a, Address::derive("lp_mint", &[b"x"]));
    }

    #[test]
    fn derive_seeds_are_length_prefixed() {
        assert_ne!(
            Address::derive("t", &[b"ab", b"c"]),
            Address::derive("t", &[b"a", b"bc"])
        );
    }

    #[test]
    fn pool_id_ignores_pair_order() {
        let program = Address::from_bytes([1u8; 32]);
        let a = Address::from_bytes([2u8; 32]);
        let b = Address::from_bytes([3u8; 32]);
        assert_eq!(PoolId::derive(&program, &a, &b), PoolId::derive(&program, &b, &a));
    }

    #[test]
    fn pool_sub_addresses_are_distinct() {
        let pool = PoolId::new(Address::from_bytes([4u8; 32]));
        let mint = Address::from_bytes([5u8; 32]);
        let owner = Address::from_bytes([6u8; 32]);
        assert_ne!(pool.vault(&mint), pool.lp_mint());
        assert_ne!(pool.position_account(&owner), pool.vault(&owner));
    }

    #[test]
    fn tx_id_renders_base58() {
        let tx = TxId::from_signature(Signature::from_bytes([0u8; 64]));
        assert_eq!(tx.to_string(), "1".repeat(64));
    }
}
