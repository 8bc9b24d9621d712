//! The two tokens of a pool.

use serde::{Deserialize, Serialize};

use super::{Address, Token};
use crate::error::AmmError;

/// Which side of a pool a token sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Token A.
    A,
    /// Token B.
    B,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Two distinct tokens, kept in the order the pool was created with.
///
/// A/B order is meaningful (it fixes which reserve is which), while
/// [`key`](Self::key) gives an order-independent identity so `(X, Y)` and
/// `(Y, X)` are recognised as the same market.
///
/// ```
/// use hook_amm::domain::{Address, Decimals, Token, TokenPair};
///
/// let x = Token::new(Address::from_bytes([2u8; 32]), Decimals::new(6).expect("valid"));
/// let y = Token::new(Address::from_bytes([1u8; 32]), Decimals::new(9).expect("valid"));
/// let xy = TokenPair::new(x.clone(), y.clone()).expect("distinct");
/// let yx = TokenPair::new(y, x).expect("distinct");
/// assert_eq!(xy.key(), yx.key());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPair {
    token_a: Token,
    token_b: Token,
}

impl TokenPair {
    /// Creates a pair.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidPair`] if both tokens share a mint.
    pub fn new(token_a: Token, token_b: Token) -> crate::error::Result<Self> {
        if token_a.mint() == token_b.mint() {
            return Err(AmmError::InvalidPair);
        }
        Ok(Self { token_a, token_b })
    }

    /// Returns token A.
    #[must_use]
    pub const fn token_a(&self) -> &Token {
        &self.token_a
    }

    /// Returns token B.
    #[must_use]
    pub const fn token_b(&self) -> &Token {
        &self.token_b
    }

    /// Returns the token on `side`.
    #[must_use]
    pub const fn token(&self, side: Side) -> &Token {
        match side {
            Side::A => &self.token_a,
            Side::B => &self.token_b,
        }
    }

    /// Returns the side holding `mint`, if it belongs to the pair.
    #[must_use]
    pub fn side_of(&self, mint: &Address) -> Option<Side> {
        if self.token_a.mint() == *mint {
            Some(Side::A)
        } else if self.token_b.mint() == *mint {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Returns `true` if `mint` is one of the two tokens.
    #[must_use]
    pub fn contains(&self, mint: &Address) -> bool {
        self.side_of(mint).is_some()
    }

    /// Order-independent identity of the market: the two mints, sorted.
    #[must_use]
    pub fn key(&self) -> (Address, Address) {
        let (a, b) = (self.token_a.mint(), self.token_b.mint());
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Hook programs declared by either token, in A/B order.
    pub fn hooks(&self) -> impl Iterator<Item = Address> + '_ {
        [&self.token_a, &self.token_b]
            .into_iter()
            .filter_map(Token::transfer_hook)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Decimals;

    fn tok(byte: u8) -> Token {
        let Ok(d) = Decimals::new(6) else {
            panic!("valid decimals");
        };
        Token::new(Address::from_bytes([byte; 32]), d)
    }

    #[test]
    fn keeps_creation_order() {
        let Ok(pair) = TokenPair::new(tok(2), tok(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.token_a().mint(), Address::from_bytes([2u8; 32]));
        assert_eq!(pair.token(Side::B).mint(), Address::from_bytes([1u8; 32]));
    }

    #[test]
    fn same_mint_is_invalid_pair() {
        assert_eq!(TokenPair::new(tok(1), tok(1)), Err(AmmError::InvalidPair));
    }

    #[test]
    fn side_lookup() {
        let Ok(pair) = TokenPair::new(tok(1), tok(2)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.side_of(&Address::from_bytes([1u8; 32])), Some(Side::A));
        assert_eq!(pair.side_of(&Address::from_bytes([2u8; 32])), Some(Side::B));
        assert_eq!(pair.side_of(&Address::from_bytes([3u8; 32])), None);
        assert_eq!(Side::A.other(), Side::B);
    }

    #[test]
    fn key_is_order_independent() {
        let (Ok(ab), Ok(ba)) = (TokenPair::new(tok(1), tok(2)), TokenPair::new(tok(2), tok(1)))
        else {
            panic!("expected Ok");
        };
        assert_ne!(ab, ba);
        assert_eq!(ab.key(), ba.key());
    }

    #[test]
    fn hooks_lists_declared_programs() {
        let hook = Address::from_bytes([9u8; 32]);
        let Ok(pair) = TokenPair::new(tok(1).with_transfer_hook(hook), tok(2)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.hooks().collect::<Vec<_>>(), vec![hook]);
    }
}
