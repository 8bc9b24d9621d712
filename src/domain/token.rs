//! Token identity and metadata.

use serde::{Deserialize, Serialize};

use super::{Address, Decimals};

/// A mint together with the metadata the engine needs to trade it.
///
/// A token whose mint declares a transfer hook carries the hook program in
/// [`transfer_hook`](Self::transfer_hook); every transfer of that token runs
/// third-party logic that may reject it.
///
/// ```
/// use hook_amm::domain::{Address, Decimals, Token};
///
/// let hook = Address::from_bytes([9u8; 32]);
/// let tok = Token::new(Address::from_bytes([1u8; 32]), Decimals::new(6).expect("valid"))
///     .with_symbol("USDH")
///     .with_transfer_hook(hook);
/// assert_eq!(tok.symbol(), "USDH");
/// assert_eq!(tok.transfer_hook(), Some(hook));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    mint: Address,
    symbol: String,
    decimals: Decimals,
    transfer_hook: Option<Address>,
}

impl Token {
    /// Creates a token with no symbol and no transfer hook.
    #[must_use]
    pub const fn new(mint: Address, decimals: Decimals) -> Self {
        Self {
            mint,
            symbol: String::new(),
            decimals,
            transfer_hook: None,
        }
    }

    /// Sets the display symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// Declares the transfer-hook program of this mint.
    #[must_use]
    pub fn with_transfer_hook(mut self, program: Address) -> Self {
        self.transfer_hook = Some(program);
        self
    }

    /// Returns the mint address.
    #[must_use]
    pub const fn mint(&self) -> Address {
        self.mint
    }

    /// Returns the display symbol, possibly empty.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the decimal precision.
    #[must_use]
    pub const fn decimals(&self) -> Decimals {
        self.decimals
    }

    /// Returns the declared transfer-hook program, if any.
    #[must_use]
    pub const fn transfer_hook(&self) -> Option<Address> {
        self.transfer_hook
    }

    /// Formats a raw amount of this token for display.
    #[must_use]
    pub fn format_amount(&self, raw: u64) -> String {
        self.decimals.format(raw)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn sample(byte: u8, dec: u8) -> Token {
        let Ok(d) = Decimals::new(dec) else {
            panic!("invalid decimals in test: {dec}");
        };
        Token::new(Address::from_bytes([byte; 32]), d)
    }

    #[test]
    fn plain_token_has_no_hook() {
        let tok = sample(1, 6);
        assert_eq!(tok.mint(), Address::from_bytes([1u8; 32]));
        assert_eq!(tok.transfer_hook(), None);
        assert_eq!(tok.symbol(), "");
    }

    #[test]
    fn builder_sets_metadata() {
        let hook = Address::from_bytes([7u8; 32]);
        let tok = sample(1, 9).with_symbol("HK").with_transfer_hook(hook);
        assert_eq!(tok.symbol(), "HK");
        assert_eq!(tok.transfer_hook(), Some(hook));
        assert_eq!(tok.decimals().get(), 9);
    }

    #[test]
    fn equality_includes_hook() {
        let hook = Address::from_bytes([7u8; 32]);
        assert_ne!(sample(1, 6), sample(1, 6).with_transfer_hook(hook));
    }

    #[test]
    fn format_amount_uses_decimals() {
        assert_eq!(sample(1, 6).format_amount(2_500_000), "2.500000");
    }
}
