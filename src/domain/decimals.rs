//! Token decimal places.

use serde::{Deserialize, Serialize};

use crate::error::AmmError;

const MAX_DECIMALS: u8 = 18;

/// Number of decimal places of a mint, validated to `0..=18`.
///
/// ```
/// use hook_amm::domain::Decimals;
///
/// let d = Decimals::new(6).expect("6 is valid");
/// assert_eq!(d.get(), 6);
/// assert!(Decimals::new(19).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Decimals(u8);

impl Decimals {
    /// Zero decimal places.
    pub const ZERO: Self = Self(0);

    /// Decimals used for LP mints unless configured otherwise.
    pub const LP_DEFAULT: Self = Self(9);

    /// Creates a new `Decimals` after validating the range.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidInput`] if `value` exceeds 18.
    pub const fn new(value: u8) -> crate::error::Result<Self> {
        if value > MAX_DECIMALS {
            return Err(AmmError::InvalidInput("decimals must be 0..=18"));
        }
        Ok(Self(value))
    }

    /// Returns the raw decimal count.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Returns `10^decimals`.
    #[must_use]
    pub const fn factor(&self) -> u64 {
        10u64.pow(self.0 as u32)
    }

    /// Renders `raw` base units as a decimal string, e.g. `1500000` with six
    /// decimals becomes `"1.500000"`.
    #[must_use]
    pub fn format(&self, raw: u64) -> String {
        if self.0 == 0 {
            return raw.to_string();
        }
        let factor = self.factor();
        format!(
            "{}.{:0width$}",
            raw / factor,
            raw % factor,
            width = usize::from(self.0)
        )
    }
}

impl TryFrom<u8> for Decimals {
    type Error = AmmError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Decimals> for u8 {
    fn from(value: Decimals) -> Self {
        value.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn valid_range() {
        for v in [0u8, 6, 9, 18] {
            let Ok(d) = Decimals::new(v) else {
                panic!("expected Ok for {v}");
            };
            assert_eq!(d.get(), v);
        }
    }

    #[test]
    fn invalid_nineteen() {
        let Err(e) = Decimals::new(19) else {
            panic!("expected Err");
        };
        assert_eq!(e, AmmError::InvalidInput("decimals must be 0..=18"));
    }

    #[test]
    fn factor_fits_u64_at_max() {
        let Ok(d) = Decimals::new(18) else {
            panic!("expected Ok");
        };
        assert_eq!(d.factor(), 1_000_000_000_000_000_000);
    }

    #[test]
    fn format_pads_fraction() {
        let Ok(d) = Decimals::new(6) else {
            panic!("expected Ok");
        };
        assert_eq!(d.format(1_500_000), "1.500000");
        assert_eq!(d.format(42), "0.000042");
        assert_eq!(Decimals::ZERO.format(42), "42");
    }

    #[test]
    fn lp_default() {
        assert_eq!(Decimals::LP_DEFAULT.get(), 9);
        assert_eq!(Decimals::default(), Decimals::ZERO);
    }
}
