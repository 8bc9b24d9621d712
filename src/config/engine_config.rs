//! Engine-wide settings, loadable from TOML.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chain::{CallTimeouts, RetryPolicy};
use crate::domain::{Address, BasisPoints, Decimals, BPS_DENOMINATOR};
use crate::error::AmmError;
use crate::pricing::{PricingEngine, DEFAULT_RATIO_TOLERANCE};

/// Backoff settings for idempotent ledger reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds. Doubles per retry.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 50,
        }
    }
}

/// Declarative configuration for an [`AmmEngine`](crate::engine::AmmEngine).
///
/// Every field has a default, so a TOML document only needs to name what it
/// overrides:
///
/// ```toml
/// whitelisted_hooks = ["<base58 program id>"]
/// submit_timeout_ms = 10000
///
/// [retry]
/// max_attempts = 5
/// ```
///
/// Addresses are base58 text so the file stays human-editable.
/// [`validate`](Self::validate) parses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base58 address of the AMM program. Pool ids derive from it.
    pub program_id: String,
    /// Base58 hook programs that seed the registry.
    pub whitelisted_hooks: Vec<String>,
    /// Allowed deviation of a deposit from the reserve ratio.
    pub ratio_tolerance_bps: u32,
    /// Decimal precision of newly created LP mints.
    pub lp_decimals: u8,
    /// Simulation deadline in milliseconds.
    pub simulate_timeout_ms: u64,
    /// Submit-and-confirm deadline in milliseconds.
    pub submit_timeout_ms: u64,
    /// Read retry policy.
    pub retry: RetryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program_id: Address::derive("program", &[b"hook-amm".as_slice()]).to_string(),
            whitelisted_hooks: Vec::new(),
            ratio_tolerance_bps: DEFAULT_RATIO_TOLERANCE.get(),
            lp_decimals: Decimals::LP_DEFAULT.get(),
            simulate_timeout_ms: 5_000,
            submit_timeout_ms: 30_000,
            retry: RetryConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfig`] if the document does not parse
    /// or fails [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> crate::error::Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| AmmError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> crate::error::Result<String> {
        toml::to_string(self).map_err(|e| AmmError::InvalidConfig(e.to_string()))
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfig`] describing the first bad field.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.ratio_tolerance_bps > BPS_DENOMINATOR {
            return Err(AmmError::InvalidConfig(format!(
                "ratio_tolerance_bps {} exceeds {BPS_DENOMINATOR}",
                self.ratio_tolerance_bps
            )));
        }
        if self.simulate_timeout_ms == 0 || self.submit_timeout_ms == 0 {
            return Err(AmmError::InvalidConfig(
                "timeouts must be positive".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(AmmError::InvalidConfig(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        self.lp_mint_decimals()?;
        self.program_address()?;
        self.hook_addresses()?;
        Ok(())
    }

    /// Parsed [`program_id`](Self::program_id).
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfig`] if it is not a base58 address.
    pub fn program_address(&self) -> crate::error::Result<Address> {
        parse_address("program_id", &self.program_id)
    }

    /// Parsed [`whitelisted_hooks`](Self::whitelisted_hooks).
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfig`] for the first malformed entry.
    pub fn hook_addresses(&self) -> crate::error::Result<Vec<Address>> {
        self.whitelisted_hooks
            .iter()
            .map(|text| parse_address("whitelisted_hooks", text))
            .collect()
    }

    /// Parsed [`lp_decimals`](Self::lp_decimals).
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfig`] above 18.
    pub fn lp_mint_decimals(&self) -> crate::error::Result<Decimals> {
        Decimals::new(self.lp_decimals)
            .map_err(|e| AmmError::InvalidConfig(format!("lp_decimals: {e}")))
    }

    /// Default deadlines for simulate and submit.
    #[must_use]
    pub const fn timeouts(&self) -> CallTimeouts {
        CallTimeouts {
            simulate: Duration::from_millis(self.simulate_timeout_ms),
            submit: Duration::from_millis(self.submit_timeout_ms),
        }
    }

    /// Read retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
        }
    }

    /// Pricing engine with the configured ratio tolerance.
    #[must_use]
    pub const fn pricing_engine(&self) -> PricingEngine {
        PricingEngine::new(BasisPoints::new(self.ratio_tolerance_bps))
    }
}

fn parse_address(field: &str, text: &str) -> crate::error::Result<Address> {
    text.parse()
        .map_err(|e| AmmError::InvalidConfig(format!("{field}: {e}")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ratio_tolerance_bps, 10);
        assert_eq!(config.lp_decimals, 9);
        assert_eq!(config.timeouts(), CallTimeouts::default());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let hook = Address::from_bytes([42u8; 32]);
        let text = format!(
            "whitelisted_hooks = [\"{hook}\"]\nsubmit_timeout_ms = 1000\n\n[retry]\nmax_attempts = 5\n"
        );
        let Ok(config) = EngineConfig::from_toml_str(&text) else {
            panic!("document parses");
        };
        assert_eq!(config.submit_timeout_ms, 1_000);
        assert_eq!(config.simulate_timeout_ms, 5_000);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 50);
        assert_eq!(config.hook_addresses(), Ok(vec![hook]));
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = EngineConfig::default();
        config.whitelisted_hooks = vec![Address::from_bytes([5u8; 32]).to_string()];
        config.ratio_tolerance_bps = 25;
        let Ok(text) = config.to_toml_string() else {
            panic!("serializes");
        };
        assert_eq!(EngineConfig::from_toml_str(&text), Ok(config));
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            EngineConfig {
                ratio_tolerance_bps: 10_001,
                ..EngineConfig::default()
            },
            EngineConfig {
                submit_timeout_ms: 0,
                ..EngineConfig::default()
            },
            EngineConfig {
                retry: RetryConfig {
                    max_attempts: 0,
                    base_delay_ms: 10,
                },
                ..EngineConfig::default()
            },
            EngineConfig {
                lp_decimals: 19,
                ..EngineConfig::default()
            },
            EngineConfig {
                whitelisted_hooks: vec!["not-an-address!".to_string()],
                ..EngineConfig::default()
            },
            EngineConfig {
                program_id: "1".to_string(),
                ..EngineConfig::default()
            },
        ];
        for config in cases {
            let Err(AmmError::InvalidConfig(_)) = config.validate() else {
                panic!("expected InvalidConfig for {config:?}");
            };
        }
    }

    #[test]
    fn malformed_toml_is_invalid_config() {
        let Err(AmmError::InvalidConfig(_)) = EngineConfig::from_toml_str("lp_decimals = \"nine\"")
        else {
            panic!("type mismatch is rejected");
        };
    }
}
