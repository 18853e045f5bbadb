//! Application configuration.
//!
//! Centralizes all configuration constants used throughout the application.
//! Deployment settings are loaded from `assets/config.toml`, embedded at
//! compile time with `include_str!` and parsed once at startup.

use std::str::FromStr;

use alloy_primitives::Address;
use serde::Deserialize;

use crate::core::error::ConfigError;

// =============================================================================
// Text Assets (loaded at compile time)
// =============================================================================

/// Deployment configuration (contract address, chain, log level).
pub const CONFIG_TOML: &str = include_str!("../assets/config.toml");

/// Compile-time override for the contract address.
pub const CONTRACT_ADDRESS_OVERRIDE: Option<&str> = option_env!("PAUSE_CONTRACT_ADDRESS");

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name displayed in the header.
pub const APP_NAME: &str = "pause-console";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Network Configuration
// =============================================================================

/// The only chain this client operates on (Polygon PoS).
pub const REQUIRED_CHAIN_ID: u64 = 137;

/// Timeout for non-interactive wallet requests in milliseconds.
pub const RPC_TIMEOUT_MS: i32 = 10_000;

/// Interval between transaction receipt polls in milliseconds.
pub const RECEIPT_POLL_INTERVAL_MS: u32 = 2_000;

/// Give up waiting for a receipt after this many milliseconds.
pub const CONFIRMATION_TIMEOUT_MS: u32 = 180_000;

// =============================================================================
// UI Configuration
// =============================================================================

/// Maximum number of activity log lines to keep.
pub const MAX_ACTIVITY_LOG: usize = 50;

/// Ethereum address display constants.
pub mod eth_address {
    /// Length of a full `0x`-prefixed address.
    pub const FULL_LEN: usize = 42;
    /// Characters kept at the start (`0x1234`).
    pub const PREFIX_LEN: usize = 6;
    /// Start index of the kept suffix (last 4 hex digits).
    pub const SUFFIX_START: usize = 38;
}

// =============================================================================
// Deployment Configuration
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawConfig {
    contract: RawContract,
    #[serde(default)]
    log: RawLog,
}

#[derive(Debug, Deserialize)]
struct RawContract {
    #[serde(default)]
    address: Option<String>,
    chain_id: u64,
}

#[derive(Debug, Default, Deserialize)]
struct RawLog {
    #[serde(default)]
    level: Option<String>,
}

/// Target contract and the chain it lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractConfig {
    pub address: Address,
    pub chain_id: u64,
}

/// Validated startup configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub contract: ContractConfig,
    pub log_level: log::Level,
}

impl AppConfig {
    /// Load the embedded configuration, applying the address override.
    pub fn load() -> Result<Self, ConfigError> {
        Self::parse(CONFIG_TOML, CONTRACT_ADDRESS_OVERRIDE)
    }

    /// Parse and validate configuration text.
    ///
    /// A non-empty `address_override` replaces the file's address.
    pub fn parse(text: &str, address_override: Option<&str>) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let address = address_override
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .or(raw.contract.address)
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingAddress)?;
        let address = Address::from_str(address.trim())
            .map_err(|_| ConfigError::InvalidAddress(address.clone()))?;

        if raw.contract.chain_id != REQUIRED_CHAIN_ID {
            return Err(ConfigError::UnsupportedChain {
                expected: REQUIRED_CHAIN_ID,
                actual: raw.contract.chain_id,
            });
        }

        let log_level = match raw.log.level {
            Some(level) => log::Level::from_str(&level)
                .map_err(|_| ConfigError::Parse(format!("unknown log level {level:?}")))?,
            None => log::Level::Info,
        };

        Ok(Self {
            contract: ContractConfig {
                address,
                chain_id: raw.contract.chain_id,
            },
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn config_text(address: &str, chain_id: u64) -> String {
        format!("[contract]\naddress = \"{address}\"\nchain_id = {chain_id}\n")
    }

    #[test]
    fn test_parse_valid_config() {
        let config = AppConfig::parse(&config_text(ADDRESS, 137), None).unwrap();
        assert_eq!(config.contract.address, Address::from_str(ADDRESS).unwrap());
        assert_eq!(config.contract.chain_id, 137);
        assert_eq!(config.log_level, log::Level::Info);
    }

    #[test]
    fn test_override_replaces_file_address() {
        let other = "0x0000000000000000000000000000000000000001";
        let config = AppConfig::parse(&config_text(ADDRESS, 137), Some(other)).unwrap();
        assert_eq!(config.contract.address, Address::from_str(other).unwrap());
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let config = AppConfig::parse(&config_text(ADDRESS, 137), Some("  ")).unwrap();
        assert_eq!(config.contract.address, Address::from_str(ADDRESS).unwrap());
    }

    #[test]
    fn test_missing_address_fails() {
        let err = AppConfig::parse("[contract]\nchain_id = 137\n", None).unwrap_err();
        assert_eq!(err, ConfigError::MissingAddress);

        let err = AppConfig::parse(&config_text("", 137), None).unwrap_err();
        assert_eq!(err, ConfigError::MissingAddress);
    }

    #[test]
    fn test_invalid_address_fails() {
        let err = AppConfig::parse(&config_text("0x1234", 137), None).unwrap_err();
        assert_eq!(err, ConfigError::InvalidAddress("0x1234".to_string()));
    }

    #[test]
    fn test_other_chain_is_rejected_at_startup() {
        let err = AppConfig::parse(&config_text(ADDRESS, 1), None).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedChain {
                expected: 137,
                actual: 1
            }
        );
    }

    #[test]
    fn test_log_level() {
        let text = format!("{}\n[log]\nlevel = \"debug\"\n", config_text(ADDRESS, 137));
        let config = AppConfig::parse(&text, None).unwrap();
        assert_eq!(config.log_level, log::Level::Debug);

        let text = format!("{}\n[log]\nlevel = \"loud\"\n", config_text(ADDRESS, 137));
        assert!(matches!(
            AppConfig::parse(&text, None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            AppConfig::parse("contract = ", None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_embedded_config_parses_as_toml() {
        // The shipped file may leave the address empty; only the shape is checked.
        let raw: Result<RawConfig, _> = toml::from_str(CONFIG_TOML);
        assert!(raw.is_ok());
    }
}
