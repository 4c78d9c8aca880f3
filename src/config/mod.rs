//! Gateway configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is loaded
//! with the `COINBRIDGE` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use coinbridge::config::AdapterConfig;
//!
//! let config = AdapterConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Default driver: {}", config.default_driver);
//! ```

mod currencies;
mod drivers;
mod error;

pub use currencies::CurrencyDefinition;
pub use drivers::{CoinPaymentsSettings, CpgSettings, DriversConfig, Environment};
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

use crate::domain::currency::CurrencyCatalog;

/// Root gateway configuration
///
/// Contains the driver registry defaults, per-provider credentials, and the
/// currency catalog overrides. Load using [`AdapterConfig::load()`] which
/// reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AdapterConfig {
    /// Driver used when the caller does not name one
    #[serde(default = "default_driver")]
    pub default_driver: String,

    /// Per-driver credentials and endpoints
    #[serde(default)]
    pub drivers: DriversConfig,

    /// Currency overrides merged over the built-in catalog
    #[serde(default)]
    pub currencies: Vec<CurrencyDefinition>,

    /// Catalog key of the currency offered by default
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Expiry window in minutes applied when a provider omits a deadline
    #[serde(default = "default_payment_window")]
    pub payment_window_minutes: u64,

    /// Externally reachable base URL, used to rebuild the exact webhook URL
    /// a provider signed when the service sits behind a proxy
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl AdapterConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `COINBRIDGE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `COINBRIDGE__DEFAULT_DRIVER=coinpayments` -> `default_driver`
    /// - `COINBRIDGE__DRIVERS__CPG__API_KEY=...` -> `drivers.cpg.api_key`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COINBRIDGE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Driver credentials are deliberately not checked here: the manager
    /// validates a driver's settings when that driver is first resolved, so
    /// deployments configure only the providers they use.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_driver.is_empty() {
            return Err(ValidationError::MissingRequired("DEFAULT_DRIVER"));
        }
        if self.payment_window_minutes == 0 {
            return Err(ValidationError::InvalidPaymentWindow);
        }
        if !self.public_base_url.starts_with("http://")
            && !self.public_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidPublicBaseUrl);
        }
        for definition in &self.currencies {
            definition.to_currency()?;
        }
        if self.default_currency.is_empty() {
            return Err(ValidationError::MissingRequired("DEFAULT_CURRENCY"));
        }
        if self.catalog().get(&self.default_currency).is_none() {
            return Err(ValidationError::UnknownDefaultCurrency {
                key: self.default_currency.clone(),
            });
        }
        Ok(())
    }

    /// The currency catalog with configured overrides applied
    pub fn catalog(&self) -> CurrencyCatalog {
        let overrides = self
            .currencies
            .iter()
            .filter_map(|definition| definition.to_currency().ok())
            .collect();
        CurrencyCatalog::builtin().merged_with(overrides)
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            default_driver: default_driver(),
            drivers: DriversConfig::default(),
            currencies: Vec::new(),
            default_currency: default_currency(),
            payment_window_minutes: default_payment_window(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_driver() -> String {
    "cpg".to_string()
}

fn default_currency() -> String {
    "1".to_string()
}

fn default_payment_window() -> u64 {
    60
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set environment variables for testing
    /// Uses double underscores to separate nested config values
    fn set_test_env() {
        env::set_var("COINBRIDGE__DEFAULT_DRIVER", "coinpayments");
        env::set_var("COINBRIDGE__DRIVERS__COINPAYMENTS__CLIENT_ID", "client-123");
        env::set_var(
            "COINBRIDGE__DRIVERS__COINPAYMENTS__CLIENT_SECRET",
            "secret-456",
        );
        env::set_var("COINBRIDGE__DRIVERS__CPG__API_URL", "https://cpg.example.com");
        env::set_var("COINBRIDGE__DRIVERS__CPG__API_KEY", "cpg-key");
        env::set_var("COINBRIDGE__PUBLIC_BASE_URL", "https://pay.example.com");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var("COINBRIDGE__DEFAULT_DRIVER");
        env::remove_var("COINBRIDGE__DRIVERS__COINPAYMENTS__CLIENT_ID");
        env::remove_var("COINBRIDGE__DRIVERS__COINPAYMENTS__CLIENT_SECRET");
        env::remove_var("COINBRIDGE__DRIVERS__COINPAYMENTS__ENVIRONMENT");
        env::remove_var("COINBRIDGE__DRIVERS__CPG__API_URL");
        env::remove_var("COINBRIDGE__DRIVERS__CPG__API_KEY");
        env::remove_var("COINBRIDGE__PUBLIC_BASE_URL");
        env::remove_var("COINBRIDGE__PAYMENT_WINDOW_MINUTES");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_test_env();
        let result = AdapterConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.default_driver, "coinpayments");
        assert_eq!(config.drivers.coinpayments.client_id, "client-123");
        assert_eq!(config.drivers.cpg.api_url, "https://cpg.example.com");
        assert_eq!(config.public_base_url, "https://pay.example.com");
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AdapterConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.default_driver, "cpg");
        assert_eq!(config.default_currency, "1");
        assert_eq!(config.payment_window_minutes, 60);
        assert!(config.drivers.coinpayments.client_id.is_empty());
    }

    #[test]
    fn test_production_environment_parses() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_test_env();
        env::set_var("COINBRIDGE__DRIVERS__COINPAYMENTS__ENVIRONMENT", "production");
        let result = AdapterConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.drivers.coinpayments.environment.is_production());
    }

    #[test]
    fn test_custom_payment_window() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_test_env();
        env::set_var("COINBRIDGE__PAYMENT_WINDOW_MINUTES", "90");
        let result = AdapterConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.payment_window_minutes, 90);
    }

    #[test]
    fn test_validate_default_config() {
        let config = AdapterConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_payment_window() {
        let config = AdapterConfig {
            payment_window_minutes: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPaymentWindow)
        ));
    }

    #[test]
    fn test_validate_rejects_bare_public_base_url() {
        let config = AdapterConfig {
            public_base_url: "pay.example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPublicBaseUrl)
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_default_currency() {
        let config = AdapterConfig {
            default_currency: "99".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::UnknownDefaultCurrency { key }) if key == "99"
        ));
    }

    #[test]
    fn test_catalog_applies_overrides() {
        let config = AdapterConfig {
            currencies: vec![CurrencyDefinition {
                key: "7".to_string(),
                name: "Monero".to_string(),
                symbol: "XMR".to_string(),
                network: "monero".to_string(),
                decimal_places: 12,
            }],
            ..Default::default()
        };

        let catalog = config.catalog();
        assert!(catalog.get("1").is_some());
        assert_eq!(catalog.get("7").unwrap().symbol, "XMR");
    }

    #[test]
    fn test_validate_accepts_overridden_default_currency() {
        let config = AdapterConfig {
            default_currency: "7".to_string(),
            currencies: vec![CurrencyDefinition {
                key: "7".to_string(),
                name: "Monero".to_string(),
                symbol: "XMR".to_string(),
                network: "monero".to_string(),
                decimal_places: 12,
            }],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
