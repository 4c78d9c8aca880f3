//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid API URL format")]
    InvalidApiUrl,

    #[error("Payment window must be at least one minute")]
    InvalidPaymentWindow,

    #[error("Public base URL must start with http:// or https://")]
    InvalidPublicBaseUrl,

    #[error("Invalid currency override: {key}")]
    InvalidCurrencyOverride { key: String },

    #[error("Default currency '{key}' is not in the catalog")]
    UnknownDefaultCurrency { key: String },
}
