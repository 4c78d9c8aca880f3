//! Payment driver configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Provider environment
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    /// Check if this is the production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Per-driver settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriversConfig {
    /// CoinPayments merchant API settings
    #[serde(default)]
    pub coinpayments: CoinPaymentsSettings,

    /// CPG deployment settings
    #[serde(default)]
    pub cpg: CpgSettings,
}

/// CoinPayments driver settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoinPaymentsSettings {
    /// Integration client id
    #[serde(default)]
    pub client_id: String,

    /// Integration client secret (HMAC key)
    #[serde(default)]
    pub client_secret: String,

    /// Sandbox or production
    #[serde(default)]
    pub environment: Environment,

    /// Refund email forwarded on invoice creation
    pub refund_email: Option<String>,
}

impl CoinPaymentsSettings {
    /// Validate CoinPayments settings
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingRequired("COINPAYMENTS_CLIENT_ID"));
        }
        if self.client_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "COINPAYMENTS_CLIENT_SECRET",
            ));
        }
        Ok(())
    }
}

/// CPG driver settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CpgSettings {
    /// Base URL of the CPG deployment
    #[serde(default)]
    pub api_url: String,

    /// Merchant API bearer token
    #[serde(default)]
    pub api_key: String,

    /// Shared secret for webhook verification
    pub webhook_secret: Option<String>,
}

impl CpgSettings {
    /// Validate CPG settings
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_url.is_empty() {
            return Err(ValidationError::MissingRequired("CPG_API_URL"));
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ValidationError::InvalidApiUrl);
        }
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("CPG_API_KEY"));
        }
        Ok(())
    }
}
