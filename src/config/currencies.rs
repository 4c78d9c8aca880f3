//! Currency catalog overrides

use serde::Deserialize;

use crate::domain::currency::Currency;

use super::error::ValidationError;

/// A configured currency definition.
///
/// Entries with a key already in the built-in catalog replace that entry;
/// new keys extend the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyDefinition {
    /// Canonical catalog key
    pub key: String,

    /// Human-readable name
    pub name: String,

    /// Ticker symbol
    pub symbol: String,

    /// Chain identifier
    pub network: String,

    /// Display precision in decimal places
    #[serde(default)]
    pub decimal_places: u32,
}

impl CurrencyDefinition {
    /// Convert to a domain currency
    pub fn to_currency(&self) -> Result<Currency, ValidationError> {
        Currency::new(
            &self.key,
            &self.name,
            &self.symbol,
            &self.network,
            self.decimal_places,
        )
        .map_err(|_| ValidationError::InvalidCurrencyOverride {
            key: self.key.clone(),
        })
    }
}
