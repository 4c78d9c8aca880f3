//! Currency value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// An immutable currency definition.
///
/// A currency is identified by its canonical `key`; `symbol` plus `network`
/// identify it on the wire for providers that report currencies that way.
/// Amounts are transported as decimal strings, so `decimal_places` is used
/// only for display and rounding, never for arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Canonical catalog key (e.g. "1" for Bitcoin).
    pub key: String,

    /// Human-readable name (e.g. "Bitcoin").
    pub name: String,

    /// Ticker symbol (e.g. "BTC", "USDT").
    pub symbol: String,

    /// Chain identifier (e.g. "bitcoin", "tron", "bsc").
    pub network: String,

    /// Display precision in decimal places.
    pub decimal_places: u32,
}

impl Currency {
    /// Creates a currency, rejecting empty identifying fields.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        network: impl Into<String>,
        decimal_places: u32,
    ) -> Result<Self, ValidationError> {
        let key = key.into();
        let name = name.into();
        let symbol = symbol.into();
        let network = network.into();

        if key.is_empty() {
            return Err(ValidationError::empty_field("key"));
        }
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if symbol.is_empty() {
            return Err(ValidationError::empty_field("symbol"));
        }
        if network.is_empty() {
            return Err(ValidationError::empty_field("network"));
        }

        Ok(Self {
            key,
            name,
            symbol,
            network,
            decimal_places,
        })
    }

    /// Placeholder for a provider currency id with no catalog mapping.
    ///
    /// Mapping failures must not cost visibility of an invoice, so unknown
    /// ids degrade to this value instead of an error. The raw provider id is
    /// preserved in `symbol` for diagnosis.
    pub fn unknown(raw_id: impl Into<String>) -> Self {
        Self {
            key: String::new(),
            name: "Unknown".to_string(),
            symbol: raw_id.into(),
            network: "unknown".to_string(),
            decimal_places: 0,
        }
    }

    /// Returns true if this is the unknown-currency placeholder.
    pub fn is_unknown(&self) -> bool {
        self.network == "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_complete_definition() {
        let currency = Currency::new("1", "Bitcoin", "BTC", "bitcoin", 8).unwrap();
        assert_eq!(currency.key, "1");
        assert_eq!(currency.symbol, "BTC");
        assert_eq!(currency.decimal_places, 8);
        assert!(!currency.is_unknown());
    }

    #[test]
    fn new_rejects_empty_key() {
        let result = Currency::new("", "Bitcoin", "BTC", "bitcoin", 8);
        assert_eq!(result, Err(ValidationError::empty_field("key")));
    }

    #[test]
    fn new_rejects_empty_symbol() {
        let result = Currency::new("1", "Bitcoin", "", "bitcoin", 8);
        assert_eq!(result, Err(ValidationError::empty_field("symbol")));
    }

    #[test]
    fn new_rejects_empty_network() {
        let result = Currency::new("1", "Bitcoin", "BTC", "", 8);
        assert_eq!(result, Err(ValidationError::empty_field("network")));
    }

    #[test]
    fn unknown_preserves_raw_id_in_symbol() {
        let currency = Currency::unknown("99:0xdeadbeef");
        assert_eq!(currency.name, "Unknown");
        assert_eq!(currency.symbol, "99:0xdeadbeef");
        assert_eq!(currency.network, "unknown");
        assert!(currency.is_unknown());
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let currency = Currency::new("4", "Tether USD (TRON)", "USDT", "tron", 6).unwrap();
        let json = serde_json::to_value(&currency).unwrap();
        assert_eq!(json["key"], "4");
        assert_eq!(json["decimal_places"], 6);
        assert_eq!(json["network"], "tron");
    }
}
