//! Canonical currency catalog.
//!
//! The catalog maps canonical currency keys to [`Currency`] definitions. A
//! built-in table covers the currencies the shipped drivers know about; host
//! applications can extend or override it from configuration.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::Currency;

/// Built-in catalog entries, constructed once.
static BUILTIN: Lazy<CurrencyCatalog> = Lazy::new(|| {
    let entries = [
        ("1", "Bitcoin", "BTC", "bitcoin", 8),
        ("2", "Ethereum", "ETH", "ethereum", 18),
        ("3", "Tether USD (BSC)", "USDT", "bsc", 18),
        ("4", "Tether USD (TRON)", "USDT", "tron", 6),
        ("5", "Tether USD (ERC-20)", "USDT", "ethereum", 6),
        ("t6", "Litecoin Testnet", "LTCT", "litecoin", 8),
    ];

    let currencies = entries
        .iter()
        .map(|(key, name, symbol, network, decimals)| Currency {
            key: (*key).to_string(),
            name: (*name).to_string(),
            symbol: (*symbol).to_string(),
            network: (*network).to_string(),
            decimal_places: *decimals,
        })
        .collect();

    CurrencyCatalog::new(currencies)
});

/// Lookup table from canonical key to currency definition.
#[derive(Debug, Clone, Default)]
pub struct CurrencyCatalog {
    currencies: HashMap<String, Currency>,
}

impl CurrencyCatalog {
    /// Builds a catalog from a list of currencies, keyed by `Currency::key`.
    ///
    /// Later entries win when keys collide.
    pub fn new(currencies: Vec<Currency>) -> Self {
        let currencies = currencies
            .into_iter()
            .map(|c| (c.key.clone(), c))
            .collect();
        Self { currencies }
    }

    /// The built-in catalog shipped with the crate.
    pub fn builtin() -> &'static CurrencyCatalog {
        &BUILTIN
    }

    /// Looks up a currency by canonical key.
    pub fn get(&self, key: &str) -> Option<&Currency> {
        self.currencies.get(key)
    }

    /// Finds a currency by symbol and network, case-insensitively.
    ///
    /// Used by drivers whose wire format reports `(symbol, network)` pairs
    /// instead of catalog keys.
    pub fn find_by_symbol_network(&self, symbol: &str, network: &str) -> Option<&Currency> {
        self.currencies.values().find(|c| {
            c.symbol.eq_ignore_ascii_case(symbol) && c.network.eq_ignore_ascii_case(network)
        })
    }

    /// Returns a new catalog with `overrides` layered on top of this one.
    ///
    /// Override entries replace built-in entries with the same key and add
    /// entries for new keys.
    pub fn merged_with(&self, overrides: Vec<Currency>) -> CurrencyCatalog {
        let mut currencies = self.currencies.clone();
        for currency in overrides {
            currencies.insert(currency.key.clone(), currency);
        }
        Self { currencies }
    }

    /// Number of currencies in the catalog.
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    /// True if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    /// Iterates over all currencies in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_contains_expected_keys() {
        let catalog = CurrencyCatalog::builtin();
        for key in ["1", "2", "3", "4", "5", "t6"] {
            assert!(catalog.get(key).is_some(), "missing builtin key {}", key);
        }
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn builtin_bitcoin_definition() {
        let btc = CurrencyCatalog::builtin().get("1").unwrap();
        assert_eq!(btc.symbol, "BTC");
        assert_eq!(btc.network, "bitcoin");
        assert_eq!(btc.decimal_places, 8);
    }

    #[test]
    fn get_unknown_key_returns_none() {
        assert!(CurrencyCatalog::builtin().get("999").is_none());
    }

    #[test]
    fn find_by_symbol_network_distinguishes_networks() {
        let catalog = CurrencyCatalog::builtin();

        let tron = catalog.find_by_symbol_network("USDT", "tron").unwrap();
        assert_eq!(tron.key, "4");

        let bsc = catalog.find_by_symbol_network("USDT", "bsc").unwrap();
        assert_eq!(bsc.key, "3");

        let eth = catalog.find_by_symbol_network("USDT", "ethereum").unwrap();
        assert_eq!(eth.key, "5");
    }

    #[test]
    fn find_by_symbol_network_is_case_insensitive() {
        let catalog = CurrencyCatalog::builtin();
        let found = catalog.find_by_symbol_network("usdt", "TRON").unwrap();
        assert_eq!(found.key, "4");
    }

    #[test]
    fn find_by_symbol_network_unknown_pair_returns_none() {
        let catalog = CurrencyCatalog::builtin();
        assert!(catalog.find_by_symbol_network("DOGE", "dogecoin").is_none());
    }

    #[test]
    fn merged_with_overrides_existing_key() {
        let catalog = CurrencyCatalog::builtin();
        let replacement = Currency::new("1", "Bitcoin Mainnet", "BTC", "bitcoin", 8).unwrap();

        let merged = catalog.merged_with(vec![replacement]);

        assert_eq!(merged.get("1").unwrap().name, "Bitcoin Mainnet");
        assert_eq!(merged.len(), catalog.len());
    }

    #[test]
    fn merged_with_adds_new_key() {
        let catalog = CurrencyCatalog::builtin();
        let doge = Currency::new("7", "Dogecoin", "DOGE", "dogecoin", 8).unwrap();

        let merged = catalog.merged_with(vec![doge]);

        assert_eq!(merged.len(), catalog.len() + 1);
        assert_eq!(merged.get("7").unwrap().symbol, "DOGE");
        // The original is untouched.
        assert!(catalog.get("7").is_none());
    }
}
