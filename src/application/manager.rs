//! GatewayManager - named driver registry and resolver.
//!
//! Driver instances are constructed lazily from configuration on first use
//! and memoized for the life of the manager, so concurrent callers share one
//! instance per provider.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::adapters::coinpayments::{CoinPaymentsConfig, CoinPaymentsDriver};
use crate::adapters::cpg::{CpgConfig, CpgDriver};
use crate::config::AdapterConfig;
use crate::ports::{GatewayError, PaymentGateway};

/// Constructor function for a named driver.
pub type DriverFactory =
    Arc<dyn Fn(&AdapterConfig) -> Result<Arc<dyn PaymentGateway>, GatewayError> + Send + Sync>;

/// Resolves provider names to live gateway drivers.
///
/// Ships with the `coinpayments` and `cpg` drivers registered; hosts may
/// register additional factories at startup, so the set of providers is open.
///
/// # Thread Safety
///
/// Uses `RwLock` around the factory and instance maps since resolutions
/// (reads) vastly outnumber registrations (writes).
///
/// # Example
///
/// ```ignore
/// let manager = GatewayManager::new(AdapterConfig::load()?);
/// let driver = manager.driver("coinpayments").await?;
/// let invoice = driver.get_invoice("inv-1").await?;
/// ```
pub struct GatewayManager {
    /// Loaded configuration shared by all factories.
    config: AdapterConfig,

    /// Map of provider name → driver constructor.
    factories: RwLock<HashMap<String, DriverFactory>>,

    /// Map of provider name → memoized driver instance.
    instances: RwLock<HashMap<String, Arc<dyn PaymentGateway>>>,
}

impl GatewayManager {
    /// Create a manager with the built-in drivers registered.
    pub fn new(config: AdapterConfig) -> Self {
        let mut factories: HashMap<String, DriverFactory> = HashMap::new();
        factories.insert("coinpayments".to_string(), Arc::new(build_coinpayments));
        factories.insert("cpg".to_string(), Arc::new(build_cpg));

        Self {
            config,
            factories: RwLock::new(factories),
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// The configuration this manager resolves drivers from.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Register (or replace) a named driver factory.
    ///
    /// Replacing a factory drops any memoized instance for that name.
    pub async fn register(&self, name: &str, factory: DriverFactory) {
        self.factories
            .write()
            .await
            .insert(name.to_string(), factory);
        self.instances.write().await.remove(name);
    }

    /// Check whether a driver name has a registered factory.
    pub async fn has_driver(&self, name: &str) -> bool {
        self.factories.read().await.contains_key(name)
    }

    /// Resolve a driver by name, constructing it on first use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` when the name has no registered factory
    /// or the driver's required configuration keys are absent.
    pub async fn driver(&self, name: &str) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        // Fast path: already constructed
        if let Some(instance) = self.instances.read().await.get(name) {
            return Ok(Arc::clone(instance));
        }

        let factory = self
            .factories
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| {
                GatewayError::configuration(format!(
                    "Payment driver '{}' is not registered",
                    name
                ))
            })?;

        let instance = factory(&self.config)?;

        // Two tasks may race construction; the first insert wins so every
        // caller sees the same instance.
        let mut instances = self.instances.write().await;
        let entry = instances
            .entry(name.to_string())
            .or_insert_with(|| Arc::clone(&instance));
        Ok(Arc::clone(entry))
    }

    /// Resolve the configured default driver.
    pub async fn default_driver(&self) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        let name = self.config.default_driver.clone();
        self.driver(&name).await
    }
}

fn build_coinpayments(config: &AdapterConfig) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
    let settings = &config.drivers.coinpayments;
    settings
        .validate()
        .map_err(|e| GatewayError::configuration(e.to_string()))?;

    let mut driver_config =
        CoinPaymentsConfig::new(settings.client_id.clone(), settings.client_secret.clone())
            .with_environment(settings.environment)
            .with_payment_window(config.payment_window_minutes);
    if let Some(email) = &settings.refund_email {
        driver_config = driver_config.with_refund_email(email.clone());
    }

    Ok(Arc::new(CoinPaymentsDriver::new(
        driver_config,
        config.catalog(),
    )))
}

fn build_cpg(config: &AdapterConfig) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
    let settings = &config.drivers.cpg;
    settings
        .validate()
        .map_err(|e| GatewayError::configuration(e.to_string()))?;

    let mut driver_config = CpgConfig::new(settings.api_url.clone(), settings.api_key.clone())
        .with_payment_window(config.payment_window_minutes);
    if let Some(secret) = &settings.webhook_secret {
        driver_config = driver_config.with_webhook_secret(secret.clone());
    }

    Ok(Arc::new(CpgDriver::new(driver_config, config.catalog())))
}
