//! CPG gateway driver.
//!
//! Implements the `PaymentGateway` trait against a CPG deployment. Outbound
//! calls authenticate with a bearer token; inbound webhooks are verified
//! against a shared-secret HMAC of the raw body.
//!
//! # Security
//!
//! - `Authorization: Bearer` on every outbound call
//! - Webhook HMAC-SHA256 over the raw body, hex-encoded, constant-time compared
//! - A missing webhook secret is a configuration error, never silent trust
//!
//! # Configuration
//!
//! ```ignore
//! let config = CpgConfig::new(api_url, api_key).with_webhook_secret(secret);
//! let driver = CpgDriver::new(config, CurrencyCatalog::builtin().clone());
//! ```

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::domain::currency::{Currency, CurrencyCatalog};
use crate::domain::invoice::{Invoice, InvoiceDraft, InvoiceEvent, InvoiceEventKind};
use crate::domain::signing::constant_time_compare;
use crate::ports::{EventSink, GatewayError, InvoiceFilters, PaymentGateway, WebhookRequest};

use super::mapping;
use super::wire::{hex_decode, CreatePaymentRequest, PaymentResource, WebhookEnvelope};

type HmacSha256 = Hmac<Sha256>;

/// Expiry window applied when the provider omits a payment deadline.
const DEFAULT_PAYMENT_WINDOW_MINUTES: u64 = 60;

const SIGNATURE_HEADER: &str = "X-Cpg-Signature";

/// CPG API configuration.
#[derive(Clone)]
pub struct CpgConfig {
    /// Base URL of the CPG deployment, without a trailing slash.
    api_url: String,

    /// Bearer token for the merchant API.
    api_key: SecretString,

    /// Shared secret for webhook verification; required to handle webhooks.
    webhook_secret: Option<SecretString>,

    /// Fallback expiry window in minutes.
    payment_window_minutes: u64,
}

impl CpgConfig {
    /// Create a new CPG configuration.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: SecretString::new(api_key.into()),
            webhook_secret: None,
            payment_window_minutes: DEFAULT_PAYMENT_WINDOW_MINUTES,
        }
    }

    /// Set the webhook shared secret.
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(SecretString::new(secret.into()));
        self
    }

    /// Set the fallback expiry window in minutes.
    pub fn with_payment_window(mut self, minutes: u64) -> Self {
        self.payment_window_minutes = minutes;
        self
    }
}

/// CPG gateway driver.
///
/// Implements `PaymentGateway` for CPG deployments.
pub struct CpgDriver {
    config: CpgConfig,
    catalog: CurrencyCatalog,
    http_client: reqwest::Client,
}

impl CpgDriver {
    /// Create a new driver with the given configuration and currency catalog.
    pub fn new(config: CpgConfig, catalog: CurrencyCatalog) -> Self {
        Self {
            config,
            catalog,
            http_client: reqwest::Client::new(),
        }
    }

    /// Map a CPG payment resource to the canonical model.
    fn map_payment(&self, resource: PaymentResource) -> Result<Invoice, GatewayError> {
        let currency = self
            .catalog
            .find_by_symbol_network(&resource.currency.symbol, &resource.currency.network)
            .cloned()
            .unwrap_or_else(|| Currency::unknown(&resource.currency.symbol));

        let status = mapping::map_status(&resource.status);
        let expiration = self.expiration_from(resource.payment_deadline.as_deref());

        let invoice = Invoice::new(
            resource.id,
            resource.amount,
            currency,
            status,
            resource.receive_address.unwrap_or_default(),
            expiration,
        )?;
        Ok(invoice)
    }

    /// Unix expiry timestamp from a provider deadline, with window fallback.
    fn expiration_from(&self, deadline: Option<&str>) -> i64 {
        if let Some(raw) = deadline {
            if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
                return parsed.timestamp();
            }
            tracing::warn!(
                payment_deadline = raw,
                "Unparseable payment deadline, falling back to payment window"
            );
        }
        Utc::now().timestamp() + (self.config.payment_window_minutes as i64) * 60
    }

    /// Verify a webhook delivery against the configured shared secret.
    fn verify_webhook(&self, request: &WebhookRequest) -> Result<(), GatewayError> {
        // A CPG deployment without a webhook secret cannot authenticate
        // deliveries; refuse instead of trusting unsigned input.
        let secret = self.config.webhook_secret.as_ref().ok_or_else(|| {
            GatewayError::configuration("CPG webhook secret is not configured")
        })?;

        let signature_hex = request
            .header(SIGNATURE_HEADER)
            .ok_or_else(|| GatewayError::authentication("Missing X-Cpg-Signature header"))?;
        let provided = hex_decode(signature_hex)
            .ok_or_else(|| GatewayError::authentication("Malformed X-Cpg-Signature header"))?;

        let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(&request.body);
        let expected = mac.finalize().into_bytes();

        if !constant_time_compare(expected.as_slice(), &provided) {
            tracing::warn!(url = %request.url, "CPG webhook signature verification failed");
            return Err(GatewayError::authentication("Invalid webhook signature"));
        }

        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for CpgDriver {
    async fn list_invoices(&self, filters: &InvoiceFilters) -> Result<Vec<Invoice>, GatewayError> {
        let base = format!("{}/payments", self.config.api_url);
        let url = if filters.is_empty() {
            base
        } else {
            reqwest::Url::parse_with_params(&base, filters.params())
                .map_err(|e| GatewayError::validation(format!("Invalid list filters: {}", e)))?
                .to_string()
        };

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| GatewayError::upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "CPG list_invoices failed");
            return Err(GatewayError::upstream(format!(
                "Failed to retrieve payments: {}",
                error_text
            ))
            .with_provider_code(status.as_u16().to_string()));
        }

        // CPG lists are a bare JSON array, no envelope.
        let payments: Vec<PaymentResource> = response.json().await.map_err(|e| {
            GatewayError::upstream(format!("Failed to parse CPG response: {}", e))
        })?;

        payments
            .into_iter()
            .map(|payment| self.map_payment(payment))
            .collect()
    }

    async fn get_invoice(&self, id: &str) -> Result<Invoice, GatewayError> {
        let url = format!("{}/payments/{}", self.config.api_url, id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| GatewayError::upstream(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::not_found(&format!("Payment {}", id)));
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, payment_id = id, "CPG get_invoice failed");
            return Err(GatewayError::upstream(format!(
                "Failed to retrieve payment: {}",
                error_text
            ))
            .with_provider_code(status.as_u16().to_string()));
        }

        let payment: PaymentResource = response.json().await.map_err(|e| {
            GatewayError::upstream(format!("Failed to parse CPG response: {}", e))
        })?;

        self.map_payment(payment)
    }

    async fn create_invoice(
        &self,
        draft: &InvoiceDraft,
        events: &dyn EventSink,
    ) -> Result<Invoice, GatewayError> {
        // The placeholder currency has no meaningful symbol/network pair to
        // send upstream.
        if draft.currency.is_unknown() {
            return Err(GatewayError::validation(format!(
                "Currency '{}' cannot be charged through CPG",
                draft.currency.symbol
            )));
        }

        let request = CreatePaymentRequest {
            amount: draft.amount.clone(),
            currency_symbol: draft.currency.symbol.clone(),
            currency_network: draft.currency.network.clone(),
        };

        let url = format!("{}/payments", self.config.api_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "CPG create_invoice failed");
            return Err(GatewayError::upstream(format!(
                "Failed to create payment: {}",
                error_text
            ))
            .with_provider_code(status.as_u16().to_string()));
        }

        let payment: PaymentResource = response.json().await.map_err(|e| {
            GatewayError::upstream(format!("Failed to parse CPG response: {}", e))
        })?;

        let mut invoice = self.map_payment(payment)?;

        // The create response should echo the requested currency; fall back
        // to the draft's if it came back unresolvable.
        if invoice.currency.is_unknown() {
            invoice = invoice.with_currency(draft.currency.clone());
        }
        if let Some(description) = &draft.description {
            invoice = invoice.with_description(description);
        }

        events.emit(InvoiceEvent::new(InvoiceEventKind::Created, invoice.clone()));

        Ok(invoice)
    }

    async fn handle_webhook(
        &self,
        request: &WebhookRequest,
        events: &dyn EventSink,
    ) -> Result<Invoice, GatewayError> {
        // 1. Authenticate before touching the payload.
        self.verify_webhook(request)?;

        // 2. Parse the payload.
        let envelope: WebhookEnvelope = serde_json::from_slice(&request.body).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse CPG webhook payload");
            GatewayError::validation(format!("Invalid webhook payload: {}", e))
        })?;

        // 3. Map into the canonical invoice.
        let invoice = self.map_payment(envelope.payment)?;

        // 4. Classify the event type and emit at most one lifecycle event.
        match mapping::classify_event(&envelope.event_type) {
            Some(kind) => {
                let mut event = InvoiceEvent::new(kind, invoice.clone());
                if let Some(event_id) = &envelope.id {
                    event = event.with_provider_event_id(event_id);
                }
                events.emit(event);
            }
            None => {
                tracing::info!(
                    invoice_id = %invoice.id,
                    provider_event_id = %envelope.id.as_deref().unwrap_or_default(),
                    event_type = %envelope.event_type,
                    "Unhandled CPG webhook event type"
                );
            }
        }

        Ok(invoice)
    }
}
