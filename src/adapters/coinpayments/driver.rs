//! CoinPayments gateway driver.
//!
//! Implements the `PaymentGateway` trait against the CoinPayments v2
//! merchant API. Every outbound call is HMAC-signed and every inbound
//! webhook is verified with the same signing scheme.
//!
//! # Security
//!
//! - HMAC-SHA256 request signing over method + URL + client id + timestamp + body
//! - Constant-time webhook signature comparison, verified before parsing
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = CoinPaymentsConfig::new(client_id, client_secret);
//! let driver = CoinPaymentsDriver::new(config, CurrencyCatalog::builtin().clone());
//! ```

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;

use crate::config::Environment;
use crate::domain::currency::{Currency, CurrencyCatalog};
use crate::domain::invoice::{Invoice, InvoiceDraft, InvoiceEvent, InvoiceEventKind};
use crate::domain::signing::RequestSigner;
use crate::ports::{EventSink, GatewayError, InvoiceFilters, PaymentGateway, WebhookRequest};

use super::mapping;
use super::wire::{
    CreateInvoiceRequest, CreateInvoiceResponse, InvoiceListResponse, InvoiceResource,
    PaymentCurrencyResponse, WebhookEnvelope,
};

/// Production API host.
const DEFAULT_API_BASE_URL: &str = "https://a-api.coinpayments.net";

/// Expiry window applied when the provider omits a due date.
const DEFAULT_PAYMENT_WINDOW_MINUTES: u64 = 60;

/// Deterministic deposit address returned outside production.
///
/// Keeps integration tests network-free: the sandbox variant never calls the
/// payment-currencies endpoint.
pub const SANDBOX_PAYMENT_ADDRESS: &str = "sandbox-payment-address";

const CLIENT_HEADER: &str = "X-CoinPayments-Client";
const TIMESTAMP_HEADER: &str = "X-CoinPayments-Timestamp";
const SIGNATURE_HEADER: &str = "X-CoinPayments-Signature";

/// CoinPayments API configuration.
#[derive(Clone)]
pub struct CoinPaymentsConfig {
    /// Integration client id (the shared secret's public half).
    client_id: String,

    /// Integration client secret used as the HMAC key.
    client_secret: SecretString,

    /// Sandbox or production; sandbox short-circuits address allocation.
    environment: Environment,

    /// Refund email forwarded on invoice creation, when configured.
    refund_email: Option<String>,

    /// Base URL for the merchant API (default: https://a-api.coinpayments.net).
    api_base_url: String,

    /// Fallback expiry window in minutes.
    payment_window_minutes: u64,
}

impl CoinPaymentsConfig {
    /// Create a new CoinPayments configuration.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            environment: Environment::default(),
            refund_email: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            payment_window_minutes: DEFAULT_PAYMENT_WINDOW_MINUTES,
        }
    }

    /// Set the target environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the refund email sent with created invoices.
    pub fn with_refund_email(mut self, email: impl Into<String>) -> Self {
        self.refund_email = Some(email.into());
        self
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the fallback expiry window in minutes.
    pub fn with_payment_window(mut self, minutes: u64) -> Self {
        self.payment_window_minutes = minutes;
        self
    }
}

/// CoinPayments gateway driver.
///
/// Implements `PaymentGateway` for the CoinPayments v2 merchant API.
pub struct CoinPaymentsDriver {
    config: CoinPaymentsConfig,
    signer: RequestSigner,
    catalog: CurrencyCatalog,
    http_client: reqwest::Client,
}

impl CoinPaymentsDriver {
    /// Create a new driver with the given configuration and currency catalog.
    pub fn new(config: CoinPaymentsConfig, catalog: CurrencyCatalog) -> Self {
        let signer = RequestSigner::new(config.client_id.clone(), config.client_secret.clone());
        Self {
            config,
            signer,
            catalog,
            http_client: reqwest::Client::new(),
        }
    }

    /// Fetch the deposit address for an invoice/currency pair.
    ///
    /// Outside production this returns the fixed sandbox address without any
    /// network call.
    async fn fetch_payment_address(
        &self,
        invoice_id: &str,
        currency_id: &str,
    ) -> Result<String, GatewayError> {
        if !self.config.environment.is_production() {
            return Ok(SANDBOX_PAYMENT_ADDRESS.to_string());
        }

        let url = format!(
            "{}/api/v1/invoices/{}/payment-currencies/{}",
            self.config.api_base_url, invoice_id, currency_id
        );
        let signed = self.signer.sign("GET", &url, None);

        let response = self
            .http_client
            .get(&url)
            .header(CLIENT_HEADER, &self.config.client_id)
            .header(TIMESTAMP_HEADER, &signed.timestamp)
            .header(SIGNATURE_HEADER, &signed.signature)
            .send()
            .await
            .map_err(|e| GatewayError::upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                error = %error_text,
                invoice_id,
                "CoinPayments payment address lookup failed"
            );
            return Err(GatewayError::upstream(format!(
                "Failed to retrieve payment address: {}",
                error_text
            ))
            .with_provider_code(status.as_u16().to_string()));
        }

        let parsed: PaymentCurrencyResponse = response.json().await.map_err(|e| {
            GatewayError::upstream(format!("Failed to parse CoinPayments response: {}", e))
        })?;

        parsed
            .addresses
            .and_then(|a| a.address)
            .ok_or_else(|| {
                GatewayError::upstream(format!(
                    "Payment address not found for invoice {}",
                    invoice_id
                ))
            })
    }

    /// Map a REST invoice resource to the canonical model.
    async fn map_invoice(&self, resource: InvoiceResource) -> Result<Invoice, GatewayError> {
        let currency = mapping::map_currency_id(&resource.currency.id, &self.catalog);
        let crypto_address = self
            .fetch_payment_address(&resource.id, &resource.currency.id)
            .await?;
        let expiration = self.expiration_from(resource.due_date.as_deref());
        let status = mapping::map_status(&resource.status);

        let mut invoice = Invoice::new(
            &resource.id,
            &resource.amount.total,
            currency,
            status,
            crypto_address,
            expiration,
        )?;
        if let Some(notes) = &resource.notes {
            invoice = invoice.with_description(notes);
        }
        Ok(invoice)
    }

    /// Unix expiry timestamp from a provider due date, with window fallback.
    fn expiration_from(&self, due_date: Option<&str>) -> i64 {
        if let Some(raw) = due_date {
            if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
                return parsed.timestamp();
            }
            if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            {
                return parsed.and_utc().timestamp();
            }
            tracing::warn!(
                due_date = raw,
                "Unparseable invoice due date, falling back to payment window"
            );
        }
        Utc::now().timestamp() + (self.config.payment_window_minutes as i64) * 60
    }
}

#[async_trait]
impl PaymentGateway for CoinPaymentsDriver {
    async fn list_invoices(&self, filters: &InvoiceFilters) -> Result<Vec<Invoice>, GatewayError> {
        let base = format!("{}/api/v2/merchant/invoices", self.config.api_base_url);

        // The signature covers the URL exactly as sent, query string included.
        let url = if filters.is_empty() {
            base
        } else {
            reqwest::Url::parse_with_params(&base, filters.params())
                .map_err(|e| GatewayError::validation(format!("Invalid list filters: {}", e)))?
                .to_string()
        };

        let signed = self.signer.sign("GET", &url, None);

        let response = self
            .http_client
            .get(&url)
            .header(CLIENT_HEADER, &self.config.client_id)
            .header(TIMESTAMP_HEADER, &signed.timestamp)
            .header(SIGNATURE_HEADER, &signed.signature)
            .send()
            .await
            .map_err(|e| GatewayError::upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "CoinPayments list_invoices failed");
            return Err(GatewayError::upstream(format!(
                "Failed to retrieve invoices: {}",
                error_text
            ))
            .with_provider_code(status.as_u16().to_string()));
        }

        let list: InvoiceListResponse = response.json().await.map_err(|e| {
            GatewayError::upstream(format!("Failed to parse CoinPayments response: {}", e))
        })?;

        let mut invoices = Vec::with_capacity(list.items.len());
        for item in list.items {
            invoices.push(self.map_invoice(item).await?);
        }
        Ok(invoices)
    }

    async fn get_invoice(&self, id: &str) -> Result<Invoice, GatewayError> {
        let url = format!("{}/api/v2/merchant/invoices/{}", self.config.api_base_url, id);
        let signed = self.signer.sign("GET", &url, None);

        let response = self
            .http_client
            .get(&url)
            .header(CLIENT_HEADER, &self.config.client_id)
            .header(TIMESTAMP_HEADER, &signed.timestamp)
            .header(SIGNATURE_HEADER, &signed.signature)
            .send()
            .await
            .map_err(|e| GatewayError::upstream(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::not_found(&format!("Invoice {}", id)));
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, invoice_id = id, "CoinPayments get_invoice failed");
            return Err(GatewayError::upstream(format!(
                "Failed to retrieve invoice: {}",
                error_text
            ))
            .with_provider_code(status.as_u16().to_string()));
        }

        let resource: InvoiceResource = response.json().await.map_err(|e| {
            GatewayError::upstream(format!("Failed to parse CoinPayments response: {}", e))
        })?;

        self.map_invoice(resource).await
    }

    async fn create_invoice(
        &self,
        draft: &InvoiceDraft,
        events: &dyn EventSink,
    ) -> Result<Invoice, GatewayError> {
        // 1. Resolve the draft currency to a provider id; unmappable is a
        //    caller error, not an upstream one.
        let provider_currency = mapping::provider_currency_id(&draft.currency).ok_or_else(|| {
            GatewayError::validation(format!(
                "Currency '{}' ({} on {}) is not payable through CoinPayments",
                draft.currency.key, draft.currency.symbol, draft.currency.network
            ))
        })?;

        let item_name = draft
            .description
            .clone()
            .unwrap_or_else(|| "Invoice".to_string());
        let request = CreateInvoiceRequest::new(
            provider_currency,
            &draft.amount,
            item_name,
            self.config.refund_email.clone(),
        );

        // 2. Serialize once and sign those exact bytes.
        let payload = serde_json::to_string(&request).map_err(|e| {
            GatewayError::validation(format!("Failed to serialize create payload: {}", e))
        })?;

        let url = format!("{}/api/v2/merchant/invoices", self.config.api_base_url);
        let signed = self.signer.sign("POST", &url, Some(&payload));

        let response = self
            .http_client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(CLIENT_HEADER, &self.config.client_id)
            .header(TIMESTAMP_HEADER, &signed.timestamp)
            .header(SIGNATURE_HEADER, &signed.signature)
            .body(payload)
            .send()
            .await
            .map_err(|e| GatewayError::upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "CoinPayments create_invoice failed");
            return Err(GatewayError::upstream(format!(
                "Failed to create invoice: {}",
                error_text
            ))
            .with_provider_code(status.as_u16().to_string()));
        }

        let created: CreateInvoiceResponse = response.json().await.map_err(|e| {
            GatewayError::upstream(format!("Failed to parse CoinPayments response: {}", e))
        })?;

        let first = created.invoices.first().ok_or_else(|| {
            GatewayError::upstream("CoinPayments create returned no invoice ids")
        })?;

        // 3. The create response carries only ids; fetch the full invoice.
        let mut invoice = self.get_invoice(&first.id).await?;

        // The provider sometimes echoes a currency id we cannot resolve on a
        // brand-new invoice; the caller told us what they asked for.
        if invoice.currency.is_unknown() {
            invoice = invoice.with_currency(draft.currency.clone());
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
        let signature = request.header(SIGNATURE_HEADER).ok_or_else(|| {
            GatewayError::authentication("Missing X-CoinPayments-Signature header")
        })?;
        let timestamp = request.header(TIMESTAMP_HEADER).ok_or_else(|| {
            GatewayError::authentication("Missing X-CoinPayments-Timestamp header")
        })?;

        if !self.signer.verify(
            request.method.as_str(),
            &request.url,
            timestamp,
            &request.body,
            signature,
        ) {
            tracing::warn!(url = %request.url, "CoinPayments webhook signature verification failed");
            return Err(GatewayError::authentication("Invalid webhook signature"));
        }

        // 2. Parse the payload.
        let envelope: WebhookEnvelope = serde_json::from_slice(&request.body).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse CoinPayments webhook payload");
            GatewayError::validation(format!("Invalid webhook payload: {}", e))
        })?;

        // 3. Map into the canonical invoice. Webhook payloads omit the
        //    deposit address and often the currency.
        let currency = match &envelope.invoice.currency {
            Some(currency_ref) => mapping::map_currency_id(&currency_ref.id, &self.catalog),
            None => Currency::unknown(""),
        };
        let status = mapping::map_status(&envelope.invoice.state);
        let expiration = self.expiration_from(envelope.due_date.as_deref());

        let mut invoice = Invoice::new(
            &envelope.invoice.id,
            &envelope.invoice.amount.total,
            currency,
            status,
            "",
            expiration,
        )?;
        if let Some(notes) = &envelope.notes {
            invoice = invoice.with_description(notes);
        }

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
                    invoice_id = %envelope.invoice.id,
                    provider_event_id = envelope.id.as_deref().unwrap_or_default(),
                    event_type = %envelope.event_type,
                    "Unhandled CoinPayments webhook event type"
                );
            }
        }

        Ok(invoice)
    }
}
