//! Payment gateway port for cryptocurrency invoice processing.
//!
//! Defines the contract every provider driver (CoinPayments, CPG, mocks)
//! implements. Callers work against this trait and never see provider wire
//! formats, credentials or status vocabularies.
//!
//! # Design
//!
//! - **Provider agnostic**: One interface across all gateway drivers
//! - **Canonical types**: Drivers map wire payloads into [`Invoice`] before returning
//! - **Fail closed**: Webhook handling rejects anything it cannot verify

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;
use crate::domain::invoice::{Invoice, InvoiceDraft};
use crate::ports::EventSink;

/// Port for cryptocurrency payment gateway integrations.
///
/// Handles invoice listing, retrieval, creation and webhook processing.
/// Implementations verify webhook authenticity before acting on a delivery.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// List invoices known to the provider.
    ///
    /// `filters` are provider-specific query parameters passed through
    /// verbatim. An empty result is not an error.
    async fn list_invoices(&self, filters: &InvoiceFilters) -> Result<Vec<Invoice>, GatewayError>;

    /// Fetch a single invoice by its provider identifier.
    async fn get_invoice(&self, id: &str) -> Result<Invoice, GatewayError>;

    /// Open a new invoice with the provider.
    ///
    /// On success the returned invoice carries the provider-assigned id and
    /// payment address, and an `invoice.created` event is emitted to `events`.
    async fn create_invoice(
        &self,
        draft: &InvoiceDraft,
        events: &dyn EventSink,
    ) -> Result<Invoice, GatewayError>;

    /// Process a webhook delivery from the provider.
    ///
    /// Verifies the delivery's signature before anything else; an
    /// unverifiable request yields an authentication error and no event.
    /// Returns the invoice the delivery was about, updated to the reported
    /// status.
    async fn handle_webhook(
        &self,
        request: &WebhookRequest,
        events: &dyn EventSink,
    ) -> Result<Invoice, GatewayError>;
}

impl std::fmt::Debug for dyn PaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn PaymentGateway")
    }
}

/// Query parameters for invoice listing, passed to the provider as-is.
///
/// Order is preserved because signed APIs hash the URL exactly as sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFilters {
    params: Vec<(String, String)>,
}

impl InvoiceFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }
}

/// An inbound webhook delivery, as close to the wire as possible.
///
/// Drivers need the raw body bytes and the exact request URL to recompute
/// signatures; anything pre-parsed would break verification.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub method: http::Method,
    pub url: String,
    pub headers: http::HeaderMap,
    pub body: Vec<u8>,
}

impl WebhookRequest {
    pub fn new(
        method: http::Method,
        url: impl Into<String>,
        headers: http::HeaderMap,
        body: Vec<u8>,
    ) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
            body,
        }
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create an authentication error (bad credentials, failed signature).
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Authentication, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(GatewayErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Create a validation error (malformed input or payload).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Validation, message)
    }

    /// Create an upstream error (provider unreachable or misbehaving).
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Upstream, message)
    }

    /// Create a configuration error (adapter misconfigured on our side).
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Configuration, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<ValidationError> for GatewayError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.to_string())
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Credentials rejected or webhook signature failed.
    Authentication,

    /// Invoice or other resource does not exist.
    NotFound,

    /// Input or payload failed validation.
    Validation,

    /// The provider errored or could not be reached.
    Upstream,

    /// The adapter itself is misconfigured.
    Configuration,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayErrorCode::Upstream)
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::Authentication => "authentication_error",
            GatewayErrorCode::NotFound => "not_found",
            GatewayErrorCode::Validation => "validation_error",
            GatewayErrorCode::Upstream => "upstream_error",
            GatewayErrorCode::Configuration => "configuration_error",
        };
        write!(f, "{}", s)
    }
}
