//! HTTP DTOs (Data Transfer Objects) for provider webhook endpoints.
//!
//! These types define the JSON response structure for the webhook API.
//! Webhook request bodies are opaque: they are passed to the resolved
//! driver as raw bytes, never deserialized here.

use serde::{Deserialize, Serialize};

use crate::domain::invoice::Invoice;

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Acknowledgement returned to the provider after a webhook is processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    /// Always `"success"` on the 2xx path.
    pub status: String,
    /// The invoice state the webhook resolved to.
    pub invoice: Invoice,
}

impl WebhookAckResponse {
    /// Create the standard success acknowledgement.
    pub fn success(invoice: Invoice) -> Self {
        Self {
            status: "success".to_string(),
            invoice,
        }
    }
}

/// Error response body for failed webhook deliveries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
