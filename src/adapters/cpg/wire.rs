//! CPG wire types.
//!
//! CPG (Crypto Payment Gateway) speaks a small snake_case REST dialect: a
//! payment resource shared by list, get, create and webhook payloads.

use serde::{Deserialize, Serialize};

/// One payment as returned by every CPG endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentResource {
    pub id: String,

    /// Decimal string, e.g. `"0.05"`.
    pub amount: String,

    pub currency: PaymentCurrency,

    /// Provider status string (`new`, `confirming`, `paid`, ...).
    pub status: String,

    /// Deposit address; not yet allocated on brand-new payments.
    #[serde(default)]
    pub receive_address: Option<String>,

    /// RFC 3339 deadline after which the payment expires.
    #[serde(default)]
    pub payment_deadline: Option<String>,
}

/// Currency as a symbol/network pair.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentCurrency {
    pub symbol: String,
    pub network: String,
}

/// Body for `POST {base}/payments`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePaymentRequest {
    pub amount: String,
    pub currency_symbol: String,
    pub currency_network: String,
}

/// Webhook delivery envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    /// Provider's event delivery id.
    #[serde(default)]
    pub id: Option<String>,

    /// Event type, e.g. `payment.completed`; matched case-insensitively.
    #[serde(rename = "type")]
    pub event_type: String,

    pub payment: PaymentResource,
}

/// Decode a lowercase/uppercase hex string to bytes.
///
/// Returns `None` on odd length or non-hex characters; the caller treats
/// that as an authentication failure, never a panic.
pub(super) fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        let byte = u8::from_str_radix(hex.get(i..i + 2)?, 16).ok()?;
        bytes.push(byte);
    }
    Some(bytes)
}
