//! Invoice entity and the draft used to request one.

use serde::{Deserialize, Serialize};

use crate::domain::currency::Currency;
use crate::domain::foundation::{StateMachine, ValidationError};
use crate::domain::invoice::InvoiceStatus;

/// A provider-neutral payment invoice.
///
/// This is the canonical shape every driver maps its wire payloads into.
/// Monetary amounts are decimal strings to avoid float rounding; the string
/// is validated on construction and never reinterpreted afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Provider-assigned invoice identifier.
    pub id: String,

    /// Invoiced amount as a decimal string, e.g. `"0.05"`.
    pub amount: String,

    /// Currency the invoice is denominated in.
    pub currency: Currency,

    /// Canonical lifecycle status.
    pub status: InvoiceStatus,

    /// Address the payer sends funds to.
    pub crypto_address: String,

    /// Unix timestamp (seconds) after which the invoice expires.
    pub expiration_time: i64,

    /// Human-readable description shown to the payer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// URL the provider notifies when the invoice changes state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,

    /// URL the payer is sent to after cancelling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,

    /// URL the payer is sent to after paying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
}

impl Invoice {
    /// Creates an invoice, validating the identifier, amount and expiry.
    pub fn new(
        id: impl Into<String>,
        amount: impl Into<String>,
        currency: Currency,
        status: InvoiceStatus,
        crypto_address: impl Into<String>,
        expiration_time: i64,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("id"));
        }

        let amount = amount.into();
        validate_amount(&amount)?;

        if expiration_time < 0 {
            return Err(ValidationError::out_of_range(
                "expiration_time",
                0,
                i64::MAX,
                expiration_time,
            ));
        }

        Ok(Self {
            id,
            amount,
            currency,
            status,
            crypto_address: crypto_address.into(),
            expiration_time,
            description: None,
            callback_url: None,
            cancel_url: None,
            success_url: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn with_cancel_url(mut self, url: impl Into<String>) -> Self {
        self.cancel_url = Some(url.into());
        self
    }

    pub fn with_success_url(mut self, url: impl Into<String>) -> Self {
        self.success_url = Some(url.into());
        self
    }

    /// Replaces the currency, keeping everything else.
    ///
    /// Used when a provider echoes back a currency identifier we cannot
    /// resolve and the caller already knows what was requested.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Applies a provider-reported status, refusing to leave a terminal state.
    ///
    /// Providers occasionally re-deliver stale webhooks. A terminal invoice
    /// keeps its status and the conflicting report is logged instead.
    pub fn reconcile_status(mut self, reported: InvoiceStatus) -> Self {
        if self.status.is_terminal() && reported != self.status {
            tracing::warn!(
                invoice_id = %self.id,
                current = ?self.status,
                reported = ?reported,
                "Ignoring status report against terminal invoice"
            );
            return self;
        }
        self.status = reported;
        self
    }
}

/// What a caller supplies to open a new invoice.
///
/// Everything the provider assigns (identifier, payment address, expiry)
/// is absent here; the driver fills those in from the provider's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub amount: String,
    pub currency: Currency,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
}

impl InvoiceDraft {
    pub fn new(amount: impl Into<String>, currency: Currency) -> Result<Self, ValidationError> {
        let amount = amount.into();
        validate_amount(&amount)?;

        Ok(Self {
            amount,
            currency,
            description: None,
            callback_url: None,
            cancel_url: None,
            success_url: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn with_cancel_url(mut self, url: impl Into<String>) -> Self {
        self.cancel_url = Some(url.into());
        self
    }

    pub fn with_success_url(mut self, url: impl Into<String>) -> Self {
        self.success_url = Some(url.into());
        self
    }
}

/// Validates a decimal amount string: digits with at most one decimal point.
fn validate_amount(amount: &str) -> Result<(), ValidationError> {
    if amount.is_empty() {
        return Err(ValidationError::empty_field("amount"));
    }

    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in amount.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => {
                return Err(ValidationError::invalid_format(
                    "amount",
                    format!("unexpected character '{}'", c),
                ))
            }
        }
    }

    if digits == 0 {
        return Err(ValidationError::invalid_format(
            "amount",
            "must contain at least one digit",
        ));
    }
    if dots > 1 {
        return Err(ValidationError::invalid_format(
            "amount",
            "more than one decimal point",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::currency::CurrencyCatalog;

    fn btc() -> Currency {
        CurrencyCatalog::builtin()
            .get("1")
            .cloned()
            .expect("builtin BTC")
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Construction Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn creates_valid_invoice() {
        let invoice = Invoice::new(
            "inv-42",
            "0.05",
            btc(),
            InvoiceStatus::Pending,
            "bc1qexample",
            1_900_000_000,
        )
        .unwrap();

        assert_eq!(invoice.id, "inv-42");
        assert_eq!(invoice.amount, "0.05");
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.crypto_address, "bc1qexample");
        assert!(invoice.description.is_none());
    }

    #[test]
    fn rejects_empty_id() {
        let result = Invoice::new(
            "  ",
            "0.05",
            btc(),
            InvoiceStatus::Pending,
            "bc1qexample",
            0,
        );
        assert_eq!(result, Err(ValidationError::empty_field("id")));
    }

    #[test]
    fn rejects_negative_expiration() {
        let result = Invoice::new(
            "inv-1",
            "1",
            btc(),
            InvoiceStatus::Pending,
            "bc1qexample",
            -5,
        );
        assert!(matches!(
            result,
            Err(ValidationError::OutOfRange { field, .. }) if field == "expiration_time"
        ));
    }

    #[test]
    fn builders_attach_optional_fields() {
        let invoice = Invoice::new(
            "inv-7",
            "12",
            btc(),
            InvoiceStatus::Pending,
            "bc1qexample",
            1_900_000_000,
        )
        .unwrap()
        .with_description("Annual plan")
        .with_callback_url("https://merchant.example/hooks")
        .with_cancel_url("https://merchant.example/cancel")
        .with_success_url("https://merchant.example/thanks");

        assert_eq!(invoice.description.as_deref(), Some("Annual plan"));
        assert_eq!(
            invoice.callback_url.as_deref(),
            Some("https://merchant.example/hooks")
        );
        assert_eq!(
            invoice.cancel_url.as_deref(),
            Some("https://merchant.example/cancel")
        );
        assert_eq!(
            invoice.success_url.as_deref(),
            Some("https://merchant.example/thanks")
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Amount Validation Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn accepts_integer_and_fractional_amounts() {
        for amount in ["1", "100", "0.00000001", "21.5", "0"] {
            assert!(
                validate_amount(amount).is_ok(),
                "expected '{}' to be accepted",
                amount
            );
        }
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_eq!(validate_amount(""), Err(ValidationError::empty_field("amount")));
        assert!(validate_amount(".").is_err());
        assert!(validate_amount("1.2.3").is_err());
        assert!(validate_amount("-5").is_err());
        assert!(validate_amount("12a").is_err());
        assert!(validate_amount("1,5").is_err());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Status Reconciliation Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn reconcile_applies_forward_status() {
        let invoice = Invoice::new(
            "inv-9",
            "1",
            btc(),
            InvoiceStatus::Pending,
            "bc1qexample",
            1_900_000_000,
        )
        .unwrap()
        .reconcile_status(InvoiceStatus::Fulfilled);

        assert_eq!(invoice.status, InvoiceStatus::Fulfilled);
    }

    #[test]
    fn reconcile_keeps_terminal_status() {
        let invoice = Invoice::new(
            "inv-10",
            "1",
            btc(),
            InvoiceStatus::Successed,
            "bc1qexample",
            1_900_000_000,
        )
        .unwrap()
        .reconcile_status(InvoiceStatus::Pending);

        assert_eq!(invoice.status, InvoiceStatus::Successed);
    }

    #[test]
    fn reconcile_allows_same_terminal_status() {
        let invoice = Invoice::new(
            "inv-11",
            "1",
            btc(),
            InvoiceStatus::Expired,
            "bc1qexample",
            1_900_000_000,
        )
        .unwrap()
        .reconcile_status(InvoiceStatus::Expired);

        assert_eq!(invoice.status, InvoiceStatus::Expired);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Draft Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn draft_validates_amount() {
        assert!(InvoiceDraft::new("0.25", btc()).is_ok());
        assert!(InvoiceDraft::new("abc", btc()).is_err());
    }

    #[test]
    fn draft_builders_chain() {
        let draft = InvoiceDraft::new("3", btc())
            .unwrap()
            .with_description("Top-up")
            .with_callback_url("https://merchant.example/hooks");

        assert_eq!(draft.description.as_deref(), Some("Top-up"));
        assert_eq!(
            draft.callback_url.as_deref(),
            Some("https://merchant.example/hooks")
        );
        assert!(draft.cancel_url.is_none());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Serialization Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn omits_absent_optional_fields() {
        let invoice = Invoice::new(
            "inv-12",
            "1",
            btc(),
            InvoiceStatus::Pending,
            "bc1qexample",
            1_900_000_000,
        )
        .unwrap();

        let json = serde_json::to_value(&invoice).unwrap();
        assert!(json.get("description").is_none());
        assert!(json.get("callback_url").is_none());
        assert_eq!(json["status"], "PENDING");
    }
}
