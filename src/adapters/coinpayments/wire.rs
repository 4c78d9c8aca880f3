//! CoinPayments wire types for the v2 merchant API and webhook payloads.
//!
//! These types mirror the provider's JSON exactly, camelCase names included.
//! Parsing is deliberately tolerant where the provider is inconsistent:
//! numeric fields that sometimes arrive as strings are accepted either way.

use serde::{Deserialize, Deserializer, Serialize};

/// Accepts a JSON string or number, yielding its string form.
///
/// CoinPayments sends `currency.id` as a number for plain coins and as a
/// string for token ids like `"35:0x55d3..."`.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Invoice Resources (list / get / webhook)
// ════════════════════════════════════════════════════════════════════════════════

/// Response envelope for `GET /api/v2/merchant/invoices`.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceListResponse {
    #[serde(default)]
    pub items: Vec<InvoiceResource>,
}

/// One invoice as returned by the merchant API.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceResource {
    pub id: String,

    pub amount: AmountResource,

    pub currency: CurrencyRef,

    /// Provider status string (`draft`, `unpaid`, `paid`, ...).
    pub status: String,

    /// RFC 3339 expiry; absent on some drafts.
    #[serde(rename = "dueDate")]
    pub due_date: Option<String>,

    /// Free-form merchant notes, used as the invoice description.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Amount container; only the total is meaningful to us.
#[derive(Debug, Clone, Deserialize)]
pub struct AmountResource {
    #[serde(deserialize_with = "string_or_number")]
    pub total: String,
}

/// Currency reference carrying the provider's own identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

/// Response envelope for `POST /api/v2/merchant/invoices`.
///
/// The create call returns only identifiers; the full invoice is re-fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceResponse {
    #[serde(default)]
    pub invoices: Vec<CreatedInvoiceRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedInvoiceRef {
    pub id: String,
}

/// Response for `GET /api/v1/invoices/{id}/payment-currencies/{currency}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentCurrencyResponse {
    #[serde(default)]
    pub addresses: Option<PaymentAddresses>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentAddresses {
    #[serde(default)]
    pub address: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Payload
// ════════════════════════════════════════════════════════════════════════════════

/// Webhook delivery envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    /// Provider's event delivery id.
    #[serde(default)]
    pub id: Option<String>,

    /// Event type, e.g. `InvoiceCompleted`; matched case-insensitively.
    #[serde(rename = "type")]
    pub event_type: String,

    pub invoice: WebhookInvoice,

    /// RFC 3339 expiry; not sent for every event type.
    #[serde(rename = "dueDate")]
    pub due_date: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Invoice snapshot inside a webhook payload.
///
/// Unlike the REST resource this uses `state` for the status and may omit
/// the currency entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookInvoice {
    pub id: String,

    pub amount: AmountResource,

    pub state: String,

    #[serde(default)]
    pub currency: Option<CurrencyRef>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Create Request
// ════════════════════════════════════════════════════════════════════════════════

/// Body for `POST /api/v2/merchant/invoices`.
///
/// The provider rejects requests missing any of these fields, so the unused
/// ones are serialized explicitly as `null`/`false` rather than omitted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub currency: String,
    pub items: Vec<LineItem>,
    pub amount: AmountPayload,
    pub is_email_delivery: bool,
    pub email_delivery: Option<serde_json::Value>,
    pub buyer: Option<serde_json::Value>,
    pub shipping: Option<serde_json::Value>,
    pub merchant_options: MerchantOptions,
    pub payment: PaymentOptions,
    pub hide_shopping_cart: bool,
}

impl CreateInvoiceRequest {
    /// Builds the fixed-shape create payload for a single-item invoice.
    pub fn new(
        currency_id: impl Into<String>,
        amount: impl Into<String>,
        item_name: impl Into<String>,
        refund_email: Option<String>,
    ) -> Self {
        let currency_id = currency_id.into();
        let amount = amount.into();

        Self {
            currency: currency_id.clone(),
            items: vec![LineItem {
                name: item_name.into(),
                quantity: LineItemQuantity {
                    value: 1,
                    kind: "quantity".to_string(),
                },
                amount: amount.clone(),
            }],
            amount: AmountPayload {
                breakdown: AmountBreakdown {
                    subtotal: amount.clone(),
                },
                total: amount,
            },
            is_email_delivery: false,
            email_delivery: None,
            buyer: None,
            shipping: None,
            merchant_options: MerchantOptions::default(),
            payment: PaymentOptions {
                payment_currency: currency_id,
                refund_email,
            },
            hide_shopping_cart: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: LineItemQuantity,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItemQuantity {
    pub value: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmountPayload {
    pub breakdown: AmountBreakdown,
    pub total: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmountBreakdown {
    pub subtotal: String,
}

/// Invoice-page display toggles; we show nothing.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantOptions {
    pub show_address: bool,
    pub show_email: bool,
    pub show_phone: bool,
    pub show_registration_number: bool,
    pub show_tax_id: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOptions {
    pub payment_currency: String,
    pub refund_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ════════════════════════════════════════════════════════════════════════════
    // Response Parsing Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_invoice_with_numeric_currency_id() {
        let json = r#"{
            "id": "INV100",
            "amount": {"total": "0.05"},
            "currency": {"id": 1},
            "status": "unpaid",
            "dueDate": "2024-06-01T12:00:00Z",
            "notes": "Order 77"
        }"#;

        let invoice: InvoiceResource = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.id, "INV100");
        assert_eq!(invoice.amount.total, "0.05");
        assert_eq!(invoice.currency.id, "1");
        assert_eq!(invoice.status, "unpaid");
        assert_eq!(invoice.notes.as_deref(), Some("Order 77"));
    }

    #[test]
    fn parse_invoice_with_token_currency_id() {
        let json = r#"{
            "id": "INV101",
            "amount": {"total": 12},
            "currency": {"id": "9:TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"},
            "status": "paid"
        }"#;

        let invoice: InvoiceResource = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.amount.total, "12");
        assert_eq!(invoice.currency.id, "9:TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t");
        assert!(invoice.due_date.is_none());
    }

    #[test]
    fn parse_empty_list_response() {
        let list: InvoiceListResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(list.items.is_empty());

        let list: InvoiceListResponse = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(list.items.is_empty());
    }

    #[test]
    fn parse_create_response_ids() {
        let json = r#"{"invoices": [{"id": "NEW1"}, {"id": "NEW2"}]}"#;
        let response: CreateInvoiceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.invoices.len(), 2);
        assert_eq!(response.invoices[0].id, "NEW1");
    }

    #[test]
    fn parse_payment_currency_address() {
        let json = r#"{"addresses": {"address": "bc1qpayhere"}}"#;
        let response: PaymentCurrencyResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.addresses.unwrap().address.as_deref(),
            Some("bc1qpayhere")
        );

        let response: PaymentCurrencyResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(response.addresses.is_none());
    }

    #[test]
    fn parse_webhook_envelope() {
        let json = r#"{
            "id": "evt-555",
            "type": "InvoiceCompleted",
            "invoice": {
                "id": "abc123",
                "amount": {"total": "10.00"},
                "state": "completed"
            },
            "dueDate": "2024-06-01T12:00:00Z"
        }"#;

        let envelope: WebhookEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.id.as_deref(), Some("evt-555"));
        assert_eq!(envelope.event_type, "InvoiceCompleted");
        assert_eq!(envelope.invoice.id, "abc123");
        assert_eq!(envelope.invoice.state, "completed");
        assert!(envelope.invoice.currency.is_none());
    }

    #[test]
    fn parse_webhook_without_event_id_or_due_date() {
        let json = r#"{
            "type": "InvoicePaid",
            "invoice": {
                "id": "abc124",
                "amount": {"total": "3"},
                "state": "paid",
                "currency": {"id": 4}
            }
        }"#;

        let envelope: WebhookEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.id.is_none());
        assert!(envelope.due_date.is_none());
        assert_eq!(envelope.invoice.currency.unwrap().id, "4");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Create Request Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn create_request_serializes_provider_shape() {
        let request = CreateInvoiceRequest::new(
            "1",
            "0.05",
            "Order 77",
            Some("refunds@merchant.example".to_string()),
        );

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["currency"], "1");
        assert_eq!(json["items"][0]["name"], "Order 77");
        assert_eq!(json["items"][0]["quantity"]["value"], 1);
        assert_eq!(json["items"][0]["quantity"]["type"], "quantity");
        assert_eq!(json["amount"]["breakdown"]["subtotal"], "0.05");
        assert_eq!(json["amount"]["total"], "0.05");
        assert_eq!(json["isEmailDelivery"], false);
        assert!(json["emailDelivery"].is_null());
        assert!(json["buyer"].is_null());
        assert!(json["shipping"].is_null());
        assert_eq!(json["merchantOptions"]["showAddress"], false);
        assert_eq!(json["merchantOptions"]["showTaxId"], false);
        assert_eq!(json["payment"]["paymentCurrency"], "1");
        assert_eq!(json["payment"]["refundEmail"], "refunds@merchant.example");
        assert_eq!(json["hideShoppingCart"], true);
    }

    #[test]
    fn create_request_without_refund_email() {
        let request = CreateInvoiceRequest::new("1002", "7", "Invoice", None);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["payment"]["refundEmail"].is_null());
    }
}
