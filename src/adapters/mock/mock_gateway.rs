//! Mock payment gateway for testing.
//!
//! Provides a configurable mock implementation of `PaymentGateway` for unit
//! and integration tests. Supports:
//! - Seeded and pre-configured invoices
//! - Error injection
//! - Call tracking
//! - Scripted webhook outcomes

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::currency::CurrencyCatalog;
use crate::domain::invoice::{Invoice, InvoiceDraft, InvoiceEvent, InvoiceEventKind, InvoiceStatus};
use crate::ports::{EventSink, GatewayError, InvoiceFilters, PaymentGateway, WebhookRequest};

/// Mock payment gateway for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockGateway::new();
///
/// // Seed the "database"
/// mock.add_invoice(MockGateway::pending_invoice("inv-1"));
///
/// // Inject errors
/// mock.set_error(GatewayError::upstream("Test outage"));
///
/// // Use in tests
/// let result = mock.get_invoice("inv-1").await;
/// ```
#[derive(Default)]
pub struct MockGateway {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Stored invoices by ID.
    invoices: HashMap<String, Invoice>,

    /// Next invoice to return from `create_invoice`.
    next_invoice: Option<Invoice>,

    /// Scripted outcome for the next webhook delivery.
    next_webhook_result: Option<(Invoice, InvoiceEventKind)>,

    /// Error to return on next call.
    next_error: Option<GatewayError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, GatewayError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,

    /// Webhook verification behavior.
    webhook_verify_mode: WebhookVerifyMode,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

/// How to handle webhook verification.
#[derive(Default, Clone)]
enum WebhookVerifyMode {
    /// Accept any delivery.
    #[default]
    AcceptAll,

    /// Always fail verification.
    AlwaysFail,
}

impl MockGateway {
    /// Create a new mock gateway with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().webhook_verify_mode = WebhookVerifyMode::AlwaysFail;
        mock
    }

    /// Create a mock seeded with the given invoices.
    pub fn with_invoices(invoices: Vec<Invoice>) -> Self {
        let mock = Self::new();
        for invoice in invoices {
            mock.add_invoice(invoice);
        }
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the invoice to return on the next `create_invoice` call.
    pub fn set_invoice(&self, invoice: Invoice) {
        self.inner.lock().unwrap().next_invoice = Some(invoice);
    }

    /// Add an invoice to the "database".
    pub fn add_invoice(&self, invoice: Invoice) {
        let id = invoice.id.clone();
        self.inner.lock().unwrap().invoices.insert(id, invoice);
    }

    /// Script the outcome of the next webhook delivery.
    ///
    /// The reported invoice's status is reconciled into any stored invoice
    /// with the same ID, and an event of the given kind is emitted for it.
    pub fn set_webhook_result(&self, invoice: Invoice, kind: InvoiceEventKind) {
        self.inner.lock().unwrap().next_webhook_result = Some((invoice, kind));
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: GatewayError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: GatewayError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.inner.lock().unwrap();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .any(|c| c.method == method)
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().call_log.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), GatewayError> {
        let mut state = self.inner.lock().unwrap();

        // Check method-specific error first
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        // Check global error (consumes it)
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }

    fn upsert_reconciled(&self, reported: Invoice) -> Invoice {
        let mut state = self.inner.lock().unwrap();
        let merged = match state.invoices.remove(&reported.id) {
            Some(existing) => existing.reconcile_status(reported.status),
            None => reported,
        };
        state.invoices.insert(merged.id.clone(), merged.clone());
        merged
    }
}

impl Clone for MockGateway {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Wire spelling of a status, for filter comparisons.
fn status_name(status: InvoiceStatus) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn list_invoices(&self, filters: &InvoiceFilters) -> Result<Vec<Invoice>, GatewayError> {
        self.record_call(
            "list_invoices",
            filters
                .params()
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect(),
        );
        self.check_error("list_invoices")?;

        let state = self.inner.lock().unwrap();
        let mut invoices: Vec<Invoice> = state.invoices.values().cloned().collect();

        // A `status` filter is honored; other parameters are accepted and ignored.
        if let Some((_, wanted)) = filters.params().iter().find(|(k, _)| k == "status") {
            invoices.retain(|i| status_name(i.status) == *wanted);
        }

        // Deterministic order for assertions
        invoices.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(invoices)
    }

    async fn get_invoice(&self, id: &str) -> Result<Invoice, GatewayError> {
        self.record_call("get_invoice", vec![id.to_string()]);
        self.check_error("get_invoice")?;

        let state = self.inner.lock().unwrap();
        state
            .invoices
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(&format!("Invoice {}", id)))
    }

    async fn create_invoice(
        &self,
        draft: &InvoiceDraft,
        events: &dyn EventSink,
    ) -> Result<Invoice, GatewayError> {
        self.record_call(
            "create_invoice",
            vec![draft.amount.clone(), draft.currency.key.clone()],
        );
        self.check_error("create_invoice")?;

        let invoice = {
            let mut state = self.inner.lock().unwrap();

            let invoice = match state.next_invoice.take() {
                Some(invoice) => invoice,
                None => {
                    let short_id = uuid::Uuid::new_v4().to_string();
                    let mut invoice = Invoice::new(
                        format!("inv_mock_{}", short_id.split('-').next().unwrap_or_default()),
                        draft.amount.clone(),
                        draft.currency.clone(),
                        InvoiceStatus::Pending,
                        "mock-payment-address",
                        chrono::Utc::now().timestamp() + 60 * 60,
                    )?;
                    if let Some(description) = &draft.description {
                        invoice = invoice.with_description(description);
                    }
                    if let Some(url) = &draft.callback_url {
                        invoice = invoice.with_callback_url(url);
                    }
                    if let Some(url) = &draft.cancel_url {
                        invoice = invoice.with_cancel_url(url);
                    }
                    if let Some(url) = &draft.success_url {
                        invoice = invoice.with_success_url(url);
                    }
                    invoice
                }
            };

            // Store for later retrieval
            state.invoices.insert(invoice.id.clone(), invoice.clone());
            invoice
        };

        events.emit(InvoiceEvent::new(InvoiceEventKind::Created, invoice.clone()));

        Ok(invoice)
    }

    async fn handle_webhook(
        &self,
        request: &WebhookRequest,
        events: &dyn EventSink,
    ) -> Result<Invoice, GatewayError> {
        self.record_call(
            "handle_webhook",
            vec![String::from_utf8_lossy(&request.body).chars().take(50).collect()],
        );
        self.check_error("handle_webhook")?;

        // Check verification mode
        {
            let state = self.inner.lock().unwrap();
            match state.webhook_verify_mode {
                WebhookVerifyMode::AcceptAll => {}
                WebhookVerifyMode::AlwaysFail => {
                    return Err(GatewayError::authentication("Verification disabled"));
                }
            }
        }

        // Scripted outcome wins
        let scripted = self.inner.lock().unwrap().next_webhook_result.take();
        if let Some((reported, kind)) = scripted {
            let merged = self.upsert_reconciled(reported);
            events.emit(InvoiceEvent::new(kind, merged.clone()));
            return Ok(merged);
        }

        // Otherwise accept a raw invoice payload
        let reported: Invoice = serde_json::from_slice(&request.body)
            .map_err(|e| GatewayError::validation(format!("Invalid webhook payload: {}", e)))?;

        Ok(self.upsert_reconciled(reported))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Test Helpers
// ════════════════════════════════════════════════════════════════════════════════

impl MockGateway {
    /// Create a pending BTC invoice with the given ID.
    pub fn pending_invoice(id: &str) -> Invoice {
        Self::invoice_with_status(id, InvoiceStatus::Pending)
    }

    /// Create a BTC invoice with the given ID and status.
    pub fn invoice_with_status(id: &str, status: InvoiceStatus) -> Invoice {
        let currency = CurrencyCatalog::builtin()
            .get("1")
            .cloned()
            .expect("builtin catalog has Bitcoin");
        Invoice::new(
            id,
            "0.25",
            currency,
            status,
            "bc1qmockaddress",
            chrono::Utc::now().timestamp() + 60 * 60,
        )
        .expect("mock invoice fields are valid")
    }
}
