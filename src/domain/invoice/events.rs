//! Events describing invoice lifecycle changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::invoice::Invoice;

/// What happened to an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceEventKind {
    /// A new invoice was opened with the provider.
    Created,

    /// The full invoiced amount has been received.
    Fulfilled,

    /// The payment settled; the invoice reached its success state.
    Completed,

    /// The payer or provider cancelled the invoice.
    Cancelled,

    /// The invoice expired before full payment arrived.
    TimedOut,
}

impl InvoiceEventKind {
    /// Dotted event name used in logs and outbound notifications.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceEventKind::Created => "invoice.created",
            InvoiceEventKind::Fulfilled => "invoice.fulfilled",
            InvoiceEventKind::Completed => "invoice.completed",
            InvoiceEventKind::Cancelled => "invoice.cancelled",
            InvoiceEventKind::TimedOut => "invoice.timed_out",
        }
    }
}

/// An invoice lifecycle event, carrying the invoice snapshot that produced it.
///
/// `provider_event_id` is the provider's own identifier for the webhook
/// delivery, when one exists; it lets consumers deduplicate redeliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceEvent {
    pub id: Uuid,
    pub kind: InvoiceEventKind,
    pub invoice: Invoice,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_event_id: Option<String>,

    pub occurred_at: DateTime<Utc>,
}

impl InvoiceEvent {
    pub fn new(kind: InvoiceEventKind, invoice: Invoice) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            invoice,
            provider_event_id: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_provider_event_id(mut self, provider_event_id: impl Into<String>) -> Self {
        self.provider_event_id = Some(provider_event_id.into());
        self
    }
}
