//! CPG vocabulary mappers. Total functions, like every provider mapper.

use crate::domain::invoice::{InvoiceEventKind, InvoiceStatus};

/// Maps a CPG status string to the canonical lifecycle.
///
/// CPG statuses: new, pending, confirming, partially_paid, paid, completed,
/// expired, cancelled, failed. Matched case-insensitively; anything
/// unrecognized stays `PENDING`.
pub(super) fn map_status(raw: &str) -> InvoiceStatus {
    match raw.to_lowercase().as_str() {
        "new" | "pending" | "confirming" => InvoiceStatus::Pending,
        "partially_paid" => InvoiceStatus::PartialFulfilled,
        "paid" => InvoiceStatus::Fulfilled,
        "completed" => InvoiceStatus::Successed,
        "expired" | "cancelled" | "failed" => InvoiceStatus::Expired,
        _ => InvoiceStatus::Pending,
    }
}

/// Classifies a webhook event type into a lifecycle event kind.
///
/// `payment.partially_paid` is deliberately unclassified: partial payment
/// changes the invoice status but is not a lifecycle event.
pub(super) fn classify_event(raw: &str) -> Option<InvoiceEventKind> {
    match raw.to_lowercase().as_str() {
        "payment.created" => Some(InvoiceEventKind::Created),
        "payment.paid" => Some(InvoiceEventKind::Fulfilled),
        "payment.completed" => Some(InvoiceEventKind::Completed),
        "payment.cancelled" => Some(InvoiceEventKind::Cancelled),
        "payment.expired" => Some(InvoiceEventKind::TimedOut),
        _ => None,
    }
}
