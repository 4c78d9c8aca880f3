//! CoinPayments vocabulary mappers.
//!
//! Every mapper here is total: unknown provider input degrades to a safe
//! default instead of erroring, so a new provider status or coin can never
//! break webhook processing or invoice listing.

use crate::domain::currency::{Currency, CurrencyCatalog};
use crate::domain::invoice::{InvoiceEventKind, InvoiceStatus};

/// Provider currency id -> canonical catalog key.
///
/// Token ids carry the chain id and contract address, plain coins just the
/// chain id.
const CURRENCY_TABLE: &[(&str, &str)] = &[
    ("1", "1"),    // Bitcoin
    ("4", "2"),    // Ethereum
    ("35:0x55d398326f99059ff775485246999027b3197955", "3"), // Tether USD on BSC
    ("9:TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t", "4"),          // Tether USD on TRON
    ("4:0xdac17f958d2ee523a2206206994597c13d831ec7", "5"),  // Tether USD on Ethereum
    ("1002", "t6"), // Litecoin Test
];

/// Maps a provider status string to the canonical lifecycle.
///
/// Provider statuses: draft, scheduled, unpaid, pending, paid, completed,
/// cancelled, timedOut, deleted. Matched case-insensitively; anything
/// unrecognized stays `PENDING` rather than guessing a terminal state.
pub(super) fn map_status(raw: &str) -> InvoiceStatus {
    match raw.to_lowercase().as_str() {
        "draft" | "scheduled" | "unpaid" | "pending" => InvoiceStatus::Pending,
        "paid" => InvoiceStatus::Fulfilled,
        "completed" => InvoiceStatus::Successed,
        "cancelled" | "timedout" | "deleted" => InvoiceStatus::Expired,
        _ => InvoiceStatus::Pending,
    }
}

/// Resolves a provider currency id to a canonical currency.
///
/// Contract-address ids are also tried lowercased, since the provider is
/// inconsistent about hex checksum casing. An unmapped id yields the
/// placeholder currency carrying the raw id as its symbol.
pub(super) fn map_currency_id(raw: &str, catalog: &CurrencyCatalog) -> Currency {
    let key = CURRENCY_TABLE
        .iter()
        .find(|(provider_id, _)| *provider_id == raw)
        .or_else(|| {
            let lowered = raw.to_ascii_lowercase();
            CURRENCY_TABLE
                .iter()
                .find(|(provider_id, _)| *provider_id == lowered)
        })
        .map(|(_, key)| *key);

    match key.and_then(|k| catalog.get(k)) {
        Some(currency) => currency.clone(),
        None => Currency::unknown(raw),
    }
}

/// Reverse lookup: canonical currency -> provider currency id, for creates.
pub(super) fn provider_currency_id(currency: &Currency) -> Option<&'static str> {
    CURRENCY_TABLE
        .iter()
        .find(|(_, key)| *key == currency.key)
        .map(|(provider_id, _)| *provider_id)
}

/// Classifies a webhook event type into a lifecycle event kind.
///
/// Returns `None` for event types we do not act on (`InvoicePending`,
/// `PaymentCreated`, ...); the caller logs and ignores those.
pub(super) fn classify_event(raw: &str) -> Option<InvoiceEventKind> {
    match raw.to_lowercase().as_str() {
        "invoicecreated" | "invoicepaymentcreated" => Some(InvoiceEventKind::Created),
        "invoicepaid" => Some(InvoiceEventKind::Fulfilled),
        "invoicecompleted" => Some(InvoiceEventKind::Completed),
        "invoicecancelled" => Some(InvoiceEventKind::Cancelled),
        "invoicetimedout" | "invoicepaymenttimedout" => Some(InvoiceEventKind::TimedOut),
        _ => None,
    }
}
