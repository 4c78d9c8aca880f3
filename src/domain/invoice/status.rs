//! Canonical invoice status lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Canonical invoice status.
///
/// Every provider vocabulary is mapped into these five values. The lifecycle
/// is strictly forward-moving: an invoice accumulates payment until it is
/// settled or runs out of time, and the two end states are terminal.
///
/// ```text
/// PENDING -> PARTIAL_FULFILLED -> FULFILLED -> SUCCESSED
/// PENDING -> EXPIRED
/// PARTIAL_FULFILLED -> EXPIRED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Awaiting payment; no funds received yet.
    Pending,

    /// Some funds received, but less than the invoiced amount.
    PartialFulfilled,

    /// The full amount has been received.
    Fulfilled,

    /// The provider has settled the payment; terminal.
    Successed,

    /// The invoice timed out or was cancelled before full payment; terminal.
    Expired,
}

impl StateMachine for InvoiceStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            // From PENDING
            (InvoiceStatus::Pending, InvoiceStatus::PartialFulfilled)
                | (InvoiceStatus::Pending, InvoiceStatus::Fulfilled)
                | (InvoiceStatus::Pending, InvoiceStatus::Successed)
                | (InvoiceStatus::Pending, InvoiceStatus::Expired)
                // From PARTIAL_FULFILLED
                | (InvoiceStatus::PartialFulfilled, InvoiceStatus::Fulfilled)
                | (InvoiceStatus::PartialFulfilled, InvoiceStatus::Successed)
                | (InvoiceStatus::PartialFulfilled, InvoiceStatus::Expired)
                // From FULFILLED
                | (InvoiceStatus::Fulfilled, InvoiceStatus::Successed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            InvoiceStatus::Pending => vec![
                InvoiceStatus::PartialFulfilled,
                InvoiceStatus::Fulfilled,
                InvoiceStatus::Successed,
                InvoiceStatus::Expired,
            ],
            InvoiceStatus::PartialFulfilled => vec![
                InvoiceStatus::Fulfilled,
                InvoiceStatus::Successed,
                InvoiceStatus::Expired,
            ],
            InvoiceStatus::Fulfilled => vec![InvoiceStatus::Successed],
            InvoiceStatus::Successed => vec![],
            InvoiceStatus::Expired => vec![],
        }
    }
}
