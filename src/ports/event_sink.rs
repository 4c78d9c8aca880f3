//! Event sink port for invoice lifecycle notifications.
//!
//! Drivers emit [`InvoiceEvent`]s through this port whenever an invoice is
//! created or changes state. What happens to the events, capture in tests,
//! forwarding to a queue, fan-out to subscribers, is the adapter's concern.

use crate::domain::invoice::InvoiceEvent;

/// Port for receiving invoice lifecycle events.
///
/// Emission is fire-and-forget: a sink must not fail the operation that
/// produced the event. Implementations that deliver somewhere unreliable
/// should log and swallow their own errors.
pub trait EventSink: Send + Sync {
    /// Delivers one event to the sink.
    fn emit(&self, event: InvoiceEvent);
}
