//! Channel-backed event sink.
//!
//! Forwards invoice events onto a tokio mpsc channel so an application task
//! can consume them (deliver merchant callbacks, persist, fan out) without
//! blocking the gateway driver that emitted them.

use tokio::sync::mpsc::UnboundedSender;

use crate::domain::invoice::InvoiceEvent;
use crate::ports::EventSink;

/// Event sink that forwards events to an unbounded tokio channel.
///
/// Emission never blocks. If the receiving half has been dropped the event
/// is logged and discarded; drivers are not expected to care whether anyone
/// is listening.
///
/// # Example
///
/// ```ignore
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
/// let sink = ChannelEventSink::new(tx);
///
/// tokio::spawn(async move {
///     while let Some(event) = rx.recv().await {
///         deliver_callback(event).await;
///     }
/// });
/// ```
pub struct ChannelEventSink {
    sender: UnboundedSender<InvoiceEvent>,
}

impl ChannelEventSink {
    /// Creates a sink that forwards onto the given channel.
    pub fn new(sender: UnboundedSender<InvoiceEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: InvoiceEvent) {
        if let Err(e) = self.sender.send(event) {
            tracing::warn!(
                invoice_id = %e.0.invoice.id,
                kind = ?e.0.kind,
                "Dropping invoice event: receiver is gone"
            );
        }
    }
}
