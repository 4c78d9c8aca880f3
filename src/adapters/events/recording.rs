//! Recording event sink for testing.
//!
//! Captures emitted invoice events for synchronous assertions.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on lock operations which will panic if locks are poisoned.
//! Production code should use `ChannelEventSink` or an application-provided sink.

use std::sync::RwLock;

use crate::domain::invoice::{InvoiceEvent, InvoiceEventKind};
use crate::ports::EventSink;

/// Event sink that records every emitted event.
///
/// Features:
/// - Synchronous capture (deterministic for tests)
/// - Filtering by event kind for assertions
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
///
/// # Example
///
/// ```ignore
/// let sink = RecordingEventSink::new();
/// driver.create_invoice(&draft, &sink).await?;
///
/// assert_eq!(sink.event_count(), 1);
/// assert!(sink.has_event(InvoiceEventKind::Created));
/// ```
pub struct RecordingEventSink {
    recorded: RwLock<Vec<InvoiceEvent>>,
}

impl RecordingEventSink {
    /// Creates a new empty sink.
    pub fn new() -> Self {
        Self {
            recorded: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// Returns all recorded events (for test assertions).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn events(&self) -> Vec<InvoiceEvent> {
        self.recorded
            .read()
            .expect("RecordingEventSink: lock poisoned")
            .clone()
    }

    /// Returns events of a specific kind.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn events_of_kind(&self, kind: InvoiceEventKind) -> Vec<InvoiceEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect()
    }

    /// Returns count of recorded events.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn event_count(&self) -> usize {
        self.recorded
            .read()
            .expect("RecordingEventSink: lock poisoned")
            .len()
    }

    /// Checks if an event of the given kind was recorded.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn has_event(&self, kind: InvoiceEventKind) -> bool {
        self.recorded
            .read()
            .expect("RecordingEventSink: lock poisoned")
            .iter()
            .any(|e| e.kind == kind)
    }

    /// Clears all recorded events (for test isolation).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.recorded
            .write()
            .expect("RecordingEventSink: write lock poisoned")
            .clear();
    }
}

impl Default for RecordingEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: InvoiceEvent) {
        self.recorded
            .write()
            .expect("RecordingEventSink: write lock poisoned")
            .push(event);
    }
}
