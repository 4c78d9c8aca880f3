//! Event sink adapters.
//!
//! Adapters implement the event sink port for different environments:
//!
//! - `RecordingEventSink` - Synchronous, in-process capture for testing
//! - `ChannelEventSink` - Forwards events onto a tokio channel for async consumers

mod channel;
mod recording;

pub use channel::ChannelEventSink;
pub use recording::RecordingEventSink;
