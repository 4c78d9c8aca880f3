//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Gateway Ports
//!
//! - `PaymentGateway` - Port for cryptocurrency payment provider drivers
//! - `InvoiceFilters` / `WebhookRequest` - Inputs carried across the port
//! - `GatewayError` - Error contract shared by every driver
//!
//! ## Event Ports
//!
//! - `EventSink` - Port for receiving invoice lifecycle events

mod event_sink;
mod gateway;

pub use event_sink::EventSink;
pub use gateway::{
    GatewayError, GatewayErrorCode, InvoiceFilters, PaymentGateway, WebhookRequest,
};
