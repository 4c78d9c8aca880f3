//! HTTP adapter for inbound provider webhooks.
//!
//! Exposes `POST /webhooks/{provider}`: the delivery is handed to the
//! resolved gateway driver as raw bytes plus the reconstructed request URL,
//! and the driver's result is mapped to the HTTP status taxonomy.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, WebhookAckResponse};
pub use handlers::{handle_provider_webhook, WebhookApiError, WebhookAppState};
pub use routes::{webhook_router, webhook_routes};
