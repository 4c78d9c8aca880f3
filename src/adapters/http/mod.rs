//! HTTP adapters - inbound REST surface.
//!
//! The only HTTP surface this crate ships is the provider webhook endpoint;
//! merchant-facing invoice routes belong to the hosting application, which
//! calls the gateway port directly.

pub mod webhooks;

// Re-export key types for convenience
pub use webhooks::webhook_router;
pub use webhooks::WebhookAppState;
