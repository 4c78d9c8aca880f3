//! Axum router configuration for provider webhook endpoints.
//!
//! Webhook routes carry no user authentication; deliveries are verified by
//! the resolved driver through the provider's signature scheme.

use axum::{routing::post, Router};

use super::handlers::{handle_provider_webhook, WebhookAppState};

/// Create the webhook API router.
///
/// # Routes
/// - `POST /{provider}` - Process a webhook delivery for the named provider
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/:provider", post(handle_provider_webhook))
}

/// Create the complete webhook module router.
///
/// # Example
///
/// ```ignore
/// use coinbridge::adapters::http::webhooks::{webhook_router, WebhookAppState};
///
/// let state = WebhookAppState { manager, events };
/// let app = webhook_router().with_state(state);
/// // POST https://pay.example.com/webhooks/coinpayments
/// ```
pub fn webhook_router() -> Router<WebhookAppState> {
    Router::new().nest("/webhooks", webhook_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::events::RecordingEventSink;
    use crate::application::GatewayManager;
    use crate::config::AdapterConfig;

    fn test_state() -> WebhookAppState {
        WebhookAppState {
            manager: Arc::new(GatewayManager::new(AdapterConfig::default())),
            events: Arc::new(RecordingEventSink::new()),
        }
    }

    #[test]
    fn routers_build_with_state() {
        let _routes: Router = webhook_routes().with_state(test_state());
        let _router: Router = webhook_router().with_state(test_state());
    }
}
