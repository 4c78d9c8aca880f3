//! HTTP handlers for provider webhook endpoints.
//!
//! These handlers connect Axum routes to the gateway drivers resolved through
//! the [`GatewayManager`]. The body is kept as raw bytes and the original
//! request URL is rebuilt from the configured public base, because drivers
//! recompute signatures over exactly what the provider sent.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, OriginalUri, Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;

use crate::application::GatewayManager;
use crate::ports::{EventSink, GatewayError, GatewayErrorCode, WebhookRequest};

use super::dto::{ErrorResponse, WebhookAckResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped
/// dependencies for efficient sharing across handlers.
#[derive(Clone)]
pub struct WebhookAppState {
    pub manager: Arc<GatewayManager>,
    pub events: Arc<dyn EventSink>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handler
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/{provider} - Process a provider webhook delivery.
///
/// Resolves the named driver, hands it the delivery as close to the wire as
/// possible, and acknowledges with the invoice the delivery resolved to.
/// An unknown provider name is a 404; all other failures follow the gateway
/// error taxonomy.
pub async fn handle_provider_webhook(
    State(state): State<WebhookAppState>,
    Path(provider): Path<String>,
    OriginalUri(uri): OriginalUri,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse + std::fmt::Debug, WebhookApiError> {
    // An unregistered provider is a routing miss, not a deployment fault.
    if !state.manager.has_driver(&provider).await {
        return Err(WebhookApiError(GatewayError::not_found(&format!(
            "Payment provider '{}'",
            provider
        ))));
    }

    let driver = state.manager.driver(&provider).await?;

    let url = full_request_url(&state.manager.config().public_base_url, &uri);
    let request = WebhookRequest::new(method, url, headers, body.to_vec());

    let invoice = driver
        .handle_webhook(&request, state.events.as_ref())
        .await?;

    Ok(Json(WebhookAckResponse::success(invoice)))
}

/// Rebuild the absolute URL the provider signed.
///
/// Behind a proxy the request line carries only the path; the externally
/// reachable scheme and host come from configuration.
fn full_request_url(public_base_url: &str, uri: &Uri) -> String {
    if uri.scheme().is_some() {
        return uri.to_string();
    }
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{}{}", public_base_url.trim_end_matches('/'), path_and_query)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts gateway errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(pub GatewayError);

impl From<GatewayError> for WebhookApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0.code {
            // Never 2xx for a failed signature check: the provider must keep
            // retrying a delivery we could not authenticate.
            GatewayErrorCode::Authentication => StatusCode::UNAUTHORIZED,
            GatewayErrorCode::NotFound => StatusCode::NOT_FOUND,
            GatewayErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayErrorCode::Upstream => StatusCode::BAD_GATEWAY,
            GatewayErrorCode::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse::new(self.0.message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::RecordingEventSink;
    use crate::adapters::mock::MockGateway;
    use crate::config::AdapterConfig;
    use crate::domain::invoice::{InvoiceEventKind, InvoiceStatus};

    async fn state_with_mock(mock: MockGateway) -> (WebhookAppState, Arc<RecordingEventSink>) {
        let manager = Arc::new(GatewayManager::new(AdapterConfig::default()));
        manager
            .register("mock", Arc::new(move |_| Ok(Arc::new(mock.clone()))))
            .await;

        let sink = Arc::new(RecordingEventSink::new());
        let state = WebhookAppState {
            manager,
            events: sink.clone(),
        };
        (state, sink)
    }

    fn uri(path: &str) -> Uri {
        path.parse().unwrap()
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Handler Tests (direct invocation)
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn webhook_success_returns_ack_with_invoice() {
        let mock = MockGateway::new();
        mock.set_webhook_result(
            MockGateway::invoice_with_status("inv-1", InvoiceStatus::Successed),
            InvoiceEventKind::Completed,
        );
        let (state, sink) = state_with_mock(mock).await;

        let response = handle_provider_webhook(
            State(state),
            Path("mock".to_string()),
            OriginalUri(uri("/webhooks/mock")),
            Method::POST,
            HeaderMap::new(),
            Bytes::from_static(b"{}"),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["invoice"]["id"], "inv-1");
        assert_eq!(json["invoice"]["status"], "SUCCESSED");

        assert_eq!(sink.events_of_kind(InvoiceEventKind::Completed).len(), 1);
    }

    #[tokio::test]
    async fn unknown_provider_is_404() {
        let (state, sink) = state_with_mock(MockGateway::new()).await;

        let err = handle_provider_webhook(
            State(state),
            Path("paypal".to_string()),
            OriginalUri(uri("/webhooks/paypal")),
            Method::POST,
            HeaderMap::new(),
            Bytes::from_static(b"{}"),
        )
        .await
        .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(sink.event_count(), 0);
    }

    #[tokio::test]
    async fn failed_verification_is_401_and_emits_nothing() {
        let (state, sink) = state_with_mock(MockGateway::rejecting_webhooks()).await;

        let err = handle_provider_webhook(
            State(state),
            Path("mock".to_string()),
            OriginalUri(uri("/webhooks/mock")),
            Method::POST,
            HeaderMap::new(),
            Bytes::from_static(b"{}"),
        )
        .await
        .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(sink.event_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn error_status_mapping() {
        let cases = [
            (GatewayError::authentication("bad sig"), StatusCode::UNAUTHORIZED),
            (GatewayError::not_found("Invoice x"), StatusCode::NOT_FOUND),
            (
                GatewayError::validation("bad currency"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (GatewayError::upstream("down"), StatusCode::BAD_GATEWAY),
            (
                GatewayError::configuration("no secret"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = WebhookApiError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn error_body_carries_message() {
        let response =
            WebhookApiError(GatewayError::authentication("Invalid webhook signature"))
                .into_response();

        let json = response_json(response).await;
        assert_eq!(json["error"], "Invalid webhook signature");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // URL Reconstruction Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn url_joins_base_and_path() {
        let url = full_request_url("https://pay.example.com", &uri("/webhooks/coinpayments"));
        assert_eq!(url, "https://pay.example.com/webhooks/coinpayments");
    }

    #[test]
    fn url_keeps_query_string() {
        let url = full_request_url(
            "https://pay.example.com/",
            &uri("/webhooks/coinpayments?attempt=2"),
        );
        assert_eq!(url, "https://pay.example.com/webhooks/coinpayments?attempt=2");
    }

    #[test]
    fn absolute_uri_wins_over_base() {
        let absolute: Uri = "https://direct.example.com/webhooks/cpg".parse().unwrap();
        let url = full_request_url("https://pay.example.com", &absolute);
        assert_eq!(url, "https://direct.example.com/webhooks/cpg");
    }
}
