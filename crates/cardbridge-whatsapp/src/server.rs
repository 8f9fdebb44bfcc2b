// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook receiver for sidecar events, built on axum.
//!
//! Routes:
//! - `POST /events`: signed sidecar events; messages are queued for the engine
//! - `GET /health`: liveness probe

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cardbridge_core::{BridgeError, InboundMessage};

use crate::signature::{verify_signature, SIGNATURE_HEADER};
use crate::types::SidecarEvent;

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct WebhookState {
    pub inbound_tx: mpsc::Sender<InboundMessage>,
    /// HMAC key; `None` accepts unsigned bodies.
    pub secret: Option<Arc<str>>,
    /// The bridge account's own address.
    pub own_jid: Option<Arc<str>>,
}

/// Build the webhook router.
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/events", post(handle_event))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

/// Bind `host:port` and serve until `cancel` fires.
pub async fn start_server(
    host: &str,
    port: u16,
    state: WebhookState,
    cancel: CancellationToken,
) -> Result<(), BridgeError> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BridgeError::Transport {
            message: format!("failed to bind webhook receiver to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;
    info!(addr = %addr, "webhook receiver listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| BridgeError::Transport {
            message: format!("webhook receiver error: {e}"),
            source: Some(Box::new(e)),
        })
}

async fn handle_event(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(secret) = &state.secret {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !verify_signature(&body, signature, secret) {
            warn!("rejected webhook with bad or missing signature");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let event: SidecarEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "malformed webhook body");
            return StatusCode::BAD_REQUEST;
        }
    };

    match event {
        SidecarEvent::Message(event) => {
            let msg = event.into_inbound(state.own_jid.as_deref());
            debug!(id = %msg.id, chat = %msg.chat, kind = msg.payload.kind(), "message event received");
            match state.inbound_tx.try_send(msg) {
                Ok(()) => StatusCode::ACCEPTED,
                Err(TrySendError::Full(msg)) => {
                    warn!(id = %msg.id, "inbound queue full, asking sidecar to retry");
                    StatusCode::SERVICE_UNAVAILABLE
                }
                Err(TrySendError::Closed(_)) => StatusCode::SERVICE_UNAVAILABLE,
            }
        }
        SidecarEvent::Connected => {
            info!("sidecar connected to WhatsApp");
            StatusCode::NO_CONTENT
        }
        SidecarEvent::Disconnected { reason } => {
            warn!(reason = reason.as_deref().unwrap_or("unknown"), "sidecar disconnected from WhatsApp");
            StatusCode::NO_CONTENT
        }
        SidecarEvent::Unknown => StatusCode::NO_CONTENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::signature::sign;

    const TEXT_EVENT: &str = r#"{"type":"message","id":"m1","chat":"1@s.whatsapp.net","sender":"1@s.whatsapp.net","timestamp":0,"message":{"conversation":"hi"}}"#;

    fn state(capacity: usize, secret: Option<&str>) -> (WebhookState, mpsc::Receiver<InboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            WebhookState {
                inbound_tx: tx,
                secret: secret.map(Arc::from),
                own_jid: None,
            },
            rx,
        )
    }

    fn post_event(body: &str, signature: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/events");
        if let Some(sig) = signature {
            builder = builder.header(SIGNATURE_HEADER, sig);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn unsigned_event_is_queued_without_secret() {
        let (state, mut rx) = state(4, None);
        let response = router(state).oneshot(post_event(TEXT_EVENT, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.id.0, "m1");
    }

    #[tokio::test]
    async fn signature_is_enforced_when_configured() {
        let (state, mut rx) = state(4, Some("secret"));
        let app = router(state);

        let response = app.clone().oneshot(post_event(TEXT_EVENT, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let sig = format!("sha256={}", sign(TEXT_EVENT.as_bytes(), "secret"));
        let response = app.oneshot(post_event(TEXT_EVENT, Some(sig))).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn full_queue_answers_503() {
        let (state, _rx) = state(1, None);
        let app = router(state);
        let first = app.clone().oneshot(post_event(TEXT_EVENT, None)).await.unwrap();
        assert_eq!(first.status(), StatusCode::ACCEPTED);
        let second = app.oneshot(post_event(TEXT_EVENT, None)).await.unwrap();
        assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let (state, _rx) = state(1, None);
        let response = router(state).oneshot(post_event("{not json", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn status_events_are_acknowledged() {
        let (state, mut rx) = state(1, None);
        let response = router(state)
            .oneshot(post_event(r#"{"type":"connected"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn health_route_answers() {
        let (state, _rx) = state(1, None);
        let response = router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
