//! Liveness and webhook handlers

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};

use crate::api::dto::{HealthResponse, PingResponse, WebhookAck};
use crate::api::state::AppState;

/// GET /ping
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong".to_string(),
    })
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        reader_id: state.payments.reader_id().to_string(),
        reader_busy: state.payments.reader_busy(),
    })
}

/// POST /webhook
///
/// Acknowledges every payload. Signatures are not verified and no state
/// changes; the event type is logged when the body is JSON.
pub async fn webhook(body: Bytes) -> Json<WebhookAck> {
    let event_type = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string));

    match event_type {
        Some(event_type) => {
            tracing::info!(event_type = %event_type, bytes = body.len(), "Webhook received")
        }
        None => tracing::info!(bytes = body.len(), "Webhook received (unparsed body)"),
    }

    Json(WebhookAck { received: true })
}
