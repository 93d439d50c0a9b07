//! Router setup and configuration

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{self as tower_trace, TraceLayer};

use crate::api::handlers;
use crate::api::state::AppState;

/// Create the API router
///
/// JSON endpoints plus the two static pages; anything else under the static
/// directory is served as a file.
pub fn create_router(state: Arc<AppState>) -> Router {
    let index_page = ServeFile::new(state.static_dir.join("index.html"));
    let pos_page = ServeFile::new(state.static_dir.join("pos.html"));
    let assets = ServeDir::new(&state.static_dir);

    let logging_layer = TraceLayer::new_for_http()
        .on_request(tower_trace::DefaultOnRequest::new().level(tracing::Level::DEBUG))
        .on_response(
            tower_trace::DefaultOnResponse::new()
                .level(tracing::Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Millis),
        )
        .on_failure(
            tower_trace::DefaultOnFailure::new()
                .latency_unit(tower_http::LatencyUnit::Millis)
                .level(tracing::Level::ERROR),
        );

    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health_check))
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        .route("/process-on-reader", post(handlers::process_on_reader))
        .route("/cancel-payment", post(handlers::cancel_payment))
        .route("/webhook", post(handlers::webhook))
        .route_service("/", index_page)
        .route_service("/pos", pos_page)
        .fallback_service(assets)
        .layer(CorsLayer::permissive())
        .layer(logging_layer)
        .with_state(state)
}
