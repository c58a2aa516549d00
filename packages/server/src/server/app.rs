//! Application setup and router configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{health_handler, metrics_handler, status_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the Axum application router
///
/// The same `ServerDeps` drives the scheduler, so `/metrics` and `/status`
/// observe the passes it runs.
pub fn build_app(deps: Arc<ServerDeps>, request_timeout: Duration) -> Router {
    let state = AppState { deps };

    Router::new()
        .route("/health", get(health_handler).options(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/status", get(status_handler))
        .fallback(not_found)
        .layer(Extension(state))
        .layer(request_timeout_layer(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Answers 408 when a request runs past `request_timeout`.
fn request_timeout_layer(request_timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "not found" })),
    )
}
