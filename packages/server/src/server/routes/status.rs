use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::server::app::AppState;

/// Report of the most recent completed sync pass
///
/// Answers 503 until the first pass has finished.
pub async fn status_handler(Extension(state): Extension<AppState>) -> Response {
    match state.deps.reports.latest().await {
        Some(report) => Json(report).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "no sync pass has completed yet" })),
        )
            .into_response(),
    }
}
