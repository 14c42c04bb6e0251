use super::AppState;
use super::request_id::RequestId;
use crate::error::QueueError;
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{Local, SecondsFormat, Utc};

/// GET /health
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "env": state.env,
        "tz": state.tz,
        "now_utc": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "now_local": Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        "queue_size": state.queue.size(),
    }))
}

/// POST /run-now: queue one pipeline execution and return immediately.
pub(super) async fn handle_run_now(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
) -> impl IntoResponse {
    match state.queue.enqueue(Some(request_id)) {
        Ok(job_id) => (
            StatusCode::OK,
            Json(serde_json::json!({ "queued": true, "job_id": job_id })),
        ),
        Err(err @ QueueError::Full { .. }) => {
            tracing::warn!(error = %err, "run-now rejected");
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({ "queued": false, "error": err.to_string() })),
            )
        }
        Err(err @ QueueError::Closed) => {
            tracing::error!(error = %err, "run-now rejected");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "queued": false, "error": err.to_string() })),
            )
        }
    }
}
