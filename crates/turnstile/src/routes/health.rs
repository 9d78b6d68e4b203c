//! Health check endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use gatehouse_common::MetricsSnapshot;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check (is the server running?)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ReadyResponse {
    status: &'static str,
    artifact: bool,
}

/// Readiness check (can we actually serve the artifact?)
pub async fn ready_check(
    State(state): State<AppState>,
) -> Result<Json<ReadyResponse>, StatusCode> {
    let artifact_ok = tokio::fs::metadata(&state.config.artifact.path).await.is_ok();

    if artifact_ok {
        Ok(Json(ReadyResponse {
            status: "ready",
            artifact: true,
        }))
    } else {
        // Return 503 if the gated file is missing
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// Metrics endpoint (for monitoring)
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(MetricsSnapshot {
        active_challenges: state.store.len().await as u64,
        active_sessions: state.sessions.len().await as u64,
    })
}
