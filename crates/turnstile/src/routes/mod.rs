//! HTTP route handlers for Turnstile.

use std::time::Duration;

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use gatehouse_common::GatehouseError;
use gatehouse_common::constants::headers::X_SESSION_TOKEN;

use crate::state::AppState;

mod download;
mod health;
mod otp;
mod terms;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & status
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/metrics", get(health::metrics))
        // Gate flow
        .route("/terms/accept", post(terms::accept_terms))
        .route("/otp/request", post(otp::request_code))
        .route("/otp/verify", post(otp::verify_code))
        .route("/download/file", get(download::fetch_artifact))
        .route("/session/reset", post(download::reset_session))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        // Shared state
        .with_state(state)
}

/// JSON error body shared by every handler
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_remaining: Option<u32>,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

/// Map a component error onto its HTTP response
pub fn error_response(err: GatehouseError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
            attempts_remaining: None,
        }),
    )
}

/// Current wall clock as Unix epoch seconds
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Pull the session bearer token out of the request headers
pub fn session_token(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(X_SESSION_TOKEN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| error_response(GatehouseError::Session("missing session token".to_string())))
}
