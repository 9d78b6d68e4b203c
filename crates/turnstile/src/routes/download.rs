//! Artifact download and session teardown.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::Response,
};
use serde::Serialize;

use gatehouse_common::GatehouseError;

use crate::state::AppState;

use super::{ApiError, error_response, session_token, unix_now};

/// Serve the artifact to a session holding a download grant.
///
/// The grant is consumed up front; one verification buys exactly one
/// fetch.
pub async fn fetch_artifact(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let now = unix_now();
    let token = session_token(&headers)?;

    if !state.sessions.take_download_grant(&token, now).await {
        return Err(error_response(GatehouseError::Session(
            "verify your email before downloading".to_string(),
        )));
    }

    let artifact = &state.config.artifact;
    let bytes = match tokio::fs::read(&artifact.path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(path = %artifact.path, error = %err, "artifact unreadable");
            // Nothing was served; hand the grant back
            state.sessions.grant_download(&token, now).await;
            return Err(error_response(GatehouseError::Internal(
                "the artifact is currently unavailable".to_string(),
            )));
        }
    };

    tracing::info!(file = %artifact.file_name, size = bytes.len(), "artifact served");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        )
        .body(Body::from(bytes))
        .map_err(|err| {
            error_response(GatehouseError::Internal(format!(
                "response build failed: {err}"
            )))
        })
}

#[derive(Serialize)]
pub struct ResetResponse {
    reset: bool,
}

/// Discard the session; the caller starts over at the terms step
pub async fn reset_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ResetResponse>, ApiError> {
    let token = session_token(&headers)?;
    state.sessions.remove(&token).await;
    tracing::debug!("session reset");

    Ok(Json(ResetResponse { reset: true }))
}
