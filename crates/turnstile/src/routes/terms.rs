//! Terms-of-use acceptance endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use gatehouse_common::GatehouseError;

use crate::state::AppState;

use super::{ApiError, error_response, unix_now};

#[derive(Deserialize)]
pub struct AcceptRequest {
    /// Must be true; there is no gate without consent
    accepted: bool,
}

#[derive(Serialize)]
pub struct AcceptResponse {
    session_token: String,
    expires_in_secs: u64,
}

/// Open a session for a caller who accepted the terms
pub async fn accept_terms(
    State(state): State<AppState>,
    Json(payload): Json<AcceptRequest>,
) -> Result<Json<AcceptResponse>, ApiError> {
    if !payload.accepted {
        return Err(error_response(GatehouseError::InvalidInput(
            "you must agree to the terms to continue".to_string(),
        )));
    }

    let token = state.sessions.open(unix_now()).await;
    tracing::debug!("terms accepted, session opened");

    Ok(Json(AcceptResponse {
        session_token: token,
        expires_in_secs: state.config.session.ttl_secs,
    }))
}
