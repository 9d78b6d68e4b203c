//! Code issuance and verification endpoints.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};

use gatehouse_common::{GatehouseError, VerifyOutcome};

use crate::otp::normalize_email;
use crate::state::AppState;

use super::{ApiError, ErrorBody, error_response, session_token, unix_now};

#[derive(Deserialize)]
pub struct RequestCodeRequest {
    email: String,
}

#[derive(Serialize)]
pub struct RequestCodeResponse {
    sent: bool,
    expires_in_secs: u64,
    requests_remaining: u32,
}

/// Issue a code and mail it to the caller
pub async fn request_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RequestCodeRequest>,
) -> Result<Json<RequestCodeResponse>, ApiError> {
    let now = unix_now();
    let token = session_token(&headers)?;
    if !state.sessions.is_open(&token, now).await {
        return Err(error_response(GatehouseError::Session(
            "no open session; accept the terms first".to_string(),
        )));
    }

    let email = normalize_email(&payload.email);
    if email.is_empty() || !email.contains('@') {
        return Err(error_response(GatehouseError::InvalidInput(
            "please enter a valid email address".to_string(),
        )));
    }

    let code = state.generator.generate();
    let record = state
        .store
        .issue(&email, &code, now, state.config.otp.expiry_secs)
        .await
        .map_err(error_response)?;

    // The store lock is long gone by the time delivery starts.
    if let Err(err) = state
        .notifier
        .deliver(&email, &code, state.config.otp.expiry_secs)
        .await
    {
        tracing::error!(email = %email, error = %err, "delivery failed, rolling back challenge");
        state.store.remove(&email).await;
        return Err(error_response(GatehouseError::Delivery(
            "failed to send the code; try again later".to_string(),
        )));
    }

    state.sessions.bind_email(&token, &email, now).await;

    tracing::info!(
        email = %email,
        request_count = record.request_count,
        "code issued and dispatched"
    );

    Ok(Json(RequestCodeResponse {
        sent: true,
        expires_in_secs: state.config.otp.expiry_secs,
        requests_remaining: state.config.otp.request_limit - record.request_count,
    }))
}

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    code: String,
}

#[derive(Serialize)]
pub struct VerifyCodeResponse {
    verified: bool,
}

/// Verify a submitted code against the session's pending address
pub async fn verify_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, ApiError> {
    let now = unix_now();
    let token = session_token(&headers)?;
    let Some(email) = state.sessions.pending_email(&token, now).await else {
        return Err(error_response(GatehouseError::Session(
            "no code request in progress for this session".to_string(),
        )));
    };

    let outcome = state.verifier.verify(&email, payload.code.trim(), now).await;
    tracing::info!(email = %email, outcome = outcome.as_str(), "verification attempt");

    match outcome {
        VerifyOutcome::Success => {
            state.sessions.grant_download(&token, now).await;
            Ok(Json(VerifyCodeResponse { verified: true }))
        }
        VerifyOutcome::NotFound => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "no active code for this address; request a new one".to_string(),
                attempts_remaining: None,
            }),
        )),
        VerifyOutcome::Invalid { attempts_remaining } => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: format!(
                    "invalid code, {attempts_remaining} attempts left before invalidation"
                ),
                attempts_remaining: Some(attempts_remaining),
            }),
        )),
        VerifyOutcome::AttemptsExhausted => Err((
            StatusCode::GONE,
            Json(ErrorBody {
                error: "too many invalid attempts; the code was invalidated, request a new one"
                    .to_string(),
                attempts_remaining: Some(0),
            }),
        )),
    }
}
