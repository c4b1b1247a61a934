//! Auth Routes
//!
//! Login issues the session cookie; logout clears it. Tokens themselves
//! cannot be revoked before expiry, so logout is purely cookie removal on
//! the client side.

use axum::{extract::State, http::header, response::IntoResponse, Json};
use chrono::Duration;
use std::sync::Arc;

use crate::api::dto::{LoginRequest, LoginResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::{clear_session_cookie, session_cookie};

/// POST /api/login
///
/// Checks the credentials against the single configured operator and, on
/// match, issues the session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = &state.config.auth;

    if req.username != auth.username || req.password != auth.password {
        tracing::info!(username = %req.username, "login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .tokens
        .issue(&req.username, Duration::hours(auth.session_ttl_hours));
    let cookie = session_cookie(&auth.cookie_name, &token, auth.session_ttl_hours * 3600);

    tracing::info!(username = %req.username, "operator logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            status: "ok".to_string(),
            identity: req.username,
        }),
    ))
}

/// POST /api/logout
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cookie = clear_session_cookie(&state.config.auth.cookie_name);
    (
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "status": "ok" })),
    )
}
