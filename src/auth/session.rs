//! Auth Gate
//!
//! Request-level session enforcement built on the token codec. Handlers
//! take an [`AuthSession`] parameter to require a valid session cookie;
//! the rejection path differs only in presentation: browser callers are
//! redirected to the login page, programmatic callers get a structured
//! `unauthorized` error. Both reject identically at the codec level.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::api::{ApiError, AppState};

/// Verified session attached to a request
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Identity carried by the session token
    pub identity: String,
}

/// Access-denied outcome, shaped by caller type
#[derive(Debug)]
pub enum AuthRejection {
    /// Browser-style caller: redirect to the login page
    Browser { login_path: String },
    /// Programmatic caller: structured unauthorized error
    Api,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Browser { login_path } => Redirect::to(&login_path).into_response(),
            AuthRejection::Api => ApiError::Unauthorized.into_response(),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthSession {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let claims = jar
            .get(&state.config.auth.cookie_name)
            .and_then(|cookie| state.tokens.verify(cookie.value()).ok());

        match claims {
            Some(claims) => Ok(AuthSession {
                identity: claims.identity,
            }),
            None if wants_html(&parts.headers) => Err(AuthRejection::Browser {
                login_path: state.config.auth.login_path.clone(),
            }),
            None => Err(AuthRejection::Api),
        }
    }
}

/// Browser requests advertise `text/html` in their Accept header;
/// programmatic callers do not.
fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false)
}

/// Set-Cookie value for a freshly issued session token.
/// HTTP-only, secure-transport-only, same-site-lax, rooted at `/`, with a
/// lifetime matching the token TTL.
pub fn session_cookie(name: &str, token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=Lax",
        name, token, max_age_secs
    )
}

/// Set-Cookie value that clears the session cookie
pub fn clear_session_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=Lax", name)
}
