//! Request-side authentication types
//!
//! The session gate in `middleware` resolves the presented cookie into a
//! [`CurrentUser`] and stores it in the request extensions; handlers pull
//! it back out with the extractor below.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Serialize;
use serde_json::json;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "sid";

/// The authenticated principal of the current request
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub principal_id: String,
    pub role_code: u8,
}

/// Rejection for requests that carry no session cookie at all
#[derive(Debug)]
pub struct LoginRequired;

impl IntoResponse for LoginRequired {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "login_required",
                "message": "No session cookie presented"
            })),
        )
            .into_response()
    }
}

/// Rejection for cookies whose session is expired or revoked
#[derive(Debug)]
pub struct SessionExpired;

impl IntoResponse for SessionExpired {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "session_expired",
                "message": "Session expired or revoked, log in again"
            })),
        )
            .into_response()
    }
}

/// Rejection for authenticated requests lacking the required capability
#[derive(Debug)]
pub struct PermissionDenied {
    pub capability: String,
    pub principal_id: String,
}

impl IntoResponse for PermissionDenied {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "permission_denied",
                "capability": self.capability,
                "principal_id": self.principal_id
            })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = LoginRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(LoginRequired)
    }
}

/// Build the session cookie carrying `token`
pub fn session_cookie(token: String, max_age_secs: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::seconds(max_age_secs));
    cookie
}

/// Build an expired cookie that removes the session cookie client-side
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}
