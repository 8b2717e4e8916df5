//! Session gate and capability enforcement
//!
//! Every protected route passes through [`session_gate`], which resolves
//! the presented cookie, rotates the session token, and injects the
//! [`CurrentUser`] extension. Capability checks run after the gate and
//! read that extension.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use orgledger_auth::{capabilities_for, Capability, SessionRecord};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::auth::{
    session_cookie, CurrentUser, LoginRequired, PermissionDenied, SessionExpired, SESSION_COOKIE,
};
use crate::state::AppState;

/// Authenticate the request and rotate its session token.
///
/// The presented token is consumed whether or not the request succeeds
/// downstream; the replacement token travels back on the response cookie.
pub async fn session_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return LoginRequired.into_response();
    };
    let presented = cookie.value().to_string();

    let Some(record) = state.sessions.get(&presented) else {
        debug!("Rejected expired or unknown session token");
        return SessionExpired.into_response();
    };

    let fresh = match state.tokens.mint(&state.sessions) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to mint replacement session token: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "session_mint_failed" })),
            )
                .into_response();
        }
    };

    // Rotate: retire the presented token, reissue under the fresh one
    // with a renewed lifetime.
    state.sessions.delete(&presented);
    let expires_at = Utc::now() + Duration::seconds(state.config.session_ttl_secs);
    state.sessions.set(
        fresh.clone(),
        SessionRecord::new(record.principal_id.clone(), expires_at),
    );

    // The account may have been deleted while the session was live.
    let Some(role_code) = state.directory.lookup_role(&record.principal_id) else {
        warn!(
            "Principal {} no longer exists, revoking session",
            record.principal_id
        );
        state.sessions.revoke_principal(&record.principal_id);
        return SessionExpired.into_response();
    };

    request.extensions_mut().insert(CurrentUser {
        principal_id: record.principal_id,
        role_code,
    });

    let response = next.run(request).await;
    let jar = jar.add(session_cookie(fresh, state.config.cookie_max_age_secs));
    (jar, response).into_response()
}

/// Deny the request unless the current principal holds `capability`
pub async fn enforce_capability(capability: Capability, request: Request, next: Next) -> Response {
    let Some(user) = request.extensions().get::<CurrentUser>().cloned() else {
        return LoginRequired.into_response();
    };

    match capabilities_for(user.role_code) {
        Some(set) if set.contains(capability) => next.run(request).await,
        Some(_) => {
            warn!(
                "Principal {} (role {}) denied capability {}",
                user.principal_id, user.role_code, capability
            );
            PermissionDenied {
                capability: capability.to_string(),
                principal_id: user.principal_id,
            }
            .into_response()
        }
        None => {
            // A role code outside the table is an integrity fault; the
            // failure mode is deny, never allow.
            error!(
                "Unknown role code {} on principal {}, denying",
                user.role_code, user.principal_id
            );
            PermissionDenied {
                capability: capability.to_string(),
                principal_id: user.principal_id,
            }
            .into_response()
        }
    }
}
