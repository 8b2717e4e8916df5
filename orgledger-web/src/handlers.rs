//! JSON request handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use orgledger_auth::{
    capabilities_for, AccountType, AuthError, Principal, SessionRecord,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::auth::{removal_cookie, session_cookie, CurrentUser, SESSION_COOKIE};
use crate::state::{AppState, ApplicationRecord, ItemRecord};

/// Role code every student account carries
const STUDENT_ROLE: u8 = 5;

/// Secret assigned to newly created accounts until their owner changes it
const DEFAULT_SECRET: &str = "123456";

fn json_error(status: StatusCode, error: &str, message: &str) -> Response {
    (status, Json(json!({ "error": error, "message": message }))).into_response()
}

/// Health check endpoint
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "orgledger-web",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub principal_id: String,
    pub secret: String,
}

/// Log in and start a session.
///
/// A successful login supersedes any session the principal already
/// holds, on this device or another.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Response {
    if !state
        .directory
        .verify_credentials(&payload.principal_id, &payload.secret)
    {
        warn!("Failed login attempt for {}", payload.principal_id);
        return json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Unknown account or wrong secret",
        );
    }

    let token = match state.tokens.mint(&state.sessions) {
        Ok(token) => token,
        Err(e @ AuthError::TokenExhausted { .. }) => {
            error!("Session mint failed during login: {}", e);
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "session_mint_failed",
                "Could not allocate a session token",
            );
        }
        Err(e) => {
            error!("Unexpected error during login: {}", e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "Login failed");
        }
    };

    let expires_at = Utc::now() + Duration::seconds(state.config.session_ttl_secs);
    state.sessions.set(
        token.clone(),
        SessionRecord::new(payload.principal_id.clone(), expires_at),
    );

    let role_code = state.directory.lookup_role(&payload.principal_id);
    let account_type = role_code.and_then(AccountType::from_code);
    let capabilities = role_code
        .and_then(capabilities_for)
        .map(|set| set.names())
        .unwrap_or_default();

    info!("Principal {} logged in", payload.principal_id);

    let jar = jar.add(session_cookie(token, state.config.cookie_max_age_secs));
    (
        jar,
        Json(json!({
            "principal_id": payload.principal_id,
            "account_type": account_type.map(|t| t.to_string()),
            "capabilities": capabilities
        })),
    )
        .into_response()
}

/// End the presented session. Always succeeds, even without a session.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(record) = state.sessions.delete(cookie.value()) {
            info!("Principal {} logged out", record.principal_id);
        }
    }
    let jar = jar.remove(removal_cookie());
    (jar, Json(json!({ "status": "logged_out" }))).into_response()
}

/// Describe the authenticated principal and its capability grants
pub async fn current_principal(State(state): State<AppState>, user: CurrentUser) -> Response {
    let account_type = AccountType::from_code(user.role_code);
    let grants: serde_json::Map<String, serde_json::Value> = match capabilities_for(user.role_code)
    {
        Some(set) => orgledger_auth::Capability::ALL
            .iter()
            .map(|c| (c.to_string(), json!(set.contains(*c))))
            .collect(),
        None => orgledger_auth::Capability::ALL
            .iter()
            .map(|c| (c.to_string(), json!(false)))
            .collect(),
    };

    let display_name = state
        .directory
        .lookup(&user.principal_id)
        .and_then(|p| p.display_name);

    Json(json!({
        "principal_id": user.principal_id,
        "display_name": display_name,
        "account_type": account_type.map(|t| t.to_string()),
        "capabilities": grants
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_secret: String,
    pub new_secret: String,
}

/// Change the caller's secret and revoke its sessions.
///
/// The session rotation already consumed the presented token; revoking
/// the principal also removes the replacement, so the next request must
/// log in with the new secret.
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Response {
    if !state
        .directory
        .verify_credentials(&user.principal_id, &payload.current_secret)
    {
        return json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Current secret does not match",
        );
    }

    if let Err(e) = state
        .directory
        .set_secret(&user.principal_id, &payload.new_secret)
    {
        error!("Failed to update secret for {}: {}", user.principal_id, e);
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "Update failed");
    }

    state.sessions.revoke_principal(&user.principal_id);
    info!("Principal {} changed secret, sessions revoked", user.principal_id);
    Json(json!({ "status": "secret_changed" })).into_response()
}

/// List all student accounts
pub async fn list_students(State(state): State<AppState>) -> Response {
    let students: Vec<serde_json::Value> = state
        .directory
        .list_by_role(STUDENT_ROLE)
        .into_iter()
        .map(|p| {
            json!({
                "principal_id": p.principal_id,
                "display_name": p.display_name,
                "org": p.org
            })
        })
        .collect();
    Json(json!({ "students": students })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CreateManagerRequest {
    pub principal_id: String,
    pub display_name: Option<String>,
    pub role_code: u8,
    pub org: Option<String>,
}

/// Create a manager account with the default secret
pub async fn create_manager(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateManagerRequest>,
) -> Response {
    if !(1..=4).contains(&payload.role_code) {
        return json_error(
            StatusCode::BAD_REQUEST,
            "invalid_role",
            "Manager role code must be between 1 and 4",
        );
    }

    let mut principal = Principal::new(payload.principal_id.clone(), payload.role_code);
    if let Some(name) = payload.display_name {
        principal = principal.with_display_name(name);
    }
    if let Some(org) = payload.org {
        principal = principal.with_org(org);
    }

    match state.directory.create_account(principal, DEFAULT_SECRET) {
        Ok(()) => {
            info!(
                "Principal {} created manager {} (role {})",
                user.principal_id, payload.principal_id, payload.role_code
            );
            (
                StatusCode::CREATED,
                Json(json!({ "principal_id": payload.principal_id })),
            )
                .into_response()
        }
        Err(AuthError::DuplicateAccount(id)) => json_error(
            StatusCode::CONFLICT,
            "duplicate_account",
            &format!("Account {} already exists", id),
        ),
        Err(e) => {
            error!("Failed to create manager: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "Create failed")
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub basic: bool,
}

/// Publish a new activity item
pub async fn create_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateItemRequest>,
) -> Response {
    let item = ItemRecord {
        name: payload.name.clone(),
        description: payload.description.unwrap_or_default(),
        basic: payload.basic,
        created_by: user.principal_id.clone(),
        created_at: Utc::now(),
    };

    if !state.ledger.add_item(item) {
        return json_error(
            StatusCode::CONFLICT,
            "duplicate_item",
            &format!("Item {} already exists", payload.name),
        );
    }

    info!("Principal {} published item {}", user.principal_id, payload.name);
    (
        StatusCode::CREATED,
        Json(json!({ "name": payload.name })),
    )
        .into_response()
}

/// List all published activity items
pub async fn list_items(State(state): State<AppState>) -> Response {
    Json(json!({ "items": state.ledger.list_items() })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ApplicationRequest {
    pub item_name: String,
}

/// Apply to an activity item as the authenticated principal
pub async fn submit_application(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ApplicationRequest>,
) -> Response {
    if !state.ledger.has_item(&payload.item_name) {
        return json_error(
            StatusCode::NOT_FOUND,
            "unknown_item",
            &format!("No item named {}", payload.item_name),
        );
    }

    state.ledger.add_application(ApplicationRecord {
        item_name: payload.item_name.clone(),
        principal_id: user.principal_id.clone(),
        submitted_at: Utc::now(),
    });

    info!(
        "Principal {} applied to item {}",
        user.principal_id, payload.item_name
    );
    (
        StatusCode::CREATED,
        Json(json!({ "item_name": payload.item_name })),
    )
        .into_response()
}

/// List the caller's own application records
pub async fn list_own_records(State(state): State<AppState>, user: CurrentUser) -> Response {
    Json(json!({
        "principal_id": user.principal_id,
        "records": state.ledger.applications_for(&user.principal_id)
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct ImportStudentsRequest {
    pub students: Vec<ImportedStudent>,
}

#[derive(Debug, Deserialize)]
pub struct ImportedStudent {
    pub principal_id: String,
    pub display_name: Option<String>,
    pub org: Option<String>,
}

/// Bulk-create student accounts. Existing accounts are skipped, not
/// overwritten.
pub async fn import_students(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ImportStudentsRequest>,
) -> Response {
    let mut created = 0usize;
    let mut skipped = 0usize;

    for student in payload.students {
        let mut principal = Principal::new(student.principal_id, STUDENT_ROLE);
        if let Some(name) = student.display_name {
            principal = principal.with_display_name(name);
        }
        if let Some(org) = student.org {
            principal = principal.with_org(org);
        }
        match state.directory.create_account(principal, DEFAULT_SECRET) {
            Ok(()) => created += 1,
            Err(AuthError::DuplicateAccount(_)) => skipped += 1,
            Err(e) => {
                error!("Student import aborted: {}", e);
                return json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Import failed",
                );
            }
        }
    }

    info!(
        "Principal {} imported students: {} created, {} skipped",
        user.principal_id, created, skipped
    );
    Json(json!({ "created": created, "skipped": skipped })).into_response()
}
