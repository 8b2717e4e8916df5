//! Shared helpers for portal integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use orgledger_auth::{MemoryDirectory, Principal};
use orgledger_web::{create_app, AppState, WebConfig};
use tower::ServiceExt;

/// Portal config with a short TTL suitable for tests
pub fn test_config(session_ttl_secs: i64) -> WebConfig {
    WebConfig {
        session_ttl_secs,
        ..WebConfig::default()
    }
}

/// Build an in-process portal app around `directory`
pub fn portal_app(directory: MemoryDirectory, session_ttl_secs: i64) -> (Router, AppState) {
    let state = AppState::with_directory(test_config(session_ttl_secs), Arc::new(directory));
    (create_app(state.clone()), state)
}

/// Directory with one account per role tier plus one unknown role code
pub fn tiered_directory() -> MemoryDirectory {
    MemoryDirectory::new()
        .with_account(Principal::new("root", 0), "rootpw")
        .with_account(Principal::new("dean", 1), "deanpw")
        .with_account(Principal::new("unit1", 2), "unitpw")
        .with_account(Principal::new("branch1", 4), "branchpw")
        .with_account(Principal::new("S001", 5), "studentpw")
        .with_account(Principal::new("ghost", 9), "ghostpw")
}

/// Log in and return the session token from the response cookie
pub async fn login(app: &Router, principal_id: &str, secret: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(
            r#"{{"principal_id":"{}","secret":"{}"}}"#,
            principal_id, secret
        )))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    cookie_token(response.headers()).expect("login response should set the session cookie")
}

/// Extract the session token from a Set-Cookie header, if present
pub fn cookie_token(headers: &axum::http::HeaderMap) -> Option<String> {
    let set_cookie = headers.get(header::SET_COOKIE)?.to_str().ok()?;
    let value = set_cookie.strip_prefix("sid=")?;
    Some(value.split(';').next().unwrap_or(value).to_string())
}

/// GET `uri` carrying `token` as the session cookie
pub fn get_with_session(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, format!("sid={}", token))
        .body(Body::empty())
        .unwrap()
}

/// POST a JSON body to `uri` carrying `token` as the session cookie
pub fn post_with_session(uri: &str, token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, format!("sid={}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect a response body into JSON
pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
