//! Route definitions

use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::{get, post},
    Router,
};
use orgledger_auth::Capability;

use crate::handlers;
use crate::middleware as mw;
use crate::state::AppState;

/// Build the `/api` router
pub fn api_routes(state: AppState) -> Router<AppState> {
    public_routes().merge(protected_routes(state))
}

/// Routes reachable without a session
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", get(handlers::logout))
}

/// Routes behind the session gate. Each subtree additionally requires
/// the capability it is wrapped with.
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::current_principal))
        .merge(gated(
            Capability::ManageSelf,
            Router::new().route("/auth/password", post(handlers::change_password)),
        ))
        .merge(gated(
            Capability::CheckStudentInfo,
            Router::new().route("/students", get(handlers::list_students)),
        ))
        .merge(gated(
            Capability::CreateManager,
            Router::new().route("/managers", post(handlers::create_manager)),
        ))
        .merge(gated(
            Capability::AddItem,
            Router::new().route("/items", post(handlers::create_item).get(handlers::list_items)),
        ))
        .merge(gated(
            Capability::Apply,
            Router::new().route("/applications", post(handlers::submit_application)),
        ))
        .merge(gated(
            Capability::CheckRecord,
            Router::new().route("/records", get(handlers::list_own_records)),
        ))
        .merge(gated(
            Capability::ImportStudent,
            Router::new().route("/imports", post(handlers::import_students)),
        ))
        .route_layer(middleware::from_fn_with_state(state, mw::session_gate))
}

/// Wrap a router with a capability requirement
fn gated(capability: Capability, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(middleware::from_fn(move |request: Request, next: Next| {
        mw::enforce_capability(capability, request, next)
    }))
}
