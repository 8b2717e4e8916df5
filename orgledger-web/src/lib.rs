//! Orgledger Web Portal
//!
//! HTTP surface of the Orgledger activity-record system: the session
//! authentication gate, capability-gated routes, and the JSON handlers
//! behind them.

pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use server::PortalServer;
pub use state::AppState;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE, COOKIE},
        HeaderValue, Method,
    },
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    // Configure CORS; credentials must be allowed for the session cookie
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_origin("http://127.0.0.1:3000".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([ACCEPT, CONTENT_TYPE, COOKIE]);

    Router::new()
        .nest("/api", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Configuration for the web portal
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Server-side session lifetime in seconds
    pub session_ttl_secs: i64,
    /// Advertised cookie Max-Age in seconds. Deliberately decoupled
    /// from the session TTL: a browser may present a cookie whose
    /// server-side session is already gone.
    pub cookie_max_age_secs: i64,
    /// Interval of the background expiry sweep in seconds
    pub sweep_interval_secs: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            session_ttl_secs: 1800,
            cookie_max_age_secs: 3600,
            sweep_interval_secs: 3600,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("ORGLEDGER_HOST").unwrap_or(defaults.host),
            port: std::env::var("ORGLEDGER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            session_ttl_secs: std::env::var("ORGLEDGER_SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_ttl_secs),
            cookie_max_age_secs: std::env::var("ORGLEDGER_COOKIE_MAX_AGE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cookie_max_age_secs),
            sweep_interval_secs: std::env::var("ORGLEDGER_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval_secs),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web portal
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web portal
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orgledger_web=debug,tower_http=debug,axum=debug".into()),
        )
        .init();
}
