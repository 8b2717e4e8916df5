//! Portal server lifecycle

use std::time::Duration;

use tracing::{debug, info};

use crate::state::AppState;
use crate::{create_app, WebConfig, WebResult};

/// The Orgledger portal server
pub struct PortalServer {
    config: WebConfig,
    state: AppState,
}

impl PortalServer {
    /// Create a new server with the given configuration
    pub fn new(config: WebConfig) -> Self {
        let state = AppState::new(config.clone());
        Self { config, state }
    }

    /// Create a builder for custom configuration
    pub fn builder() -> PortalServerBuilder {
        PortalServerBuilder::default()
    }

    /// State handle, exposed for in-process testing
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Start the server and serve until shutdown
    pub async fn start(self) -> WebResult<()> {
        let app = create_app(self.state.clone());
        let addr = self.config.address();

        // Background sweep compacting expired sessions. Correctness does
        // not depend on it; reads already treat expired records as absent.
        let sessions = self.state.sessions.clone();
        let interval_secs = self.config.sweep_interval_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = sessions.sweep();
                if removed > 0 {
                    debug!("Session sweep removed {} expired records", removed);
                }
            }
        });

        info!("Starting Orgledger portal on {}", addr);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Builder for the portal server
#[derive(Default)]
pub struct PortalServerBuilder {
    config: WebConfig,
}

impl PortalServerBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn session_ttl_secs(mut self, secs: i64) -> Self {
        self.config.session_ttl_secs = secs;
        self
    }

    pub fn cookie_max_age_secs(mut self, secs: i64) -> Self {
        self.config.cookie_max_age_secs = secs;
        self
    }

    pub fn sweep_interval_secs(mut self, secs: u64) -> Self {
        self.config.sweep_interval_secs = secs;
        self
    }

    pub fn build(self) -> PortalServer {
        PortalServer::new(self.config)
    }
}
