//! Shared application state

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use orgledger_auth::{Directory, MemoryDirectory, SessionStore, TokenGenerator};
use serde::Serialize;

use crate::WebConfig;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Portal configuration
    pub config: WebConfig,
    /// Live sessions, shared with the background sweep task
    pub sessions: Arc<SessionStore>,
    /// Token generator for session minting
    pub tokens: TokenGenerator,
    /// Account directory
    pub directory: Arc<dyn Directory>,
    /// Activity items and applications
    pub ledger: Arc<Ledger>,
}

impl AppState {
    /// Create application state with the seeded in-memory directory
    pub fn new(config: WebConfig) -> Self {
        Self::with_directory(config, Arc::new(MemoryDirectory::seeded()))
    }

    /// Create application state with a custom directory backend
    pub fn with_directory(config: WebConfig, directory: Arc<dyn Directory>) -> Self {
        Self {
            config,
            sessions: Arc::new(SessionStore::new()),
            tokens: TokenGenerator::new(),
            directory,
            ledger: Arc::new(Ledger::new()),
        }
    }
}

/// An activity item open for applications
#[derive(Debug, Clone, Serialize)]
pub struct ItemRecord {
    pub name: String,
    pub description: String,
    /// Whether the item counts toward the basic quota
    pub basic: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// A student's application to an activity item
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationRecord {
    pub item_name: String,
    pub principal_id: String,
    pub submitted_at: DateTime<Utc>,
}

/// In-memory store for activity items and applications
pub struct Ledger {
    items: RwLock<Vec<ItemRecord>>,
    applications: RwLock<Vec<ApplicationRecord>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            applications: RwLock::new(Vec::new()),
        }
    }

    /// Add an item. Returns false if an item with the same name exists.
    pub fn add_item(&self, item: ItemRecord) -> bool {
        let mut items = self.items.write().unwrap();
        if items.iter().any(|i| i.name == item.name) {
            return false;
        }
        items.push(item);
        true
    }

    pub fn list_items(&self) -> Vec<ItemRecord> {
        self.items.read().unwrap().clone()
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.items.read().unwrap().iter().any(|i| i.name == name)
    }

    pub fn add_application(&self, application: ApplicationRecord) {
        self.applications.write().unwrap().push(application);
    }

    /// Applications submitted by one principal
    pub fn applications_for(&self, principal_id: &str) -> Vec<ApplicationRecord> {
        self.applications
            .read()
            .unwrap()
            .iter()
            .filter(|a| a.principal_id == principal_id)
            .cloned()
            .collect()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
