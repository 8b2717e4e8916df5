//! Principal directory
//!
//! The directory is the data-layer seam: the session subsystem only
//! ever asks it two questions (do these credentials check out, and
//! what role does this principal carry). Deployments back it with
//! whatever store they have; the in-memory implementation here serves
//! tests and single-node setups.

use crate::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;

/// A directory entry visible to the rest of the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Unique principal identifier (login name)
    pub principal_id: String,
    /// Display name (optional)
    pub display_name: Option<String>,
    /// Raw account-type code; resolved against the capability table
    /// at authorization time, not here
    pub role_code: u8,
    /// Organization the principal belongs to (optional)
    pub org: Option<String>,
}

impl Principal {
    pub fn new<S: Into<String>>(principal_id: S, role_code: u8) -> Self {
        Self {
            principal_id: principal_id.into(),
            display_name: None,
            role_code,
            org: None,
        }
    }

    pub fn with_display_name<S: Into<String>>(mut self, name: S) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_org<S: Into<String>>(mut self, org: S) -> Self {
        self.org = Some(org.into());
        self
    }
}

/// Principal lookup and credential verification.
///
/// All methods are synchronous in-memory or fast-path operations; the
/// gate calls them once per request.
pub trait Directory: Send + Sync {
    /// Check a principal's credentials. Unknown principals verify as
    /// `false`, not as an error.
    fn verify_credentials(&self, principal_id: &str, secret: &str) -> bool;

    /// Resolve a principal's account-type code. `None` when the
    /// principal does not exist.
    fn lookup_role(&self, principal_id: &str) -> Option<u8>;

    /// Fetch the full directory entry.
    fn lookup(&self, principal_id: &str) -> Option<Principal>;

    /// Create an account with an initial secret.
    fn create_account(&self, principal: Principal, secret: &str) -> AuthResult<()>;

    /// Replace a principal's secret.
    fn set_secret(&self, principal_id: &str, secret: &str) -> AuthResult<()>;

    /// Remove an account. Returns whether it existed.
    fn remove_account(&self, principal_id: &str) -> bool;

    /// List principals carrying the given role code.
    fn list_by_role(&self, role_code: u8) -> Vec<Principal>;
}

#[derive(Debug, Clone)]
struct DirectoryEntry {
    principal: Principal,
    secret: String,
}

/// In-memory directory backed by a single lock.
///
/// Secrets are compared as plain strings; credential-store hardening
/// lives behind the `Directory` trait, not in the session kernel.
pub struct MemoryDirectory {
    entries: RwLock<HashMap<String, DirectoryEntry>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// A directory pre-seeded with the bootstrap super-admin account.
    pub fn seeded() -> Self {
        let directory = Self::new();
        let admin = Principal::new("admin", 0).with_display_name("Administrator");
        info!("Seeding bootstrap super-admin account: {}", admin.principal_id);
        directory
            .create_account(admin, "123456")
            .expect("empty directory cannot hold a duplicate");
        directory
    }

    /// Builder-style account insertion for tests and setup code.
    pub fn with_account(self, principal: Principal, secret: &str) -> Self {
        self.create_account(principal, secret)
            .expect("duplicate account in directory setup");
        self
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Directory for MemoryDirectory {
    fn verify_credentials(&self, principal_id: &str, secret: &str) -> bool {
        let entries = self.entries.read().unwrap();
        entries
            .get(principal_id)
            .map(|entry| entry.secret == secret)
            .unwrap_or(false)
    }

    fn lookup_role(&self, principal_id: &str) -> Option<u8> {
        let entries = self.entries.read().unwrap();
        entries.get(principal_id).map(|e| e.principal.role_code)
    }

    fn lookup(&self, principal_id: &str) -> Option<Principal> {
        let entries = self.entries.read().unwrap();
        entries.get(principal_id).map(|e| e.principal.clone())
    }

    fn create_account(&self, principal: Principal, secret: &str) -> AuthResult<()> {
        let mut entries = self.entries.write().unwrap();
        if entries.contains_key(&principal.principal_id) {
            return Err(AuthError::DuplicateAccount(principal.principal_id));
        }
        info!(
            principal = %principal.principal_id,
            role = principal.role_code,
            "directory account created"
        );
        entries.insert(
            principal.principal_id.clone(),
            DirectoryEntry {
                principal,
                secret: secret.to_string(),
            },
        );
        Ok(())
    }

    fn set_secret(&self, principal_id: &str, secret: &str) -> AuthResult<()> {
        let mut entries = self.entries.write().unwrap();
        match entries.get_mut(principal_id) {
            Some(entry) => {
                entry.secret = secret.to_string();
                Ok(())
            }
            None => Err(AuthError::UnknownPrincipal(principal_id.to_string())),
        }
    }

    fn remove_account(&self, principal_id: &str) -> bool {
        self.entries.write().unwrap().remove(principal_id).is_some()
    }

    fn list_by_role(&self, role_code: u8) -> Vec<Principal> {
        let entries = self.entries.read().unwrap();
        let mut principals: Vec<Principal> = entries
            .values()
            .filter(|e| e.principal.role_code == role_code)
            .map(|e| e.principal.clone())
            .collect();
        principals.sort_by(|a, b| a.principal_id.cmp(&b.principal_id));
        principals
    }
}
