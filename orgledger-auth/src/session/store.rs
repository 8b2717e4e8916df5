//! Session store
//!
//! Primary map (token -> record) plus a reverse index (principal ->
//! token), both guarded by one lock so no reader can observe the pair
//! half-updated. The reverse index is what enforces the single
//! live-session-per-principal rule: `set` evicts the principal's old
//! session before inserting the new one.
//!
//! Expiry is lazy. `get` reports an expired record as absent but does
//! not remove it; reclamation happens when the token is touched again
//! or through the periodic `sweep`.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// One live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Identity of the authenticated principal; unique per live session
    pub principal_id: String,
    /// Absolute instant after which the record is logically absent
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new<S: Into<String>>(principal_id: S, expires_at: DateTime<Utc>) -> Self {
        Self {
            principal_id: principal_id.into(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, SessionRecord>,
    by_principal: HashMap<String, String>,
}

/// Concurrent session store. Internally synchronized; callers never
/// hold external locks.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<Inner>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session, superseding any previous session for the same
    /// principal. Last write wins under concurrent logins.
    pub fn set(&self, token: String, record: SessionRecord) {
        let mut inner = self.inner.write().unwrap();
        if let Some(old_token) = inner.by_principal.remove(&record.principal_id) {
            inner.records.remove(&old_token);
            debug!(
                principal = %record.principal_id,
                "superseded previous session"
            );
        }
        inner
            .by_principal
            .insert(record.principal_id.clone(), token.clone());
        inner.records.insert(token, record);
    }

    /// Remove a session by token, returning the record if one existed.
    ///
    /// Also clears a reverse-index entry that still points at this
    /// token, so rotation cannot leave an orphaned pointer behind.
    pub fn delete(&self, token: &str) -> Option<SessionRecord> {
        let mut inner = self.inner.write().unwrap();
        let record = inner.records.remove(token)?;
        if inner
            .by_principal
            .get(&record.principal_id)
            .is_some_and(|t| t.as_str() == token)
        {
            inner.by_principal.remove(&record.principal_id);
        }
        Some(record)
    }

    /// Look up a live session. Expired records read as absent; they
    /// are not purged here.
    pub fn get(&self, token: &str) -> Option<SessionRecord> {
        let now = Utc::now();
        let inner = self.inner.read().unwrap();
        inner
            .records
            .get(token)
            .filter(|record| !record.is_expired(now))
            .cloned()
    }

    /// Physical presence check, expiry ignored. The token generator
    /// retries on any physically present token: an expired record may
    /// still be recognized by a straggling client, so its token must
    /// never be reissued.
    pub fn contains_token(&self, token: &str) -> bool {
        self.inner.read().unwrap().records.contains_key(token)
    }

    /// Current token for a principal, if the reverse index has one.
    pub fn token_for(&self, principal_id: &str) -> Option<String> {
        self.inner
            .read()
            .unwrap()
            .by_principal
            .get(principal_id)
            .cloned()
    }

    /// Drop a principal's live session. Returns whether one existed.
    pub fn revoke_principal(&self, principal_id: &str) -> bool {
        let mut inner = self.inner.write().unwrap();
        match inner.by_principal.remove(principal_id) {
            Some(token) => {
                inner.records.remove(&token);
                debug!(principal = %principal_id, "session revoked");
                true
            }
            None => false,
        }
    }

    /// Remove every expired record. Returns the number reclaimed.
    pub fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut inner = self.inner.write().unwrap();
        let expired: Vec<String> = inner
            .records
            .iter()
            .filter(|(_, record)| record.is_expired(now))
            .map(|(token, _)| token.clone())
            .collect();
        for token in &expired {
            if let Some(record) = inner.records.remove(token) {
                if inner
                    .by_principal
                    .get(&record.principal_id)
                    .is_some_and(|t| t == token)
                {
                    inner.by_principal.remove(&record.principal_id);
                }
            }
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "swept expired sessions");
        }
        expired.len()
    }

    /// Number of physically stored records, expired ones included.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().records.is_empty()
    }
}
