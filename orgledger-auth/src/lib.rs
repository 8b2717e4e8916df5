//! Orgledger Auth - Session and authorization kernel
//!
//! This crate holds the concurrency-sensitive core of the Orgledger
//! portal, independent of any web framework:
//!
//! - An in-memory, internally synchronized session store with a
//!   reverse index enforcing at most one live session per principal
//! - A collision-checked session token generator
//! - A static capability table mapping account types to bitmasks
//! - A principal directory abstraction (the data-layer seam)
//!
//! ## Architecture
//!
//! The crate follows a clear separation between:
//! - **Kernel** (this crate): session lifecycle and authorization decisions
//! - **Presentation** (orgledger-web): the HTTP gate and route handlers
//!   that consume those decisions

pub mod capability;
pub mod directory;
pub mod session;

pub use capability::{capabilities_for, AccountType, Capability, CapabilitySet};
pub use directory::{Directory, MemoryDirectory, Principal};
pub use session::{SessionRecord, SessionStore, TokenGenerator, TOKEN_LEN};

/// Kernel-level error type
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token space exhausted after {attempts} attempts")]
    TokenExhausted { attempts: u32 },

    #[error("unknown principal: {0}")]
    UnknownPrincipal(String),

    #[error("account already exists: {0}")]
    DuplicateAccount(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
