//! Session subsystem
//!
//! A concurrent in-memory session store with lazy expiry and a token
//! generator. Token rotation itself lives in the web gate; the store
//! only guarantees the map/reverse-index invariants it is built on.

pub mod store;
pub mod token;

pub use store::{SessionRecord, SessionStore};
pub use token::{TokenGenerator, TOKEN_LEN};
