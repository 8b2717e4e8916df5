//! Session token generation
//!
//! Tokens are 10 characters over digits, lowercase and uppercase
//! letters. Each position first picks one of the three symbol classes
//! uniformly, then a symbol uniformly within the class. Candidates are
//! checked against the store's physical contents and retried on
//! collision; the retry loop is iterative and bounded.

use crate::{AuthError, AuthResult, SessionStore};
use rand::Rng;
use tracing::warn;

/// Fixed token length.
pub const TOKEN_LEN: usize = 10;

/// Bound on collision retries. At 62^10 possible tokens a single
/// retry is already rare; hitting the bound means the store is in a
/// pathological state and the login fails instead of spinning.
const MAX_MINT_ATTEMPTS: u32 = 512;

/// Stateless token generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenGenerator;

impl TokenGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Produce one candidate token without a uniqueness check.
    pub fn candidate(&self) -> String {
        let mut rng = rand::thread_rng();
        let mut token = String::with_capacity(TOKEN_LEN);
        for _ in 0..TOKEN_LEN {
            let symbol = match rng.gen_range(0..3) {
                0 => (b'0' + rng.gen_range(0..10)) as char,
                1 => (b'a' + rng.gen_range(0..26)) as char,
                _ => (b'A' + rng.gen_range(0..26)) as char,
            };
            token.push(symbol);
        }
        token
    }

    /// Mint a token not physically present in the store. Expired but
    /// unreclaimed tokens count as present and force a retry, so a
    /// token that might still be recognized is never reissued.
    pub fn mint(&self, store: &SessionStore) -> AuthResult<String> {
        for attempt in 1..=MAX_MINT_ATTEMPTS {
            let token = self.candidate();
            if !store.contains_token(&token) {
                return Ok(token);
            }
            warn!(attempt, "session token collision, retrying");
        }
        Err(AuthError::TokenExhausted {
            attempts: MAX_MINT_ATTEMPTS,
        })
    }
}
