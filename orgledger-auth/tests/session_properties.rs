//! Session and capability property tests
//!
//! End-to-end checks of the kernel's contract: single active session,
//! rotation, lazy expiry, capability-table totality and fail-closed
//! behavior on unknown roles.

use chrono::{Duration, Utc};
use orgledger_auth::{
    capabilities_for, AccountType, Capability, SessionRecord, SessionStore, TokenGenerator,
};

const TTL_SECS: i64 = 1800;

fn login(store: &SessionStore, generator: &TokenGenerator, principal: &str) -> String {
    let token = generator.mint(store).expect("token space exhausted");
    store.set(
        token.clone(),
        SessionRecord::new(principal, Utc::now() + Duration::seconds(TTL_SECS)),
    );
    token
}

/// The gate's rotation step: get, mint, delete old, refresh expiry,
/// re-insert under the new token.
fn rotate(store: &SessionStore, generator: &TokenGenerator, token: &str) -> Option<String> {
    let mut record = store.get(token)?;
    let new_token = generator.mint(store).expect("token space exhausted");
    store.delete(token);
    record.expires_at = Utc::now() + Duration::seconds(TTL_SECS);
    store.set(new_token.clone(), record);
    Some(new_token)
}

#[test]
fn n_logins_leave_exactly_one_valid_token() {
    let store = SessionStore::new();
    let generator = TokenGenerator::new();

    let mut tokens = Vec::new();
    for _ in 0..10 {
        tokens.push(login(&store, &generator, "S001"));
    }

    let last = tokens.last().unwrap().clone();
    for stale in &tokens[..tokens.len() - 1] {
        assert!(store.get(stale).is_none(), "token {} should be dead", stale);
    }
    assert_eq!(store.get(&last).unwrap().principal_id, "S001");
    assert_eq!(store.len(), 1);
}

#[test]
fn rotation_invalidates_predecessor_and_refreshes_expiry() {
    let store = SessionStore::new();
    let generator = TokenGenerator::new();

    let token_a = login(&store, &generator, "S001");
    let before = store.get(&token_a).unwrap().expires_at;

    let token_b = rotate(&store, &generator, &token_a).unwrap();
    assert!(store.get(&token_a).is_none());
    let record = store.get(&token_b).unwrap();
    assert_eq!(record.principal_id, "S001");
    assert!(record.expires_at >= before);
}

#[test]
fn rotation_refuses_tokens_that_failed_lookup() {
    let store = SessionStore::new();
    let generator = TokenGenerator::new();
    assert!(rotate(&store, &generator, "nonexistent").is_none());
    assert!(store.is_empty());
}

#[test]
fn lazy_expiry_reports_absent_without_deleting() {
    let store = SessionStore::new();
    store.set(
        "stale-token".into(),
        SessionRecord::new("S001", Utc::now() - Duration::seconds(10)),
    );

    assert!(store.get("stale-token").is_none());
    assert!(store.contains_token("stale-token"));
    assert_eq!(store.sweep(), 1);
    assert!(!store.contains_token("stale-token"));
}

#[test]
fn relogin_from_second_device_supersedes_rotated_session() {
    // Concrete scenario: S001 logs in (A), rotates to B, then logs in
    // again from another device (C). B must be dead and the reverse
    // index must point at C.
    let store = SessionStore::new();
    let generator = TokenGenerator::new();

    let token_a = login(&store, &generator, "S001");
    let token_b = rotate(&store, &generator, &token_a).unwrap();
    assert!(store.get(&token_a).is_none());

    let token_c = login(&store, &generator, "S001");
    assert!(store.get(&token_b).is_none());
    assert_eq!(store.token_for("S001").as_deref(), Some(token_c.as_str()));
    assert_eq!(store.get(&token_c).unwrap().principal_id, "S001");
}

#[test]
fn capability_table_is_total_with_documented_masks() {
    let expected: [(u8, u16); 6] = [
        (0, 0b0111110011010),
        (1, 0b0111110011000),
        (2, 0b0100000000001),
        (3, 0b0100010110001),
        (4, 0b1100010010000),
        (5, 0b0100001000100),
    ];
    for (code, bits) in expected {
        let mask = capabilities_for(code).expect("table must be total over valid codes");
        assert_eq!(mask.bits(), bits, "mask mismatch for role code {}", code);
    }
}

#[test]
fn unknown_role_code_is_denied_every_capability() {
    assert!(capabilities_for(9).is_none());
    for capability in Capability::ALL {
        let allowed = capabilities_for(9)
            .map(|mask| mask.contains(capability))
            .unwrap_or(false);
        assert!(!allowed, "role 9 must not hold {}", capability);
    }
}

#[test]
fn create_manager_bit_splits_branch_admin_from_super_admin() {
    let branch = AccountType::BranchAdmin.capabilities();
    let superadmin = AccountType::SuperAdmin.capabilities();
    assert_eq!(Capability::CreateManager.bit(), 1 << 8);
    assert!(!branch.contains(Capability::CreateManager));
    assert!(superadmin.contains(Capability::CreateManager));
}

#[test]
fn concurrent_rotations_and_logins_converge_to_one_session() {
    use std::sync::Arc;
    use std::thread;

    let store = Arc::new(SessionStore::new());
    let generator = TokenGenerator::new();
    let seed = login(&store, &generator, "S001");

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = Arc::clone(&store);
        let seed = seed.clone();
        handles.push(thread::spawn(move || {
            let generator = TokenGenerator::new();
            let mut token = seed;
            for _ in 0..100 {
                match rotate(&store, &generator, &token) {
                    Some(next) => token = next,
                    // Lost the race; behave like a second device.
                    None => token = login(&store, &generator, "S001"),
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let survivor = store.token_for("S001").expect("one session must survive");
    assert_eq!(store.get(&survivor).unwrap().principal_id, "S001");
    assert_eq!(store.len(), 1);
}
