use crate::{Credential, SessionStore};

use googletest::prelude::*;

#[test]
fn given_new_store_when_read_then_unauthenticated() {
    let store = SessionStore::new();

    assert!(!store.is_authenticated());
    assert!(store.current().is_none());
}

#[test]
fn given_login_when_read_then_session_visible_to_observers() {
    let store = SessionStore::new();
    let mut changes = store.changes();

    store.login("user@example.com", "abc123");

    assert!(changes.has_changed().unwrap());
    let session = changes.borrow_and_update().clone().unwrap();
    assert_that!(session.identity.as_str(), eq("user@example.com"));
    assert_eq!(session.credential, Credential::new("abc123"));
}

#[test]
fn given_same_login_twice_when_observed_then_notified_once() {
    let store = SessionStore::new();
    store.login("user@example.com", "abc123");
    let mut changes = store.changes();
    changes.borrow_and_update();

    store.login("user@example.com", "abc123");

    assert!(!changes.has_changed().unwrap());
}

#[test]
fn given_logged_in_when_logged_out_then_cleared() {
    let store = SessionStore::new();
    store.login("user@example.com", "abc123");

    store.logout();
    store.logout();

    assert!(!store.is_authenticated());
}

#[test]
fn given_credential_when_debug_printed_then_token_hidden() {
    let printed = format!("{:?}", Credential::new("abc123"));

    assert!(!printed.contains("abc123"));
    assert_eq!(Credential::new("abc123").bearer(), "Bearer abc123");
}
