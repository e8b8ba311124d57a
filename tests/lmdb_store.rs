//! LMDB store tests

use authflow::{
    AccountDraft, AccountStore, AuthError, Authenticator, Credentials, LmdbStore, NewAccount,
    PasswordPolicy, SessionContext, SessionEntry, SessionStore,
};
use tempfile::TempDir;

fn setup() -> (TempDir, LmdbStore) {
    let dir = TempDir::new().unwrap();
    let store = LmdbStore::open(dir.path().join("authflow.mdb")).unwrap();
    (dir, store)
}

fn draft(email: &str) -> AccountDraft {
    AccountDraft {
        email: email.to_string(),
        username: "testuser".to_string(),
        password_digest: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
    }
}

fn entry(account_id: u64, expires_at: Option<u64>) -> SessionEntry {
    SessionEntry { account_id, created_at: 0, expires_at }
}

// ============================================================================
// Accounts
// ============================================================================

#[test]
fn test_create_and_find() {
    let (_dir, store) = setup();

    let a = store.create(draft("a@test.test")).unwrap();
    let b = store.create(draft("b@test.test")).unwrap();
    assert_eq!(a.id, 1);
    assert_eq!(b.id, 2);

    assert_eq!(store.find_by_email("a@test.test").unwrap(), Some(a.clone()));
    assert_eq!(store.find_by_id(2).unwrap(), Some(b));
    assert_eq!(store.find_by_email("missing@test.test").unwrap(), None);
    assert_eq!(store.find_by_id(99).unwrap(), None);
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_duplicate_email_rejected() {
    let (_dir, store) = setup();
    store.create(draft("a@test.test")).unwrap();

    match store.create(draft("a@test.test")) {
        Err(AuthError::Validation(errors)) => {
            assert_eq!(errors.full_messages(), vec!["Email has already been taken"]);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_clear_all() {
    let (_dir, store) = setup();
    store.create(draft("a@test.test")).unwrap();
    store.insert_session("hash", entry(1, None)).unwrap();

    store.clear_all().unwrap();
    assert_eq!(store.count().unwrap(), 0);
    assert_eq!(store.lookup_session("hash").unwrap(), None);
    assert_eq!(store.create(draft("a@test.test")).unwrap().id, 1);
}

#[test]
fn test_accounts_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("authflow.mdb");
    {
        let store = LmdbStore::open(&path).unwrap();
        store.create(draft("a@test.test")).unwrap();
    }
    let store = LmdbStore::open(&path).unwrap();
    assert!(store.find_by_email("a@test.test").unwrap().is_some());
    assert_eq!(store.create(draft("b@test.test")).unwrap().id, 2);
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn test_session_crud() {
    let (_dir, store) = setup();

    store.insert_session("h1", entry(7, Some(5_000))).unwrap();
    assert_eq!(store.lookup_session("h1").unwrap(), Some(entry(7, Some(5_000))));
    assert!(store.remove_session("h1").unwrap());
    assert!(!store.remove_session("h1").unwrap());
    assert_eq!(store.lookup_session("h1").unwrap(), None);
}

#[test]
fn test_purge_expired_sessions() {
    let (_dir, store) = setup();
    store.insert_session("old", entry(1, Some(1_000))).unwrap();
    store.insert_session("edge", entry(1, Some(2_000))).unwrap();
    store.insert_session("fresh", entry(1, Some(3_000))).unwrap();
    store.insert_session("forever", entry(1, None)).unwrap();

    assert_eq!(store.purge_expired(2_000).unwrap(), 2);
    assert_eq!(store.lookup_session("old").unwrap(), None);
    assert_eq!(store.lookup_session("edge").unwrap(), None);
    assert!(store.lookup_session("fresh").unwrap().is_some());
    assert!(store.lookup_session("forever").unwrap().is_some());
    assert_eq!(store.purge_expired(2_000).unwrap(), 0);
}

// ============================================================================
// Full flow on disk
// ============================================================================

#[test]
fn test_sign_up_log_out_log_in_on_disk() {
    let (_dir, store) = setup();
    let auth = Authenticator::new(store, PasswordPolicy::default());
    let mut ctx = SessionContext::persistent();

    let form = NewAccount::new("test@test.test", "testtest", "testtest", "testtest");
    assert!(auth.register(&mut ctx, &form).unwrap().success);
    let token = ctx.token().unwrap().to_string();
    assert!(auth.resume(&token).unwrap().is_authenticated());

    auth.logout(&mut ctx).unwrap();
    assert!(!auth.resume(&token).unwrap().is_authenticated());

    let res = auth.login(&mut ctx, &Credentials::new("test@test.test", "testtest")).unwrap();
    assert!(res.success);
    assert!(ctx.is_authenticated());

    let res = auth.login(&mut ctx, &Credentials::new("test@test.test", "wrongpass")).unwrap();
    assert!(!res.success);
    assert!(!ctx.is_authenticated());
}
