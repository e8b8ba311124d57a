//! Login and logout tests
//!
//! A pre-existing account is seeded the way the application seeds one:
//! created directly, with no confirmation field and no session.

use std::time::Duration;

use authflow::password::hash_token;
use authflow::{
    AuthError, Authenticator, Credentials, MemoryStore, NewAccount, PasswordPolicy, Session,
    SessionContext, SessionEntry, SessionStore,
};

fn setup() -> Authenticator<MemoryStore> {
    let auth = Authenticator::new(MemoryStore::new(), PasswordPolicy::default());
    auth.create_account(&NewAccount::unconfirmed("test@test.test", "testuser", "password123"))
        .unwrap();
    auth
}

fn login(auth: &Authenticator<MemoryStore>, email: &str, password: &str) -> (bool, SessionContext) {
    let mut ctx = SessionContext::new();
    let res = auth.login(&mut ctx, &Credentials::new(email, password)).unwrap();
    (res.success, ctx)
}

// ============================================================================
// Login
// ============================================================================

#[test]
fn test_user_can_log_in() {
    let auth = setup();

    let (ok, ctx) = login(&auth, "test@test.test", "password123");
    assert!(ok);
    assert!(ctx.is_authenticated());
    assert_eq!(ctx.session().username(), Some("testuser"));
}

#[test]
fn test_invalid_email() {
    let auth = setup();

    let (ok, ctx) = login(&auth, "invalid@invalid.invalid", "password123");
    assert!(!ok);
    assert_eq!(ctx.session(), &Session::Anonymous);
}

#[test]
fn test_invalid_password() {
    let auth = setup();

    let (ok, ctx) = login(&auth, "test@test.test", "invalidinvalid");
    assert!(!ok);
    assert!(!ctx.is_authenticated());
}

#[test]
fn test_blank() {
    let auth = setup();

    let (ok, ctx) = login(&auth, "", "");
    assert!(!ok);
    assert!(!ctx.is_authenticated());
}

#[test]
fn test_password_is_case_sensitive() {
    let auth = setup();

    assert!(!login(&auth, "test@test.test", "PASSWORD123").0);
}

#[test]
fn test_email_is_case_insensitive() {
    let auth = setup();

    assert!(login(&auth, "  Test@TEST.test", "password123").0);
}

#[test]
fn test_failed_login_carries_no_account() {
    let auth = setup();
    let mut ctx = SessionContext::new();

    let res = auth.login(&mut ctx, &Credentials::new("test@test.test", "nope")).unwrap();
    assert!(!res.success);
    assert!(res.account.is_none());
}

#[test]
fn test_failed_login_ends_previous_session() {
    let auth = setup();
    let (_, mut ctx) = login(&auth, "test@test.test", "password123");

    let res = auth.login(&mut ctx, &Credentials::new("test@test.test", "wrong")).unwrap();
    assert!(!res.success);
    assert!(!ctx.is_authenticated());
}

// ============================================================================
// Logout
// ============================================================================

#[test]
fn test_user_can_log_out_after_logging_in() {
    let auth = setup();
    let (_, mut ctx) = login(&auth, "test@test.test", "password123");

    auth.logout(&mut ctx).unwrap();
    assert_eq!(ctx.session(), &Session::Anonymous);
}

#[test]
fn test_logout_when_anonymous_is_noop() {
    let auth = setup();
    let mut ctx = SessionContext::new();

    auth.logout(&mut ctx).unwrap();
    auth.logout(&mut ctx).unwrap();
    assert!(!ctx.is_authenticated());
}

#[test]
fn test_sign_up_log_out_log_in() {
    let auth = Authenticator::new(MemoryStore::new(), PasswordPolicy::default());
    let mut ctx = SessionContext::new();

    let form = NewAccount::new("test@test.test", "testtest", "testtest", "testtest");
    assert!(auth.register(&mut ctx, &form).unwrap().success);
    assert!(ctx.is_authenticated());

    auth.logout(&mut ctx).unwrap();
    assert!(!ctx.is_authenticated());

    let res = auth.login(&mut ctx, &Credentials::new("test@test.test", "testtest")).unwrap();
    assert!(res.success);
    assert!(ctx.is_authenticated());
}

// ============================================================================
// Token sessions
// ============================================================================

#[test]
fn test_persistent_login_issues_token() {
    let auth = setup();
    let mut ctx = SessionContext::persistent();

    auth.login(&mut ctx, &Credentials::new("test@test.test", "password123")).unwrap();
    let token = ctx.token().unwrap().to_string();

    let resumed = auth.resume(&token).unwrap();
    assert!(resumed.is_authenticated());
    assert_eq!(resumed.session().username(), Some("testuser"));
}

#[test]
fn test_plain_context_gets_no_token() {
    let auth = setup();
    let (_, ctx) = login(&auth, "test@test.test", "password123");
    assert!(ctx.token().is_none());
}

#[test]
fn test_logout_revokes_token() {
    let auth = setup();
    let mut ctx = SessionContext::persistent();
    auth.login(&mut ctx, &Credentials::new("test@test.test", "password123")).unwrap();
    let token = ctx.token().unwrap().to_string();

    let mut resumed = auth.resume(&token).unwrap();
    auth.logout(&mut resumed).unwrap();

    assert!(!auth.resume(&token).unwrap().is_authenticated());
    assert!(!auth.revoke_token(&token).unwrap());
}

#[test]
fn test_unknown_token_resumes_anonymous() {
    let auth = setup();

    let ctx = auth.resume("not-a-real-token").unwrap();
    assert!(!ctx.is_authenticated());
    assert!(ctx.token().is_none());
}

#[test]
fn test_tokens_are_distinct() {
    let auth = setup();

    let t1 = auth.issue_token(1).unwrap();
    let t2 = auth.issue_token(1).unwrap();
    assert_ne!(t1, t2);
    assert!(t1.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    assert!(auth.resume(&t1).unwrap().is_authenticated());
    assert!(auth.resume(&t2).unwrap().is_authenticated());
}

#[test]
fn test_issue_token_requires_existing_account() {
    let auth = setup();

    assert!(matches!(auth.issue_token(999), Err(AuthError::InvalidCredentials)));
    let token = auth.issue_token(1).unwrap();
    assert_eq!(auth.resume(&token).unwrap().session().account_id(), Some(1));
}

// ============================================================================
// Token expiry
// ============================================================================

#[test]
fn test_expired_token_resumes_anonymous_and_is_dropped() {
    let auth = setup();
    let hash = hash_token("stale-token");
    auth.store()
        .insert_session(&hash, SessionEntry { account_id: 1, created_at: 0, expires_at: Some(1) })
        .unwrap();

    let ctx = auth.resume("stale-token").unwrap();
    assert!(!ctx.is_authenticated());
    assert!(ctx.token().is_none());
    assert_eq!(auth.store().lookup_session(&hash).unwrap(), None);
}

#[test]
fn test_token_stops_resuming_after_ttl() {
    let auth = setup().with_session_ttl(Some(Duration::from_millis(250)));
    let mut ctx = SessionContext::persistent();
    auth.login(&mut ctx, &Credentials::new("test@test.test", "password123")).unwrap();
    let token = ctx.token().unwrap().to_string();
    assert!(auth.resume(&token).unwrap().is_authenticated());

    std::thread::sleep(Duration::from_millis(400));
    assert!(!auth.resume(&token).unwrap().is_authenticated());
}

#[test]
fn test_token_without_ttl_never_expires() {
    let auth = setup().with_session_ttl(None);
    let mut ctx = SessionContext::persistent();
    auth.login(&mut ctx, &Credentials::new("test@test.test", "password123")).unwrap();

    let hash = hash_token(ctx.token().unwrap());
    let entry = auth.store().lookup_session(&hash).unwrap().unwrap();
    assert_eq!(entry.expires_at, None);
    assert_eq!(auth.purge_expired_sessions().unwrap(), 0);
}

#[test]
fn test_abandoned_logins_are_purged() {
    let auth = setup().with_session_ttl(Some(Duration::from_millis(20)));
    let tokens: Vec<String> = (0..10)
        .map(|_| {
            let mut ctx = SessionContext::persistent();
            auth.login(&mut ctx, &Credentials::new("test@test.test", "password123")).unwrap();
            ctx.token().unwrap().to_string()
        })
        .collect();

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(auth.purge_expired_sessions().unwrap(), 10);
    for token in &tokens {
        assert!(!auth.resume(token).unwrap().is_authenticated());
    }
}
