//! Authentication module for authflow
//!
//! Registration, password login and logout over an injected store, plus
//! token-based session resumption for callers that keep sessions across
//! requests.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::account::{is_email_shaped, normalize_email, Account, Credentials, NewAccount};
use crate::config::{Config, PasswordPolicy};
use crate::constants::DEFAULT_SESSION_TTL_SECS;
use crate::error::{AuthError, Result};
use crate::password::{digest_password, generate_token, hash_token, verify_password};
use crate::session::SessionContext;
use crate::store::{current_epoch, AccountDraft, SessionEntry, Store};
use crate::validate::{validate_registration, ValidationErrors};

/// Outcome of a sign-up submission
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResult {
    pub success: bool,
    #[serde(skip)]
    pub account: Option<Account>,
    pub errors: ValidationErrors,
}

impl RegistrationResult {
    fn created(account: Account) -> Self {
        Self { success: true, account: Some(account), errors: ValidationErrors::new() }
    }

    fn rejected(errors: ValidationErrors) -> Self {
        Self { success: false, account: None, errors }
    }
}

/// Outcome of a login submission. Failure carries no reason.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub success: bool,
    #[serde(skip)]
    pub account: Option<Account>,
}

impl LoginResult {
    fn rejected() -> Self {
        Self { success: false, account: None }
    }
}

#[derive(Debug)]
pub struct Authenticator<S> {
    store: S,
    policy: PasswordPolicy,
    session_ttl: Option<Duration>,
}

impl<S: Store> Authenticator<S> {
    /// Authenticator with the default two-week token lifetime
    pub fn new(store: S, policy: PasswordPolicy) -> Self {
        Self { store, policy, session_ttl: Some(Duration::from_secs(DEFAULT_SESSION_TTL_SECS)) }
    }

    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(store, config.policy).with_session_ttl(config.session_ttl())
    }

    /// Lifetime of newly issued tokens; `None` issues tokens that never expire
    pub fn with_session_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    pub fn account_count(&self) -> Result<u64> {
        self.store.count()
    }

    /// Validate and persist an account without touching any session
    ///
    /// Fails with `AuthError::Validation` when any field rule is violated.
    pub fn create_account(&self, candidate: &NewAccount) -> Result<Account> {
        let email = normalize_email(&candidate.email);
        let taken = is_email_shaped(&email) && self.store.find_by_email(&email)?.is_some();
        validate_registration(candidate, &self.policy, taken).map_err(AuthError::Validation)?;

        let account = self.store.create(AccountDraft {
            email,
            username: candidate.username.trim().to_string(),
            password_digest: digest_password(&candidate.password)?,
        })?;
        info!(id = account.id, username = %account.username, "account created");
        Ok(account)
    }

    /// Sign up. On success the context is signed in as the new account.
    pub fn register(&self, ctx: &mut SessionContext, candidate: &NewAccount) -> Result<RegistrationResult> {
        let account = match self.create_account(candidate) {
            Ok(account) => account,
            Err(AuthError::Validation(errors)) => {
                debug!(errors = %errors, "registration rejected");
                return Ok(RegistrationResult::rejected(errors));
            }
            Err(e) => return Err(e),
        };
        self.end_session(ctx)?;
        self.start_session(ctx, &account)?;
        Ok(RegistrationResult::created(account))
    }

    /// Log in. Any prior session in the context ends first; on failure the
    /// context is left anonymous.
    pub fn login(&self, ctx: &mut SessionContext, credentials: &Credentials) -> Result<LoginResult> {
        self.end_session(ctx)?;
        match self.authenticate(credentials) {
            Ok(account) => {
                self.start_session(ctx, &account)?;
                info!(id = account.id, "login succeeded");
                Ok(LoginResult { success: true, account: Some(account) })
            }
            Err(AuthError::InvalidCredentials) => {
                warn!("login rejected");
                Ok(LoginResult::rejected())
            }
            Err(e) => Err(e),
        }
    }

    /// Log out. Always succeeds for a well-formed context, signed in or not.
    pub fn logout(&self, ctx: &mut SessionContext) -> Result<()> {
        if let Some(id) = ctx.session().account_id() {
            info!(id, "logout");
        }
        self.end_session(ctx)
    }

    /// Restore a context from a session token. Unknown, expired or orphaned
    /// tokens give an anonymous context rather than an error; the last two
    /// are deleted on the way.
    pub fn resume(&self, token: &str) -> Result<SessionContext> {
        let hash = hash_token(token);
        let Some(entry) = self.store.lookup_session(&hash)? else {
            return Ok(SessionContext::persistent());
        };
        if entry.is_expired(current_epoch()) {
            self.store.remove_session(&hash)?;
            debug!(id = entry.account_id, "expired session token dropped");
            return Ok(SessionContext::persistent());
        }
        match self.store.find_by_id(entry.account_id)? {
            Some(account) => Ok(SessionContext::resumed(&account, token.to_string())),
            None => {
                self.store.remove_session(&hash)?;
                Ok(SessionContext::persistent())
            }
        }
    }

    /// Create a token session for an existing account, returns token
    ///
    /// An id with no account behind it is rejected as `InvalidCredentials`.
    pub fn issue_token(&self, account_id: u64) -> Result<String> {
        if self.store.find_by_id(account_id)?.is_none() {
            return Err(AuthError::InvalidCredentials);
        }
        self.mint_token(account_id)
    }

    /// Delete every expired token session, returns how many were removed
    pub fn purge_expired_sessions(&self) -> Result<u64> {
        let purged = self.store.purge_expired(current_epoch())?;
        if purged > 0 {
            info!(purged, "expired sessions purged");
        }
        Ok(purged)
    }

    /// Revoke a session by token
    pub fn revoke_token(&self, token: &str) -> Result<bool> {
        self.store.remove_session(&hash_token(token))
    }

    fn authenticate(&self, credentials: &Credentials) -> Result<Account> {
        let email = normalize_email(&credentials.email);
        if email.is_empty() || credentials.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        let account = self.store.find_by_email(&email)?.ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(&account.password_digest, &credentials.password)? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(account)
    }

    fn mint_token(&self, account_id: u64) -> Result<String> {
        let token = generate_token()?;
        let created_at = current_epoch();
        let expires_at = self.session_ttl.map(|ttl| created_at + ttl.as_millis() as u64);
        self.store.insert_session(
            &hash_token(&token),
            SessionEntry { account_id, created_at, expires_at },
        )?;
        debug!(id = account_id, "session token issued");
        Ok(token)
    }

    fn start_session(&self, ctx: &mut SessionContext, account: &Account) -> Result<()> {
        let token = if ctx.is_persistent() { Some(self.mint_token(account.id)?) } else { None };
        ctx.sign_in(account, token);
        Ok(())
    }

    fn end_session(&self, ctx: &mut SessionContext) -> Result<()> {
        if let Some(token) = ctx.sign_out() {
            self.revoke_token(&token)?;
        }
        Ok(())
    }
}
