//! Storage seams and the in-memory store
//!
//! The authenticator only talks to these traits, so it runs the same against
//! `MemoryStore` in tests and `LmdbStore` on disk.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::{Account, Field};
use crate::constants::TAKEN;
use crate::error::{AuthError, Result};
use crate::validate::ValidationErrors;

/// Everything needed to persist an account; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDraft {
    pub email: String,
    pub username: String,
    pub password_digest: String,
}

pub trait AccountStore: Send + Sync {
    /// Persist a new account. An email that is already present fails with
    /// `AuthError::Validation` carrying "Email has already been taken".
    fn create(&self, draft: AccountDraft) -> Result<Account>;
    fn find_by_email(&self, email: &str) -> Result<Option<Account>>;
    fn find_by_id(&self, id: u64) -> Result<Option<Account>>;
    fn count(&self) -> Result<u64>;
}

/// A token session as stored. Times are ms since epoch; `expires_at: None`
/// never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub account_id: u64,
    pub created_at: u64,
    pub expires_at: Option<u64>,
}

impl SessionEntry {
    pub fn is_expired(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// Token sessions, keyed by the SHA-256 of the token
pub trait SessionStore: Send + Sync {
    fn insert_session(&self, token_hash: &str, entry: SessionEntry) -> Result<()>;
    fn lookup_session(&self, token_hash: &str) -> Result<Option<SessionEntry>>;
    fn remove_session(&self, token_hash: &str) -> Result<bool>;
    /// Drop every session expired at `now`, returning how many went
    fn purge_expired(&self, now: u64) -> Result<u64>;
}

/// Both halves together, which is what the authenticator needs
pub trait Store: AccountStore + SessionStore {}
impl<T: AccountStore + SessionStore> Store for T {}

pub(crate) fn email_taken() -> AuthError {
    let mut errors = ValidationErrors::new();
    errors.add(Field::Email, TAKEN);
    AuthError::Validation(errors)
}

pub(crate) fn current_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Default)]
struct Tables {
    accounts: BTreeMap<u64, Account>,
    emails: HashMap<String, u64>,
    sessions: HashMap<String, SessionEntry>,
    last_id: u64,
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl AccountStore for MemoryStore {
    fn create(&self, draft: AccountDraft) -> Result<Account> {
        let mut t = self.tables();
        if t.emails.contains_key(&draft.email) {
            return Err(email_taken());
        }
        t.last_id += 1;
        let account = Account {
            id: t.last_id,
            email: draft.email,
            username: draft.username,
            password_digest: draft.password_digest,
            created_at: current_epoch(),
        };
        t.emails.insert(account.email.clone(), account.id);
        t.accounts.insert(account.id, account.clone());
        debug!(id = account.id, "account stored in memory");
        Ok(account)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let t = self.tables();
        Ok(t.emails.get(email).and_then(|id| t.accounts.get(id)).cloned())
    }

    fn find_by_id(&self, id: u64) -> Result<Option<Account>> {
        Ok(self.tables().accounts.get(&id).cloned())
    }

    fn count(&self) -> Result<u64> {
        Ok(self.tables().accounts.len() as u64)
    }
}

impl SessionStore for MemoryStore {
    fn insert_session(&self, token_hash: &str, entry: SessionEntry) -> Result<()> {
        self.tables().sessions.insert(token_hash.to_string(), entry);
        Ok(())
    }

    fn lookup_session(&self, token_hash: &str) -> Result<Option<SessionEntry>> {
        Ok(self.tables().sessions.get(token_hash).copied())
    }

    fn remove_session(&self, token_hash: &str) -> Result<bool> {
        Ok(self.tables().sessions.remove(token_hash).is_some())
    }

    fn purge_expired(&self, now: u64) -> Result<u64> {
        let mut t = self.tables();
        let before = t.sessions.len();
        t.sessions.retain(|_, entry| !entry.is_expired(now));
        Ok((before - t.sessions.len()) as u64)
    }
}
