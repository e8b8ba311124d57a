//! LMDB-backed store
//!
//! Layout:
//! - `accounts`: id -> account JSON
//! - `emails`:   normalized email -> id
//! - `sessions`: sha256(token) -> session entry JSON
//! - `meta`:     "last_id" -> highest id handed out

use std::path::{Path, PathBuf};

use byteorder::BigEndian;
use heed::types::{Str, U64};
use heed::{Database, Env, EnvOpenOptions};
use tracing::debug;

use crate::account::Account;
use crate::error::{AuthError, Result};
use crate::store::{
    current_epoch, email_taken, AccountDraft, AccountStore, SessionEntry, SessionStore,
};

type IdDb = Database<U64<BigEndian>, Str>;
type KeyDb = Database<Str, U64<BigEndian>>;
type RecordDb = Database<Str, Str>;

const LAST_ID: &str = "last_id";

pub struct LmdbStore {
    path: PathBuf,
    env: Env,
    accounts: IdDb,
    emails: KeyDb,
    sessions: RecordDb,
    meta: KeyDb,
}

impl std::fmt::Debug for LmdbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmdbStore").field("path", &self.path).finish()
    }
}

impl LmdbStore {
    /// Open (creating if needed) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        // SAFETY: LMDB requires no other process maps this path with different options.
        let env = unsafe { EnvOpenOptions::new().map_size(1 << 30).max_dbs(4).open(path)? };
        let mut tx = env.write_txn()?;
        let accounts: IdDb = env.create_database(&mut tx, Some("accounts"))?;
        let emails: KeyDb = env.create_database(&mut tx, Some("emails"))?;
        let sessions: RecordDb = env.create_database(&mut tx, Some("sessions"))?;
        let meta: KeyDb = env.create_database(&mut tx, Some("meta"))?;
        tx.commit()?;
        debug!(path = %path.display(), "lmdb store opened");
        Ok(Self { path: path.to_path_buf(), env, accounts, emails, sessions, meta })
    }

    /// Clear all databases (for testing)
    pub fn clear_all(&self) -> Result<()> {
        let mut tx = self.env.write_txn()?;
        self.accounts.clear(&mut tx)?;
        self.emails.clear(&mut tx)?;
        self.sessions.clear(&mut tx)?;
        self.meta.clear(&mut tx)?;
        tx.commit()?;
        Ok(())
    }

    fn decode(raw: &str) -> Result<Account> {
        serde_json::from_str(raw).map_err(AuthError::from)
    }
}

impl AccountStore for LmdbStore {
    fn create(&self, draft: AccountDraft) -> Result<Account> {
        let mut tx = self.env.write_txn()?;
        if self.emails.get(&tx, draft.email.as_str())?.is_some() {
            return Err(email_taken());
        }
        let id = self.meta.get(&tx, LAST_ID)?.unwrap_or(0) + 1;
        let account = Account {
            id,
            email: draft.email,
            username: draft.username,
            password_digest: draft.password_digest,
            created_at: current_epoch(),
        };
        let json = serde_json::to_string(&account)?;
        self.accounts.put(&mut tx, &id, json.as_str())?;
        self.emails.put(&mut tx, account.email.as_str(), &id)?;
        self.meta.put(&mut tx, LAST_ID, &id)?;
        tx.commit()?;
        debug!(id, "account stored");
        Ok(account)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let tx = self.env.read_txn()?;
        let Some(id) = self.emails.get(&tx, email)? else {
            return Ok(None);
        };
        let account = match self.accounts.get(&tx, &id)? {
            Some(raw) => Self::decode(raw)?,
            None => {
                return Err(AuthError::Corrupted(format!(
                    "email index points at missing account {}",
                    id
                )))
            }
        };
        Ok(Some(account))
    }

    fn find_by_id(&self, id: u64) -> Result<Option<Account>> {
        let tx = self.env.read_txn()?;
        let account = self.accounts.get(&tx, &id)?.map(Self::decode).transpose()?;
        Ok(account)
    }

    fn count(&self) -> Result<u64> {
        let tx = self.env.read_txn()?;
        let n = self.accounts.len(&tx)?;
        Ok(n)
    }
}

impl SessionStore for LmdbStore {
    fn insert_session(&self, token_hash: &str, entry: SessionEntry) -> Result<()> {
        let json = serde_json::to_string(&entry)?;
        let mut tx = self.env.write_txn()?;
        self.sessions.put(&mut tx, token_hash, json.as_str())?;
        tx.commit()?;
        Ok(())
    }

    fn lookup_session(&self, token_hash: &str) -> Result<Option<SessionEntry>> {
        let tx = self.env.read_txn()?;
        let entry = match self.sessions.get(&tx, token_hash)? {
            Some(raw) => Some(serde_json::from_str(raw)?),
            None => None,
        };
        Ok(entry)
    }

    fn remove_session(&self, token_hash: &str) -> Result<bool> {
        let mut tx = self.env.write_txn()?;
        let removed = self.sessions.delete(&mut tx, token_hash)?;
        tx.commit()?;
        Ok(removed)
    }

    fn purge_expired(&self, now: u64) -> Result<u64> {
        let mut tx = self.env.write_txn()?;
        let mut expired = Vec::new();
        for item in self.sessions.iter(&tx)? {
            let (hash, raw) = item?;
            let entry: SessionEntry = serde_json::from_str(raw)?;
            if entry.is_expired(now) {
                expired.push(hash.to_string());
            }
        }
        for hash in &expired {
            self.sessions.delete(&mut tx, hash.as_str())?;
        }
        tx.commit()?;
        debug!(purged = expired.len(), "expired sessions purged");
        Ok(expired.len() as u64)
    }
}
