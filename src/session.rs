//! Request-scoped session state
//!
//! A session is either anonymous or bound to one account. The context carries
//! it through a single request together with the token that restored it, if any.

use serde::Serialize;

use crate::account::Account;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        account_id: u64,
        email: String,
        username: String,
    },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn account_id(&self) -> Option<u64> {
        match self {
            Session::Authenticated { account_id, .. } => Some(*account_id),
            Session::Anonymous => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Session::Authenticated { username, .. } => Some(username.as_str()),
            Session::Anonymous => None,
        }
    }
}

impl From<&Account> for Session {
    fn from(account: &Account) -> Self {
        Session::Authenticated {
            account_id: account.id,
            email: account.email.clone(),
            username: account.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    session: Session,
    token: Option<String>,
    persistent: bool,
}

impl SessionContext {
    /// Anonymous context; successful sign-in only changes in-memory state
    pub fn new() -> Self {
        Self::default()
    }

    /// Anonymous context that gets a session token on successful sign-in
    pub fn persistent() -> Self {
        Self { persistent: true, ..Self::default() }
    }

    /// Context restored from a token
    pub(crate) fn resumed(account: &Account, token: String) -> Self {
        Self { session: Session::from(account), token: Some(token), persistent: true }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub(crate) fn sign_in(&mut self, account: &Account, token: Option<String>) {
        self.session = Session::from(account);
        self.token = token;
    }

    /// Drop back to anonymous, handing back the token that must be revoked
    pub(crate) fn sign_out(&mut self) -> Option<String> {
        self.session = Session::Anonymous;
        self.token.take()
    }
}
