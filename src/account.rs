//! Account records and the inputs that create or authenticate them

use serde::{Deserialize, Serialize};

/// A persisted identity. Only the salted digest of the password is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub email: String,
    pub username: String,
    pub password_digest: String,
    pub created_at: u64,
}

/// Registration candidate as submitted on the sign-up surface
///
/// `password_confirmation` is `None` when the field was not submitted at all,
/// which skips the confirmation check (seeded accounts are created this way).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: Option<String>,
}

impl NewAccount {
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        password_confirmation: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            password_confirmation: Some(password_confirmation.into()),
        }
    }

    /// Candidate without a confirmation field
    pub fn unconfirmed(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            password_confirmation: None,
        }
    }

    /// What an empty sign-up form submits: every field present and blank
    pub fn blank() -> Self {
        Self::new("", "", "", "")
    }
}

/// Login submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

/// Form fields that can carry validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Email,
    Username,
    Password,
    PasswordConfirmation,
}

impl Field {
    /// Human attribute name used as the prefix of full messages
    pub fn label(self) -> &'static str {
        match self {
            Field::Email => "Email",
            Field::Username => "Username",
            Field::Password => "Password",
            Field::PasswordConfirmation => "Password confirmation",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Emails are compared case-insensitively and without surrounding whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain`: exactly one `@`, non-empty on both sides, no whitespace
pub fn is_email_shaped(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Blank means empty or whitespace only
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
