//! Registration validation
//!
//! Every rule is checked on every submission and all violations are returned
//! together, so a form with several bad fields is reported in one round trip.

use serde::{Deserialize, Serialize};

use crate::account::{is_blank, is_email_shaped, normalize_email, Field, NewAccount};
use crate::config::PasswordPolicy;
use crate::constants::{BLANK, CONFIRMATION_MISMATCH, INVALID, TAKEN, TOO_LONG, TOO_SHORT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    /// Message prefixed with the attribute label, e.g. "Email is invalid"
    pub fn full_message(&self) -> String {
        format!("{} {}", self.field.label(), self.message)
    }
}

/// Ordered set of field errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push(FieldError { field, message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages (without label) recorded against one field
    pub fn on(&self, field: Field) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(FieldError::full_message).collect()
    }

    /// True if any full message equals `message`
    pub fn contains(&self, message: &str) -> bool {
        self.errors.iter().any(|e| e.full_message() == message)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

/// Check a registration candidate against the field rules.
///
/// `email_taken` is whether another account already holds the normalized
/// email; it is only consulted when the email is present and well formed.
pub fn validate_registration(
    candidate: &NewAccount,
    policy: &PasswordPolicy,
    email_taken: bool,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = normalize_email(&candidate.email);
    if email.is_empty() {
        errors.add(Field::Email, BLANK);
    } else if !is_email_shaped(&email) {
        errors.add(Field::Email, INVALID);
    } else if email_taken {
        errors.add(Field::Email, TAKEN);
    }

    if is_blank(&candidate.username) {
        errors.add(Field::Username, BLANK);
    }

    // Length rules only apply once something was typed
    let length = candidate.password.chars().count();
    if candidate.password.is_empty() {
        errors.add(Field::Password, BLANK);
    } else if length < policy.min_length {
        errors.add(Field::Password, TOO_SHORT);
    } else if length > policy.max_length {
        errors.add(Field::Password, TOO_LONG);
    }

    if let Some(confirmation) = &candidate.password_confirmation {
        if *confirmation != candidate.password {
            errors.add(Field::PasswordConfirmation, CONFIRMATION_MISMATCH);
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
