//! Error types for authflow

use thiserror::Error;

use crate::validate::ValidationErrors;

/// The main error type for authflow operations
///
/// Input problems (`Validation`, `InvalidCredentials`) are recoverable and are
/// normally folded into `RegistrationResult` / `LoginResult` by the
/// authenticator. Everything else is an infrastructure failure.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("storage error: {0}")]
    Storage(#[from] heed::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("random source unavailable: {0}")]
    Random(getrandom::Error),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("corrupted record: {0}")]
    Corrupted(String),
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::PasswordHash(err.to_string())
    }
}

/// Result type alias for authflow operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Configuration loading errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    NotANumber { var: &'static str, value: String },

    #[error("minimum password length {min} exceeds maximum {max}")]
    InvertedLengths { min: usize, max: usize },

    #[error("minimum password length must be at least 1")]
    ZeroMinimum,
}
