//! Runtime configuration
//!
//! Read from environment variables the same way the server binary always has
//! (`AUTHFLOW_DB`, `PORT`), plus the password length bounds and the token
//! session lifetime.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DB_PATH, DEFAULT_MAX_PASSWORD_LENGTH, DEFAULT_MIN_PASSWORD_LENGTH, DEFAULT_PORT,
    DEFAULT_SESSION_TTL_SECS,
};
use crate::error::ConfigError;

pub const ENV_DB: &str = "AUTHFLOW_DB";
pub const ENV_PORT: &str = "PORT";
pub const ENV_MIN_PASSWORD: &str = "AUTHFLOW_MIN_PASSWORD_LENGTH";
pub const ENV_MAX_PASSWORD: &str = "AUTHFLOW_MAX_PASSWORD_LENGTH";
pub const ENV_SESSION_TTL: &str = "AUTHFLOW_SESSION_TTL_SECS";

/// Password length bounds, counted in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_PASSWORD_LENGTH,
            max_length: DEFAULT_MAX_PASSWORD_LENGTH,
        }
    }
}

impl PasswordPolicy {
    /// Build a policy, rejecting empty or inverted ranges
    pub fn new(min_length: usize, max_length: usize) -> Result<Self, ConfigError> {
        if min_length == 0 {
            return Err(ConfigError::ZeroMinimum);
        }
        if min_length > max_length {
            return Err(ConfigError::InvertedLengths { min: min_length, max: max_length });
        }
        Ok(Self { min_length, max_length })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub policy: PasswordPolicy,
    /// Lifetime of a token session in seconds; 0 means tokens never expire
    pub session_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.into(),
            port: DEFAULT_PORT,
            policy: PasswordPolicy::default(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Load from an arbitrary key lookup; missing keys fall back to defaults
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let db_path = lookup(ENV_DB).unwrap_or(defaults.db_path);
        let port = parse_var(&lookup, ENV_PORT)?.unwrap_or(defaults.port);
        let min = parse_var(&lookup, ENV_MIN_PASSWORD)?.unwrap_or(defaults.policy.min_length);
        let max = parse_var(&lookup, ENV_MAX_PASSWORD)?.unwrap_or(defaults.policy.max_length);
        let session_ttl_secs =
            parse_var(&lookup, ENV_SESSION_TTL)?.unwrap_or(defaults.session_ttl_secs);
        Ok(Self { db_path, port, policy: PasswordPolicy::new(min, max)?, session_ttl_secs })
    }

    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_secs > 0).then(|| Duration::from_secs(self.session_ttl_secs))
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::NotANumber { var, value: raw }),
    }
}
