//! Messages, page markers and policy defaults

// Default password policy
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;
pub const DEFAULT_MAX_PASSWORD_LENGTH: usize = 128;

// Environment defaults
pub const DEFAULT_DB_PATH: &str = "./data/authflow.mdb";
pub const DEFAULT_PORT: u16 = 3000;

// Token sessions last two weeks unless configured otherwise; 0 disables expiry
pub const DEFAULT_SESSION_TTL_SECS: u64 = 14 * 24 * 60 * 60;

// Token and salt sizes in bytes
pub const TOKEN_BYTES: usize = 32;
pub const SALT_BYTES: usize = 16;

// Validation messages (attribute name is prefixed when rendered)
pub const BLANK: &str = "can't be blank";
pub const INVALID: &str = "is invalid";
pub const TAKEN: &str = "has already been taken";
pub const TOO_SHORT: &str = "is too short";
pub const TOO_LONG: &str = "is too long";
pub const CONFIRMATION_MISMATCH: &str = "doesn't match Password";

// Text the rendered surfaces are recognised by
pub const WELCOME: &str = "Welcome";
pub const LOG_IN: &str = "Log in";
pub const SIGN_UP: &str = "Sign up";
pub const SIGN_OUT: &str = "Sign out";

// Cookie carrying the session token in the HTTP adapter
pub const SESSION_COOKIE: &str = "authflow_session";
