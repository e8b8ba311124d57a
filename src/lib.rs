//! authflow - account registration, password login and logout
//!
//! ```no_run
//! use authflow::{Authenticator, Credentials, MemoryStore, NewAccount, PasswordPolicy, SessionContext};
//!
//! let auth = Authenticator::new(MemoryStore::new(), PasswordPolicy::default());
//! let mut ctx = SessionContext::new();
//!
//! let signed_up = auth
//!     .register(&mut ctx, &NewAccount::new("test@test.test", "testtest", "testtest", "testtest"))
//!     .unwrap();
//! assert!(signed_up.success && ctx.is_authenticated());
//!
//! auth.logout(&mut ctx).unwrap();
//! let logged_in = auth.login(&mut ctx, &Credentials::new("test@test.test", "testtest")).unwrap();
//! assert!(logged_in.success);
//! ```

pub mod account;
pub mod auth;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod password;
pub mod session;
pub mod store;
pub mod validate;

#[cfg(feature = "server")]
pub mod page;
#[cfg(feature = "server")]
pub mod server;

pub use account::{Account, Credentials, Field, NewAccount};
pub use auth::{Authenticator, LoginResult, RegistrationResult};
pub use config::{Config, PasswordPolicy};
pub use db::LmdbStore;
pub use error::{AuthError, ConfigError, Result};
pub use session::{Session, SessionContext};
pub use store::{AccountDraft, AccountStore, MemoryStore, SessionEntry, SessionStore, Store};
pub use validate::{validate_registration, FieldError, ValidationErrors};
