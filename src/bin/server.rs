//! authflow HTTP server
//!
//! Run with: cargo run --features server --bin authflow-server
//!
//! Endpoints:
//!   GET  /                 - Welcome page when signed in, login form otherwise
//!   GET  /health           - Health check
//!   GET  /users/sign_up    - Registration form
//!   POST /users/sign_up    - Register (email, username, password, password_confirmation)
//!   GET  /users/sign_in    - Login form
//!   POST /users/sign_in    - Log in (email, password)
//!   POST /users/sign_out   - Log out
//!
//! Environment: AUTHFLOW_DB, PORT, AUTHFLOW_MIN_PASSWORD_LENGTH,
//! AUTHFLOW_MAX_PASSWORD_LENGTH, AUTHFLOW_SESSION_TTL_SECS, RUST_LOG

use std::sync::Arc;
use std::time::Duration;

use authflow::server::{router, AppState};
use authflow::{Authenticator, Config, LmdbStore};
use tracing::{info, warn};

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!(path = %config.db_path, "opening database");
    let store = LmdbStore::open(&config.db_path)?;
    let auth = Authenticator::from_config(store, &config);
    let state = Arc::new(AppState::new(auth)?);

    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = sweeper.auth.purge_expired_sessions() {
                warn!(error = %e, "session purge failed");
            }
        }
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        %addr,
        min_password = config.policy.min_length,
        session_ttl_secs = config.session_ttl_secs,
        "authflow-server v{} listening",
        env!("CARGO_PKG_VERSION")
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}
