//! HTTP adapter
//!
//! Form-driven sign-up, log-in and log-out over axum. The session token
//! travels in the `authflow_session` cookie.

use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::account::{Credentials, NewAccount};
use crate::auth::Authenticator;
use crate::constants::SESSION_COOKIE;
use crate::page::Pages;
use crate::session::SessionContext;
use crate::store::Store;

// ============================================================================
// State
// ============================================================================

#[derive(Debug)]
pub struct AppState<S> {
    pub auth: Authenticator<S>,
    pub pages: Pages,
}

impl<S: Store> AppState<S> {
    pub fn new(auth: Authenticator<S>) -> tera::Result<Self> {
        Ok(Self { auth, pages: Pages::new()? })
    }
}

#[derive(Serialize)]
struct HealthRes {
    status: &'static str,
    version: &'static str,
}

// ============================================================================
// Helpers
// ============================================================================

/// Session token from the request cookies, if any
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn set_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

fn internal(e: impl std::fmt::Display) -> Response {
    error!("request failed: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

fn page(status: StatusCode, body: tera::Result<String>) -> Response {
    match body {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => internal(e),
    }
}

fn context<S: Store>(state: &AppState<S>, headers: &HeaderMap) -> crate::Result<SessionContext> {
    match session_token(headers) {
        Some(token) => state.auth.resume(&token),
        None => Ok(SessionContext::persistent()),
    }
}

/// Welcome page plus the cookie that keeps the new session
fn signed_in<S: Store>(state: &AppState<S>, ctx: &SessionContext) -> Response {
    let body = match state.pages.landing(ctx.session()) {
        Ok(html) => html,
        Err(e) => return internal(e),
    };
    match ctx.token() {
        Some(token) => (StatusCode::OK, [(header::SET_COOKIE, set_cookie(token))], Html(body)).into_response(),
        None => (StatusCode::OK, Html(body)).into_response(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthRes> {
    Json(HealthRes { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

async fn root<S: Store>(State(state): State<Arc<AppState<S>>>, headers: HeaderMap) -> Response {
    match context(&state, &headers) {
        Ok(ctx) => page(StatusCode::OK, state.pages.landing(ctx.session())),
        Err(e) => internal(e),
    }
}

async fn sign_up_page<S: Store>(State(state): State<Arc<AppState<S>>>) -> Response {
    page(StatusCode::OK, state.pages.sign_up(&NewAccount::default(), &Default::default()))
}

async fn sign_up<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Form(form): Form<NewAccount>,
) -> Response {
    let mut ctx = match context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(e) => return internal(e),
    };
    match state.auth.register(&mut ctx, &form) {
        Ok(res) if res.success => signed_in(&state, &ctx),
        Ok(res) => page(StatusCode::UNPROCESSABLE_ENTITY, state.pages.sign_up(&form, &res.errors)),
        Err(e) => internal(e),
    }
}

async fn sign_in_page<S: Store>(State(state): State<Arc<AppState<S>>>) -> Response {
    page(StatusCode::OK, state.pages.sign_in(""))
}

async fn sign_in<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Form(form): Form<Credentials>,
) -> Response {
    let mut ctx = match context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(e) => return internal(e),
    };
    match state.auth.login(&mut ctx, &form) {
        Ok(res) if res.success => signed_in(&state, &ctx),
        Ok(_) => page(StatusCode::UNAUTHORIZED, state.pages.sign_in(&form.email)),
        Err(e) => internal(e),
    }
}

async fn sign_out<S: Store>(State(state): State<Arc<AppState<S>>>, headers: HeaderMap) -> Response {
    let mut ctx = match context(&state, &headers) {
        Ok(ctx) => ctx,
        Err(e) => return internal(e),
    };
    if let Err(e) = state.auth.logout(&mut ctx) {
        return internal(e);
    }
    match state.pages.sign_in("") {
        Ok(html) => (StatusCode::OK, [(header::SET_COOKIE, clear_cookie())], Html(html)).into_response(),
        Err(e) => internal(e),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router<S: Store + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(root::<S>))
        .route("/health", get(health))
        .route("/users/sign_up", get(sign_up_page::<S>).post(sign_up::<S>))
        .route("/users/sign_in", get(sign_in_page::<S>).post(sign_in::<S>))
        .route("/users/sign_out", post(sign_out::<S>).delete(sign_out::<S>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
