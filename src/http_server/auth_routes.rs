//! Auth HTTP Routes
//!
//! Login, logout and session verification. The session token is only ever
//! handed out as a cookie.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;

use super::cookies::{cleared_session_cookie, session_cookie, session_token};
use super::errors::ApiError;
use super::state::{require_identity, AppState};
use crate::auth::Credentials;

/// Auth routes with shared state
pub fn auth_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/verify", get(verify_handler))
        .with_state(state)
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub authenticated: bool,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ==================
// Handlers
// ==================

/// Login handler
async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(credentials) = payload?;
    let (token, identity) = state.identity.authenticate(&credentials)?;

    let cookie = session_cookie(
        &token.value,
        token.expires_at - Utc::now(),
        state.secure_cookie(),
    );

    Ok((
        [(SET_COOKIE, cookie.to_string())],
        Json(LoginResponse {
            success: true,
            username: identity.username().to_string(),
        }),
    ))
}

/// Logout handler
async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let identity = require_identity(&state, &headers)?;

    if let Some(token) = session_token(&headers) {
        state.identity.invalidate(&token);
    }
    tracing::info!(username = identity.username(), "Admin logged out");

    Ok((
        [(
            SET_COOKIE,
            cleared_session_cookie(state.secure_cookie()).to_string(),
        )],
        Json(SuccessResponse { success: true }),
    ))
}

/// Session check
async fn verify_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, ApiError> {
    let identity = require_identity(&state, &headers)?;

    Ok(Json(VerifyResponse {
        authenticated: true,
        username: identity.username().to_string(),
    }))
}
