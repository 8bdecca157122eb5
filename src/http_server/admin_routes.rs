//! Admin Management HTTP Routes
//!
//! Reviewer directory management. Every endpoint requires a session.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, Path, State,
    },
    http::HeaderMap,
    routing::{delete, get},
    Router,
};
use serde::Serialize;

use super::errors::ApiError;
use super::state::{require_identity, AppState};
use crate::auth::{AdminSummary, Credentials};

pub fn admin_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/admins", get(list_admins_handler).post(create_admin_handler))
        .route("/admins/:id", delete(delete_admin_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

async fn list_admins_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AdminSummary>>, ApiError> {
    let identity = require_identity(&state, &headers)?;
    Ok(Json(state.admins.list(&identity)?))
}

async fn create_admin_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = require_identity(&state, &headers)?;
    let Json(credentials) = payload?;

    state.admins.create(&identity, &credentials)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Admin created".to_string(),
    }))
}

async fn delete_admin_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = require_identity(&state, &headers)?;
    let Path(id) = id?;

    state.admins.remove(&identity, id)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Admin deleted".to_string(),
    }))
}
