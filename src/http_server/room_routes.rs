//! Room HTTP Routes
//!
//! Public room status and the authenticated occupy/release transitions.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use serde::Serialize;

use super::errors::ApiError;
use super::state::{require_identity, AppState};
use crate::occupancy::RoomStatus;

pub fn room_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/occupy", post(occupy_handler))
        .route("/release", post(release_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct OccupancyResponse {
    pub success: bool,
    pub status: RoomStatus,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<RoomStatus>, ApiError> {
    Ok(Json(state.occupancy.read()?))
}

async fn occupy_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<OccupancyResponse>, ApiError> {
    let identity = require_identity(&state, &headers)?;
    let status = state.occupancy.occupy(&identity)?;

    Ok(Json(OccupancyResponse {
        success: true,
        status,
    }))
}

async fn release_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<OccupancyResponse>, ApiError> {
    let identity = require_identity(&state, &headers)?;
    let status = state.occupancy.release(&identity)?;

    Ok(Json(OccupancyResponse {
        success: true,
        status,
    }))
}
