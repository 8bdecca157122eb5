//! Access Request HTTP Routes
//!
//! Submission and lookup are public; listing, reviewing and deleting
//! require a session.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, Path, State,
    },
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use serde::Serialize;

use super::errors::ApiError;
use super::state::{require_identity, AppState};
use crate::access::{AccessRequestForm, RequestDetail, RequestStatus, RequestSummary, ReviewForm};

pub fn request_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/requests", get(list_requests_handler).post(submit_request_handler))
        .route(
            "/requests/:id",
            get(get_request_handler).delete(delete_request_handler),
        )
        .route("/requests/:id/review", post(review_handler))
        .with_state(state)
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub request_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub success: bool,
    pub message: String,
    pub new_status: RequestStatus,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// A path segment that cannot name a request is reported like a missing one
fn request_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|_| ApiError::NotFound("Request not found".to_string()))
}

// ==================
// Handlers
// ==================

async fn submit_request_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AccessRequestForm>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(form) = payload?;
    let request_id = state.access.submit_request(&form)?;

    Ok(Json(SubmitResponse {
        success: true,
        message: "Request submitted".to_string(),
        request_id,
    }))
}

async fn get_request_handler(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<RequestDetail>, ApiError> {
    let id = request_id(id)?;
    Ok(Json(state.access.get_request(id)?))
}

async fn list_requests_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<RequestSummary>>, ApiError> {
    let identity = require_identity(&state, &headers)?;
    Ok(Json(state.access.list_requests(&identity)?))
}

async fn review_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ReviewForm>, JsonRejection>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let identity = require_identity(&state, &headers)?;
    let id = request_id(id)?;
    let Json(form) = payload?;

    let outcome = state.access.submit_review(&identity, id, &form.decision)?;

    Ok(Json(ReviewResponse {
        success: true,
        message: format!("Request {}", outcome.review.decision.as_str()),
        new_status: outcome.consensus.status,
    }))
}

async fn delete_request_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = require_identity(&state, &headers)?;
    let id = request_id(id)?;

    state.access.delete_request(&identity, id)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Request deleted".to_string(),
    }))
}
