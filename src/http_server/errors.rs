//! API Errors
//!
//! The error taxonomy every endpoint reports in, and its mapping to HTTP.
//! Conflicts (duplicate username, duplicate review, self-deletion) are
//! reported as 400 like validation failures.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::access::AccessError;
use crate::auth::AuthError;
use crate::occupancy::OccupancyError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or expired session
    #[error("{0}")]
    Auth(String),

    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// Duplicate or self-referential operation
    #[error("{0}")]
    Conflict(String),

    /// Storage failure. The detail is logged, never returned.
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl ApiError {
    /// Categorize a subsystem error by the HTTP status it declares
    fn from_status(code: u16, message: String) -> Self {
        match code {
            401 => ApiError::Auth(message),
            404 => ApiError::NotFound(message),
            code if code >= 500 => ApiError::Internal(message),
            _ => ApiError::Validation(message),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UsernameTaken | AuthError::SelfRemoval => ApiError::Conflict(err.to_string()),
            other => ApiError::from_status(other.status_code(), other.to_string()),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::AlreadyReviewed => ApiError::Conflict(err.to_string()),
            AccessError::RequestNotFound(_) => ApiError::NotFound("Request not found".to_string()),
            other => ApiError::from_status(other.status_code(), other.to_string()),
        }
    }
}

impl From<OccupancyError> for ApiError {
    fn from(err: OccupancyError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
