//! # Access Errors
//!
//! Error types for access requests and the review ledger.

use thiserror::Error;

/// Result type for access request operations
pub type AccessResult<T> = Result<T, AccessError>;

/// Access request and review errors
#[derive(Debug, Clone, Error)]
pub enum AccessError {
    /// Malformed or missing request input
    #[error("{0}")]
    Validation(String),

    /// Decision other than approved/rejected
    #[error("Invalid decision: {0:?}")]
    InvalidDecision(String),

    /// Referenced request does not exist
    #[error("Request {0} not found")]
    RequestNotFound(i64),

    /// The reviewer already has a review on this request
    #[error("You have already reviewed this request")]
    AlreadyReviewed,

    /// Storage operation failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AccessError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::Validation(_) => 400,
            AccessError::InvalidDecision(_) => 400,
            AccessError::AlreadyReviewed => 400,
            AccessError::RequestNotFound(_) => 404,
            AccessError::Storage(_) => 500,
        }
    }
}

impl From<crate::store::StoreError> for AccessError {
    fn from(err: crate::store::StoreError) -> Self {
        AccessError::Storage(err.to_string())
    }
}
