//! # Access Requests
//!
//! Request model, public submission form and the storage abstraction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::consensus::{Consensus, RequestStatus};
use super::errors::{AccessError, AccessResult};
use super::review::Review;

/// Minimum requester name length after trimming
pub const MIN_NAME_LENGTH: usize = 3;

/// A stored access request
#[derive(Debug, Clone, Serialize)]
pub struct AccessRequest {
    pub id: i64,
    /// Requester name
    pub name: String,
    pub email: Option<String>,
    pub reason: Option<String>,
    pub requested_date: String,
    pub requested_time: String,
    /// Status as of the last recompute
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Public submission body. Every field is optional at the wire level so
/// that missing values are reported as validation errors, not as
/// deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessRequestForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub requested_date: Option<String>,
    #[serde(default)]
    pub requested_time: Option<String>,
}

/// Validated request, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccessRequest {
    pub name: String,
    pub email: Option<String>,
    pub reason: Option<String>,
    pub requested_date: String,
    pub requested_time: String,
}

fn trimmed_non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl AccessRequestForm {
    /// Validate and normalize the form
    pub fn validate(&self) -> AccessResult<NewAccessRequest> {
        let name = trimmed_non_empty(self.name.as_deref())
            .ok_or_else(|| AccessError::Validation("Name is required".to_string()))?;

        if name.chars().count() < MIN_NAME_LENGTH {
            return Err(AccessError::Validation(format!(
                "Name must be at least {MIN_NAME_LENGTH} characters"
            )));
        }

        let requested_date = trimmed_non_empty(self.requested_date.as_deref());
        let requested_time = trimmed_non_empty(self.requested_time.as_deref());
        let (Some(requested_date), Some(requested_time)) = (requested_date, requested_time) else {
            return Err(AccessError::Validation(
                "Requested date and time are required".to_string(),
            ));
        };

        Ok(NewAccessRequest {
            name,
            email: trimmed_non_empty(self.email.as_deref()),
            reason: trimmed_non_empty(self.reason.as_deref()),
            requested_date,
            requested_time,
        })
    }
}

/// Request with its reviews and recomputed status
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: AccessRequest,
    pub reviews: Vec<Review>,
    pub approvals: u64,
    pub rejections: u64,
    #[serde(rename = "totalAdmins")]
    pub total_admins: u64,
    #[serde(rename = "finalStatus")]
    pub final_status: RequestStatus,
}

impl RequestDetail {
    pub fn new(mut request: AccessRequest, reviews: Vec<Review>, consensus: Consensus) -> Self {
        request.status = consensus.status;
        Self {
            request,
            reviews,
            approvals: consensus.tally.approvals,
            rejections: consensus.tally.rejections,
            total_admins: consensus.total_reviewers,
            final_status: consensus.status,
        }
    }
}

/// Row of the reviewer-facing request list
#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    #[serde(flatten)]
    pub request: AccessRequest,
    pub approvals: u64,
    pub rejections: u64,
    pub total_admins: u64,
    #[serde(rename = "finalStatus")]
    pub final_status: RequestStatus,
}

impl RequestSummary {
    pub fn new(mut request: AccessRequest, consensus: Consensus) -> Self {
        request.status = consensus.status;
        Self {
            request,
            approvals: consensus.tally.approvals,
            rejections: consensus.tally.rejections,
            total_admins: consensus.total_reviewers,
            final_status: consensus.status,
        }
    }
}

/// Request storage
pub trait RequestStore: Send + Sync {
    /// Persist a validated request with status `pending`, returning its id
    fn insert_request(&self, request: &NewAccessRequest) -> AccessResult<i64>;

    /// Recompute the status from the ledger and the current directory size,
    /// refreshing the cached status if it went stale.
    fn recompute_status(&self, request_id: i64) -> AccessResult<Consensus>;

    /// Request, its reviews and its recomputed status, read from one
    /// consistent snapshot
    fn request_detail(&self, request_id: i64) -> AccessResult<RequestDetail>;

    /// All requests, newest first, each with recomputed status
    fn request_summaries(&self) -> AccessResult<Vec<RequestSummary>>;

    /// Delete a request and its reviews
    fn delete_request(&self, request_id: i64) -> AccessResult<()>;
}
