//! # Review Ledger
//!
//! Append-only record of reviewer decisions. At most one review exists per
//! (request, reviewer) pair and reviews are never updated or retracted.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::consensus::Consensus;
use super::errors::{AccessError, AccessResult};
use crate::auth::Identity;

/// A reviewer's vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }
}

impl FromStr for Decision {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Decision::Approved),
            "rejected" => Ok(Decision::Rejected),
            other => Err(AccessError::InvalidDecision(other.to_string())),
        }
    }
}

/// A recorded review
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: i64,
    pub request_id: i64,
    /// Username at the time of review. Not a reference: the admin may since
    /// have been removed.
    #[serde(rename = "admin_username")]
    pub reviewer_username: String,
    pub decision: Decision,
    pub reviewed_at: DateTime<Utc>,
}

/// Review submission body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub decision: String,
}

/// What a successful submission produced
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub review: Review,
    pub consensus: Consensus,
}

/// Ledger storage
pub trait ReviewLedger: Send + Sync {
    /// Append a review and recompute the request's status.
    ///
    /// The existence check, the duplicate check, the insert and the
    /// recompute happen as one atomic unit: concurrent submissions by the
    /// same reviewer for the same request can't both succeed.
    fn submit_review(
        &self,
        request_id: i64,
        reviewer: &Identity,
        decision: Decision,
    ) -> AccessResult<ReviewOutcome>;

    /// Reviews for a request, newest first
    fn reviews_for(&self, request_id: i64) -> AccessResult<Vec<Review>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parsing() {
        assert_eq!("approved".parse::<Decision>().unwrap(), Decision::Approved);
        assert_eq!("rejected".parse::<Decision>().unwrap(), Decision::Rejected);
        assert!(matches!(
            "Approved".parse::<Decision>(),
            Err(AccessError::InvalidDecision(_))
        ));
        assert!(matches!(
            "".parse::<Decision>(),
            Err(AccessError::InvalidDecision(_))
        ));
    }

    #[test]
    fn test_review_serializes_reviewer_label() {
        let review = Review {
            id: 1,
            request_id: 7,
            reviewer_username: "alice".to_string(),
            decision: Decision::Rejected,
            reviewed_at: Utc::now(),
        };

        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["admin_username"], "alice");
        assert_eq!(json["decision"], "rejected");
    }
}
