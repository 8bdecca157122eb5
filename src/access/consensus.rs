//! # Consensus Rule
//!
//! Maps the reviews cast on a request and the current size of the reviewer
//! directory to a single status.
//!
//! - any approval approves the request
//! - otherwise, rejection by every current reviewer rejects it
//! - otherwise it stays pending
//!
//! The reviewer count is read when the status is computed, not when the
//! request was created, so directory changes can move a request between
//! `pending` and `rejected` without a new review.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::review::{Decision, Review};

/// Derived status of an access request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status {other:?}")),
        }
    }
}

/// Vote counts for one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub approvals: u64,
    pub rejections: u64,
}

impl Tally {
    /// Count decisions; order does not matter
    pub fn from_decisions<I: IntoIterator<Item = Decision>>(decisions: I) -> Self {
        decisions
            .into_iter()
            .fold(Tally::default(), |mut tally, decision| {
                match decision {
                    Decision::Approved => tally.approvals += 1,
                    Decision::Rejected => tally.rejections += 1,
                }
                tally
            })
    }

    pub fn from_reviews(reviews: &[Review]) -> Self {
        Self::from_decisions(reviews.iter().map(|r| r.decision))
    }

    pub fn total(&self) -> u64 {
        self.approvals + self.rejections
    }
}

/// Apply the consensus rule
pub fn derive_status(tally: &Tally, total_reviewers: u64) -> RequestStatus {
    if tally.approvals > 0 {
        RequestStatus::Approved
    } else if total_reviewers > 0 && tally.rejections == total_reviewers {
        RequestStatus::Rejected
    } else {
        RequestStatus::Pending
    }
}

/// Result of recomputing a request's status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Consensus {
    pub tally: Tally,
    pub total_reviewers: u64,
    pub status: RequestStatus,
}

impl Consensus {
    pub fn compute(tally: Tally, total_reviewers: u64) -> Self {
        Self {
            tally,
            total_reviewers,
            status: derive_status(&tally, total_reviewers),
        }
    }
}
