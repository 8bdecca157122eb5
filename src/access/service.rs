//! # Access Service
//!
//! Request lifecycle operations. Public operations (submit, look up) take no
//! identity; reviewer operations require one.

use std::sync::Arc;

use tracing::info;

use super::consensus::Consensus;
use super::errors::AccessResult;
use super::request::{AccessRequestForm, RequestDetail, RequestStore, RequestSummary};
use super::review::{Decision, ReviewLedger, ReviewOutcome};
use crate::auth::Identity;

pub struct AccessService<S: RequestStore + ReviewLedger> {
    store: Arc<S>,
}

impl<S: RequestStore + ReviewLedger> AccessService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validate and persist a new request. Nothing is stored on validation
    /// failure.
    pub fn submit_request(&self, form: &AccessRequestForm) -> AccessResult<i64> {
        let request = form.validate()?;
        let id = self.store.insert_request(&request)?;

        info!(request_id = id, name = %request.name, "Access request submitted");
        Ok(id)
    }

    /// Request detail with freshly recomputed status
    pub fn get_request(&self, request_id: i64) -> AccessResult<RequestDetail> {
        self.store.request_detail(request_id)
    }

    /// All requests, newest first
    pub fn list_requests(&self, _reviewer: &Identity) -> AccessResult<Vec<RequestSummary>> {
        self.store.request_summaries()
    }

    /// Record a review and recompute the request's status
    pub fn submit_review(
        &self,
        reviewer: &Identity,
        request_id: i64,
        decision: &str,
    ) -> AccessResult<ReviewOutcome> {
        let decision: Decision = decision.parse()?;
        let outcome = self.store.submit_review(request_id, reviewer, decision)?;

        info!(
            request_id,
            reviewer = reviewer.username(),
            decision = decision.as_str(),
            approvals = outcome.consensus.tally.approvals,
            rejections = outcome.consensus.tally.rejections,
            total_reviewers = outcome.consensus.total_reviewers,
            status = %outcome.consensus.status,
            "Review recorded"
        );
        Ok(outcome)
    }

    /// Recompute a request's status against the current directory
    pub fn recompute_status(&self, request_id: i64) -> AccessResult<Consensus> {
        self.store.recompute_status(request_id)
    }

    /// Delete a request together with its reviews
    pub fn delete_request(&self, reviewer: &Identity, request_id: i64) -> AccessResult<()> {
        self.store.delete_request(request_id)?;

        info!(request_id, deleted_by = reviewer.username(), "Access request deleted");
        Ok(())
    }
}
