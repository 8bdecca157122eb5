//! # Access Requests
//!
//! Public access requests, the reviewer ledger and the consensus rule that
//! turns independent votes into a request status.

pub mod consensus;
pub mod errors;
pub mod request;
pub mod review;
pub mod service;

pub use consensus::{derive_status, Consensus, RequestStatus, Tally};
pub use errors::{AccessError, AccessResult};
pub use request::{
    AccessRequest, AccessRequestForm, NewAccessRequest, RequestDetail, RequestStore,
    RequestSummary,
};
pub use review::{Decision, Review, ReviewForm, ReviewLedger, ReviewOutcome};
pub use service::AccessService;
