//! roomwarden - shared room occupancy board with reviewer-voted access requests
//!
//! Admins mark the room occupied or free and vote on access requests
//! submitted by the public. A request is approved by any single approval and
//! rejected only when every current admin has rejected it.

pub mod access;
pub mod auth;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod occupancy;
pub mod store;
