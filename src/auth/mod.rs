//! # Auth Module
//!
//! Admin authentication and the reviewer directory.
//!
//! This module provides password hashing, signed session tokens, the
//! `Identity` principal and the directory of admins who review requests.

pub mod admin;
pub mod crypto;
pub mod errors;
pub mod identity;
pub mod jwt;
pub mod provider;

pub use admin::{Admin, AdminService, AdminSummary, Credentials, NewAdmin, ReviewerDirectory};
pub use crypto::PasswordPolicy;
pub use errors::{AuthError, AuthResult};
pub use identity::Identity;
pub use jwt::{JwtClaims, JwtConfig, JwtManager};
pub use provider::{IdentityProvider, SessionToken};
