//! # Identity
//!
//! The authenticated principal threaded through every mutating operation.
//!
//! An `Identity` can only be obtained from [`IdentityProvider`] after a
//! successful login or token verification, so holding one is proof that the
//! caller was authenticated.
//!
//! [`IdentityProvider`]: super::provider::IdentityProvider

use serde::Serialize;

/// Authenticated admin principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    id: i64,
    username: String,
}

impl Identity {
    pub(crate) fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }

    /// Directory id of the admin
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Username of the admin, used as the reviewer label on reviews
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether this principal refers to the admin with the given id
    pub fn is(&self, admin_id: i64) -> bool {
        self.id == admin_id
    }
}
