//! Shared HTTP state
//!
//! One store backs every service; the services are the only way handlers
//! reach it.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::cookies::session_token;
use super::errors::ApiError;
use crate::access::AccessService;
use crate::auth::{AdminService, AuthError, Identity, IdentityProvider, ReviewerDirectory};
use crate::config::Config;
use crate::occupancy::OccupancyStateMachine;
use crate::store::SqliteStore;

pub struct AppState {
    pub identity: IdentityProvider<SqliteStore>,
    pub admins: AdminService<SqliteStore>,
    pub access: AccessService<SqliteStore>,
    pub occupancy: OccupancyStateMachine<SqliteStore>,
    directory: Arc<SqliteStore>,
    secure_cookie: bool,
}

impl AppState {
    pub fn new(store: Arc<SqliteStore>, config: &Config) -> Self {
        Self {
            identity: IdentityProvider::new(store.clone(), config.auth.jwt_config()),
            admins: AdminService::new(store.clone(), config.auth.password_policy()),
            access: AccessService::new(store.clone()),
            occupancy: OccupancyStateMachine::new(store.clone(), config.room_name.clone()),
            directory: store,
            secure_cookie: config.auth.secure_cookie,
        }
    }

    pub fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }

    /// Number of admins currently in the directory
    pub fn admin_count(&self) -> Result<u64, ApiError> {
        Ok(self.directory.count()?)
    }
}

/// Verify the session cookie and produce the caller's identity
pub fn require_identity(state: &AppState, headers: &HeaderMap) -> Result<Identity, ApiError> {
    let token = session_token(headers).ok_or(AuthError::AuthenticationRequired)?;
    Ok(state.identity.verify(&token)?)
}
