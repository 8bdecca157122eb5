//! # Identity Provider
//!
//! Authenticates admins against the reviewer directory, issues session
//! tokens and verifies them on every authenticated operation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use super::admin::{Credentials, ReviewerDirectory};
use super::crypto::hash_token;
use super::errors::{AuthError, AuthResult};
use super::identity::Identity;
use super::jwt::{JwtConfig, JwtManager};

/// Issued session token
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Tokens invalidated by logout, keyed by fingerprint, kept until they would
/// have expired anyway.
#[derive(Debug, Default)]
struct RevokedTokens {
    tokens: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl RevokedTokens {
    fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> AuthResult<()> {
        let now = Utc::now();
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        tokens.retain(|_, exp| *exp > now);
        tokens.insert(hash_token(token), expires_at);
        Ok(())
    }

    fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        let tokens = self
            .tokens
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;
        Ok(tokens.contains_key(&hash_token(token)))
    }
}

/// Identity provider backed by a reviewer directory
pub struct IdentityProvider<D: ReviewerDirectory> {
    directory: Arc<D>,
    jwt_manager: JwtManager,
    revoked: RevokedTokens,
}

impl<D: ReviewerDirectory> IdentityProvider<D> {
    pub fn new(directory: Arc<D>, jwt_config: JwtConfig) -> Self {
        Self {
            directory,
            jwt_manager: JwtManager::new(jwt_config),
            revoked: RevokedTokens::default(),
        }
    }

    /// Check credentials and issue a session token
    pub fn authenticate(&self, credentials: &Credentials) -> AuthResult<(SessionToken, Identity)> {
        credentials.require_present()?;

        let admin = self
            .directory
            .find_by_username(credentials.username.trim())?
            .ok_or(AuthError::InvalidCredentials)?;

        if !admin.verify_password(&credentials.password)? {
            tracing::warn!(username = %admin.username, "Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let identity = admin.identity();
        let token = SessionToken {
            value: self.jwt_manager.generate_token(&identity)?,
            expires_at: Utc::now() + self.jwt_manager.session_ttl(),
        };

        tracing::info!(username = identity.username(), "Admin logged in");
        Ok((token, identity))
    }

    /// Verify a session token and return the principal it carries
    ///
    /// Stateless with respect to the directory: only the signature, expiry
    /// and the logout denylist are consulted.
    pub fn verify(&self, token: &str) -> AuthResult<Identity> {
        let claims = self.jwt_manager.validate_token(token)?;
        if self.revoked.is_revoked(token)? {
            return Err(AuthError::SessionRevoked);
        }
        JwtManager::identity_from_claims(&claims)
    }

    /// Invalidate a session token. Unknown or already-invalid tokens are ignored.
    pub fn invalidate(&self, token: &str) {
        let Ok(claims) = self.jwt_manager.validate_token(token) else {
            return;
        };

        if let Err(e) = self.revoked.revoke(token, JwtManager::expiration_of(&claims)) {
            tracing::error!(error = %e, "Failed to record revoked session");
        }
    }
}
