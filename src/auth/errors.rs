//! # Auth Errors
//!
//! Error types for the authentication module.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and reviewer-directory errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Authentication Errors
    // ==================

    /// Unknown username or wrong password (generic - don't leak which)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No session token was presented
    #[error("Authentication required")]
    AuthenticationRequired,

    // ==================
    // Token Errors
    // ==================

    /// Token is malformed
    #[error("Malformed token")]
    MalformedToken,

    /// Token has expired
    #[error("Token expired")]
    TokenExpired,

    /// Token signature is invalid
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token was invalidated by logout
    #[error("Session has been revoked")]
    SessionRevoked,

    // ==================
    // Directory Errors
    // ==================

    /// Username missing or empty
    #[error("Username and password are required")]
    MissingCredentials,

    /// Password does not meet requirements
    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    /// Username already taken
    #[error("Username already exists")]
    UsernameTaken,

    /// No admin with this id
    #[error("Admin not found")]
    AdminNotFound,

    /// An admin tried to remove their own account
    #[error("You cannot delete your own account")]
    SelfRemoval,

    // ==================
    // Internal Errors
    // ==================

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Token generation failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,

    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request (conflicts share 400 with validation)
            AuthError::MissingCredentials => 400,
            AuthError::WeakPassword(_) => 400,
            AuthError::UsernameTaken => 400,
            AuthError::SelfRemoval => 400,

            // 401 Unauthorized
            AuthError::InvalidCredentials => 401,
            AuthError::AuthenticationRequired => 401,
            AuthError::MalformedToken => 401,
            AuthError::TokenExpired => 401,
            AuthError::InvalidSignature => 401,
            AuthError::SessionRevoked => 401,

            // 404 Not Found
            AuthError::AdminNotFound => 404,

            // 500 Internal Server Error
            AuthError::HashingFailed => 500,
            AuthError::TokenGenerationFailed => 500,
            AuthError::StorageError(_) => 500,
        }
    }
}

impl From<crate::store::StoreError> for AuthError {
    fn from(err: crate::store::StoreError) -> Self {
        AuthError::StorageError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::TokenExpired.status_code(), 401);
        assert_eq!(AuthError::UsernameTaken.status_code(), 400);
        assert_eq!(AuthError::SelfRemoval.status_code(), 400);
        assert_eq!(AuthError::AdminNotFound.status_code(), 404);
        assert_eq!(AuthError::HashingFailed.status_code(), 500);
    }

    #[test]
    fn test_error_messages_do_not_leak_info() {
        let err = AuthError::InvalidCredentials;
        assert!(!err.to_string().contains("password"));
        assert!(!err.to_string().contains("username"));
    }
}
