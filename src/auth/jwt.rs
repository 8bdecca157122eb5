//! # Session Tokens
//!
//! Signed, time-limited JSON Web Tokens carried in the session cookie.
//!
//! ## Invariants
//! - Stateless validation (no DB lookup)
//! - No secrets in token, only admin id and username

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};
use super::identity::Identity;

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (admin id)
    pub sub: String,

    /// Admin username
    pub username: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,

    /// Audience
    pub aud: String,

    /// Issuer
    pub iss: String,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing
    pub secret: String,

    /// Session token lifetime
    pub session_ttl: Duration,

    /// Issuer identifier
    pub issuer: String,

    /// Audience identifier
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: crate::config::DEFAULT_JWT_SECRET.to_string(),
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
            issuer: "roomwarden".to_string(),
            audience: "roomwarden".to_string(),
        }
    }
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    /// Create a new JWT manager with the given configuration
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a session token for an admin
    pub fn generate_token(&self, identity: &Identity) -> AuthResult<String> {
        let now = Utc::now();
        let exp = now + self.config.session_ttl;

        let claims = JwtClaims {
            sub: identity.id().to_string(),
            username: identity.username().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            aud: self.config.audience.clone(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerationFailed)
    }

    /// Validate a session token and extract claims
    pub fn validate_token(&self, token: &str) -> AuthResult<JwtClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);

        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AuthError::InvalidSignature
                    }
                    _ => AuthError::MalformedToken,
                }
            })?;

        Ok(token_data.claims)
    }

    /// Rebuild the principal from validated claims
    pub fn identity_from_claims(claims: &JwtClaims) -> AuthResult<Identity> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::MalformedToken)?;
        Ok(Identity::new(id, claims.username.clone()))
    }

    /// Expiry of a validated token
    pub fn expiration_of(claims: &JwtClaims) -> DateTime<Utc> {
        DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Configured session lifetime
    pub fn session_ttl(&self) -> Duration {
        self.config.session_ttl
    }
}
