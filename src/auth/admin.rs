//! # Admin Management
//!
//! Admin model and the reviewer directory abstraction.
//! Admins are the reviewers: the directory size is the population that the
//! unanimous-rejection rule counts against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::crypto::{hash_password, verify_password, PasswordPolicy};
use super::errors::{AuthError, AuthResult};
use super::identity::Identity;

/// Admin model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    /// Unique, immutable identifier assigned by the store
    pub id: i64,

    /// Login name (unique)
    pub username: String,

    /// Argon2id password hash (never plaintext)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the admin was provisioned
    pub created_at: DateTime<Utc>,
}

impl Admin {
    /// Verify a password against this admin's stored hash
    pub fn verify_password(&self, password: &str) -> AuthResult<bool> {
        verify_password(password, &self.password_hash)
    }

    /// Principal for this admin
    pub(crate) fn identity(&self) -> Identity {
        Identity::new(self.id, self.username.clone())
    }
}

/// Login / provisioning credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields present
    pub fn require_present(&self) -> AuthResult<()> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok(())
    }
}

/// An admin ready to be inserted: validated and hashed, no id yet
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub password_hash: String,
}

impl NewAdmin {
    /// Validate credentials against the policy and hash the password
    pub fn from_credentials(credentials: &Credentials, policy: &PasswordPolicy) -> AuthResult<Self> {
        credentials.require_present()?;
        policy.validate(&credentials.password)?;

        Ok(Self {
            username: credentials.username.trim().to_string(),
            password_hash: hash_password(&credentials.password)?,
        })
    }
}

/// Public view of an admin
#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Admin> for AdminSummary {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username.clone(),
            created_at: admin.created_at,
        }
    }
}

/// Reviewer directory
///
/// The current set of authorized reviewers. Membership changes over time.
pub trait ReviewerDirectory: Send + Sync {
    /// All admins, oldest first
    fn list(&self) -> AuthResult<Vec<Admin>>;

    /// Number of admins right now
    fn count(&self) -> AuthResult<u64>;

    /// Find an admin by id
    fn find_by_id(&self, id: i64) -> AuthResult<Option<Admin>>;

    /// Find an admin by username
    fn find_by_username(&self, username: &str) -> AuthResult<Option<Admin>>;

    /// Insert a new admin, failing with `UsernameTaken` on duplicates
    fn add(&self, admin: &NewAdmin) -> AuthResult<Admin>;

    /// Remove an admin, failing with `AdminNotFound` if absent.
    /// Past reviews by this admin are kept.
    fn remove(&self, id: i64) -> AuthResult<()>;
}

/// Directory operations gated by the caller's identity
pub struct AdminService<D: ReviewerDirectory> {
    directory: std::sync::Arc<D>,
    password_policy: PasswordPolicy,
}

impl<D: ReviewerDirectory> AdminService<D> {
    pub fn new(directory: std::sync::Arc<D>, password_policy: PasswordPolicy) -> Self {
        Self {
            directory,
            password_policy,
        }
    }

    /// List admins without their hashes
    pub fn list(&self, _caller: &Identity) -> AuthResult<Vec<AdminSummary>> {
        Ok(self
            .directory
            .list()?
            .iter()
            .map(AdminSummary::from)
            .collect())
    }

    /// Provision a new admin
    pub fn create(&self, caller: &Identity, credentials: &Credentials) -> AuthResult<AdminSummary> {
        let new_admin = NewAdmin::from_credentials(credentials, &self.password_policy)?;
        let admin = self.directory.add(&new_admin)?;

        tracing::info!(
            created_by = caller.username(),
            admin_id = admin.id,
            username = %admin.username,
            "Admin created"
        );
        Ok(AdminSummary::from(&admin))
    }

    /// Remove an admin. An admin may never remove themselves.
    pub fn remove(&self, caller: &Identity, admin_id: i64) -> AuthResult<()> {
        if caller.is(admin_id) {
            return Err(AuthError::SelfRemoval);
        }

        self.directory.remove(admin_id)?;

        tracing::info!(
            removed_by = caller.username(),
            admin_id,
            "Admin removed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_admin_hashes_password() {
        let creds = Credentials::new("alice", "password123");
        let admin = NewAdmin::from_credentials(&creds, &PasswordPolicy::default()).unwrap();

        assert_eq!(admin.username, "alice");
        assert_ne!(admin.password_hash, "password123");
        assert!(verify_password("password123", &admin.password_hash).unwrap());
    }

    #[test]
    fn test_short_password_rejected() {
        let creds = Credentials::new("alice", "12345");
        let result = NewAdmin::from_credentials(&creds, &PasswordPolicy::default());
        assert!(matches!(result, Err(AuthError::WeakPassword(_))));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let policy = PasswordPolicy::default();
        assert!(matches!(
            NewAdmin::from_credentials(&Credentials::new("", "password123"), &policy),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            NewAdmin::from_credentials(&Credentials::new("bob", ""), &policy),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_admin_serialization_omits_hash() {
        let admin = Admin {
            id: 1,
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&admin).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$argon2id$secret"));
    }
}
