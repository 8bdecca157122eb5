//! Configuration file structure
//!
//! Every field has a default, so running without a config file is valid.
//! Command-line flags and environment variables override file values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::crypto::DEFAULT_MIN_PASSWORD_LENGTH;
use crate::auth::jwt::DEFAULT_SESSION_TTL_DAYS;
use crate::auth::{JwtConfig, PasswordPolicy};
use crate::cli::{CliError, CliResult};
use crate::http_server::HttpServerConfig;

/// Signing secret used when none is configured. Fine for local testing only.
pub const DEFAULT_JWT_SECRET: &str = "default_secret_change_me";

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session token signing secret
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Session lifetime in days (default: 7)
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,

    /// Mark the session cookie `Secure` (set behind HTTPS)
    #[serde(default)]
    pub secure_cookie: bool,

    /// Minimum admin password length (default: 6)
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_session_ttl_days() -> i64 {
    DEFAULT_SESSION_TTL_DAYS
}

fn default_password_min_length() -> usize {
    DEFAULT_MIN_PASSWORD_LENGTH
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            session_ttl_days: default_session_ttl_days(),
            secure_cookie: false,
            password_min_length: default_password_min_length(),
        }
    }
}

impl AuthConfig {
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            session_ttl: chrono::Duration::days(self.session_ttl_days),
            ..JwtConfig::default()
        }
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            min_length: self.password_min_length,
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// SQLite database path (default: data/database.db)
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Display name of the room (default: "Sala")
    #[serde(default = "default_room_name")]
    pub room_name: String,

    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data").join("database.db")
}

fn default_room_name() -> String {
    "Sala".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            auth: AuthConfig::default(),
            db_path: default_db_path(),
            room_name: default_room_name(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        Ok(config)
    }

    /// Load from a file if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(CliError::config_error("auth.jwt_secret must not be empty"));
        }

        if self.auth.session_ttl_days < 1 {
            return Err(CliError::config_error(
                "auth.session_ttl_days must be at least 1",
            ));
        }

        if self.auth.password_min_length == 0 {
            return Err(CliError::config_error(
                "auth.password_min_length must be > 0",
            ));
        }

        if self.server.port == 0 {
            return Err(CliError::config_error("server.port must be > 0"));
        }

        if self.db_path.as_os_str().is_empty() {
            return Err(CliError::config_error("db_path must not be empty"));
        }

        Ok(())
    }
}
