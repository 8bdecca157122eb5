//! Persistence layer
//!
//! A single SQLite database holds the reviewer directory, the access
//! requests, the review ledger and the occupancy singleton. `SqliteStore`
//! implements every storage trait of the crate.

mod sqlite;

pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::access::AccessError;
use crate::auth::AuthError;
use crate::occupancy::OccupancyError;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<rusqlite::Error> for AccessError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::from(e).into()
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::from(e).into()
    }
}

impl From<rusqlite::Error> for OccupancyError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::from(e).into()
    }
}
