//! Occupancy errors

use thiserror::Error;

pub type OccupancyResult<T> = Result<T, OccupancyError>;

#[derive(Debug, Clone, Error)]
pub enum OccupancyError {
    /// The singleton row is missing or violates the occupied/holder pairing
    #[error("Corrupt occupancy record: {0}")]
    Corrupt(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<crate::store::StoreError> for OccupancyError {
    fn from(err: crate::store::StoreError) -> Self {
        OccupancyError::Storage(err.to_string())
    }
}
