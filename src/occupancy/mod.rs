//! # Room Occupancy
//!
//! Singleton state of the shared room.
//!
//! States are `Free` and `Occupied { by, since }`. Any authenticated admin
//! may occupy (overwriting the current holder) or release; reads are public.

mod errors;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

pub use errors::{OccupancyError, OccupancyResult};

use crate::auth::Identity;

/// State of the room. The holder and timestamp only exist while occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occupancy {
    Free,
    Occupied { by: String, since: DateTime<Utc> },
}

impl Occupancy {
    pub fn is_occupied(&self) -> bool {
        matches!(self, Occupancy::Occupied { .. })
    }

    /// Rebuild from the persisted columns, rejecting half-set rows
    pub fn from_parts(
        is_occupied: bool,
        by: Option<String>,
        since: Option<DateTime<Utc>>,
    ) -> OccupancyResult<Self> {
        match (is_occupied, by, since) {
            (false, None, None) => Ok(Occupancy::Free),
            (true, Some(by), Some(since)) => Ok(Occupancy::Occupied { by, since }),
            (occupied, by, since) => Err(OccupancyError::Corrupt(format!(
                "is_occupied={occupied} occupied_by={} occupied_since={}",
                by.is_some(),
                since.is_some()
            ))),
        }
    }
}

/// Public view of the room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatus {
    pub is_occupied: bool,
    pub occupied_by: Option<String>,
    /// Epoch milliseconds
    pub occupied_since: Option<i64>,
    pub room_name: String,
}

impl RoomStatus {
    pub fn new(occupancy: &Occupancy, room_name: &str) -> Self {
        let (occupied_by, occupied_since) = match occupancy {
            Occupancy::Free => (None, None),
            Occupancy::Occupied { by, since } => (Some(by.clone()), Some(since.timestamp_millis())),
        };

        Self {
            is_occupied: occupancy.is_occupied(),
            occupied_by,
            occupied_since,
            room_name: room_name.to_string(),
        }
    }
}

/// Persistence for the occupancy singleton
pub trait OccupancyStore: Send + Sync {
    fn load_occupancy(&self) -> OccupancyResult<Occupancy>;

    /// Replace the singleton atomically and return what was written
    fn store_occupancy(&self, occupancy: &Occupancy) -> OccupancyResult<Occupancy>;
}

/// The only mutator of the room state
pub struct OccupancyStateMachine<S: OccupancyStore> {
    store: Arc<S>,
    room_name: String,
}

impl<S: OccupancyStore> OccupancyStateMachine<S> {
    pub fn new(store: Arc<S>, room_name: impl Into<String>) -> Self {
        Self {
            store,
            room_name: room_name.into(),
        }
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    /// Current state, no authentication needed
    pub fn read(&self) -> OccupancyResult<RoomStatus> {
        let occupancy = self.store.load_occupancy()?;
        Ok(RoomStatus::new(&occupancy, &self.room_name))
    }

    /// Mark the room occupied by the caller, replacing any current holder
    pub fn occupy(&self, caller: &Identity) -> OccupancyResult<RoomStatus> {
        let occupancy = self.store.store_occupancy(&Occupancy::Occupied {
            by: caller.username().to_string(),
            since: Utc::now(),
        })?;

        info!(by = caller.username(), "Room occupied");
        Ok(RoomStatus::new(&occupancy, &self.room_name))
    }

    /// Mark the room free, whoever holds it
    pub fn release(&self, caller: &Identity) -> OccupancyResult<RoomStatus> {
        let occupancy = self.store.store_occupancy(&Occupancy::Free)?;

        info!(by = caller.username(), "Room released");
        Ok(RoomStatus::new(&occupancy, &self.room_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn machine() -> OccupancyStateMachine<SqliteStore> {
        OccupancyStateMachine::new(Arc::new(SqliteStore::in_memory().unwrap()), "Sala")
    }

    fn assert_field_exclusivity(status: &RoomStatus) {
        assert_eq!(!status.is_occupied, status.occupied_by.is_none());
        assert_eq!(!status.is_occupied, status.occupied_since.is_none());
    }

    #[test]
    fn test_starts_free() {
        let status = machine().read().unwrap();
        assert!(!status.is_occupied);
        assert_eq!(status.room_name, "Sala");
        assert_field_exclusivity(&status);
    }

    #[test]
    fn test_occupy_then_release() {
        let machine = machine();
        let alice = Identity::new(1, "alice");

        let status = machine.occupy(&alice).unwrap();
        assert!(status.is_occupied);
        assert_eq!(status.occupied_by.as_deref(), Some("alice"));
        assert_field_exclusivity(&status);
        assert_eq!(machine.read().unwrap(), status);

        let status = machine.release(&alice).unwrap();
        assert!(!status.is_occupied);
        assert_field_exclusivity(&status);
    }

    #[test]
    fn test_any_admin_can_take_over_or_release() {
        let machine = machine();
        let alice = Identity::new(1, "alice");
        let bob = Identity::new(2, "bob");

        machine.occupy(&alice).unwrap();
        let status = machine.occupy(&bob).unwrap();
        assert_eq!(status.occupied_by.as_deref(), Some("bob"));

        machine.occupy(&alice).unwrap();
        let status = machine.release(&bob).unwrap();
        assert!(!status.is_occupied);
    }

    #[test]
    fn test_release_when_free_is_idempotent() {
        let machine = machine();
        let alice = Identity::new(1, "alice");

        machine.release(&alice).unwrap();
        let status = machine.release(&alice).unwrap();
        assert!(!status.is_occupied);
    }

    #[test]
    fn test_half_set_rows_are_rejected() {
        assert!(Occupancy::from_parts(true, None, None).is_err());
        assert!(Occupancy::from_parts(false, Some("alice".into()), None).is_err());
        assert!(Occupancy::from_parts(true, Some("alice".into()), Some(Utc::now())).is_ok());
        assert_eq!(Occupancy::from_parts(false, None, None).unwrap(), Occupancy::Free);
    }
}
