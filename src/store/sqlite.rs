//! SQLite-based store implementation

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, warn};

use super::{StoreError, StoreResult};
use crate::access::{
    AccessError, AccessRequest, AccessResult, Consensus, Decision, NewAccessRequest,
    RequestDetail, RequestStatus, RequestStore, RequestSummary, Review, ReviewLedger,
    ReviewOutcome, Tally,
};
use crate::auth::{Admin, AuthError, AuthResult, Identity, NewAdmin, ReviewerDirectory};
use crate::occupancy::{Occupancy, OccupancyError, OccupancyResult, OccupancyStore};

const REQUEST_COLUMNS: &str =
    "id, name, email, reason, requested_date, requested_time, status, created_at";

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.display(), journal_mode = %mode, "Store opened");

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            warn!("Store lock poisoned");
            StoreError::LockPoisoned
        })
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.pragma_update(None, "foreign_keys", true)?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS admins (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Occupancy singleton
            CREATE TABLE IF NOT EXISTS room_status (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                is_occupied INTEGER NOT NULL DEFAULT 0,
                occupied_by TEXT,
                occupied_since TEXT,
                updated_at TEXT,
                CHECK (
                    (is_occupied = 0 AND occupied_by IS NULL AND occupied_since IS NULL)
                    OR (is_occupied = 1 AND occupied_by IS NOT NULL AND occupied_since IS NOT NULL)
                )
            );

            CREATE TABLE IF NOT EXISTS access_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT,
                reason TEXT,
                requested_date TEXT NOT NULL,
                requested_time TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL
            );

            -- Review ledger (append-only). Reviewer is a label, not a reference.
            CREATE TABLE IF NOT EXISTS request_reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                request_id INTEGER NOT NULL
                    REFERENCES access_requests(id) ON DELETE CASCADE,
                admin_username TEXT NOT NULL,
                decision TEXT NOT NULL CHECK (decision IN ('approved', 'rejected')),
                reviewed_at TEXT NOT NULL,
                UNIQUE (request_id, admin_username)
            );

            CREATE INDEX IF NOT EXISTS idx_reviews_request ON request_reviews(request_id);
            CREATE INDEX IF NOT EXISTS idx_requests_created ON access_requests(created_at);

            INSERT OR IGNORE INTO room_status (id, is_occupied) VALUES (1, 0);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

// ==================
// Row helpers
// ==================

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn admin_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Admin> {
    Ok(Admin {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn request_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccessRequest> {
    Ok(AccessRequest {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        reason: row.get(3)?,
        requested_date: row.get(4)?,
        requested_time: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn review_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        request_id: row.get(1)?,
        reviewer_username: row.get(2)?,
        decision: row.get(3)?,
        reviewed_at: row.get(4)?,
    })
}

fn load_request(conn: &Connection, request_id: i64) -> rusqlite::Result<Option<AccessRequest>> {
    conn.query_row(
        &format!("SELECT {REQUEST_COLUMNS} FROM access_requests WHERE id = ?"),
        [request_id],
        request_from_row,
    )
    .optional()
}

fn request_exists(conn: &Connection, request_id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM access_requests WHERE id = ?)",
        [request_id],
        |row| row.get(0),
    )
}

fn load_reviews(conn: &Connection, request_id: i64) -> rusqlite::Result<Vec<Review>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, request_id, admin_username, decision, reviewed_at
        FROM request_reviews
        WHERE request_id = ?
        ORDER BY reviewed_at DESC, id DESC
        "#,
    )?;
    let rows = stmt.query_map([request_id], review_from_row)?;
    rows.collect()
}

fn count_admins(conn: &Connection) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

fn tally_for(conn: &Connection, request_id: i64) -> rusqlite::Result<Tally> {
    let mut stmt = conn.prepare("SELECT decision FROM request_reviews WHERE request_id = ?")?;
    let decisions = stmt
        .query_map([request_id], |row| row.get::<_, Decision>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Tally::from_decisions(decisions))
}

fn all_tallies(conn: &Connection) -> rusqlite::Result<HashMap<i64, Tally>> {
    let mut stmt = conn.prepare("SELECT request_id, decision FROM request_reviews")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, Decision>(1)?))
    })?;

    let mut tallies: HashMap<i64, Tally> = HashMap::new();
    for row in rows {
        let (request_id, decision) = row?;
        let tally = tallies.entry(request_id).or_default();
        match decision {
            Decision::Approved => tally.approvals += 1,
            Decision::Rejected => tally.rejections += 1,
        }
    }
    Ok(tallies)
}

/// Write the recomputed status back if the cached one went stale
fn refresh_cached_status(
    conn: &Connection,
    request_id: i64,
    status: RequestStatus,
) -> rusqlite::Result<()> {
    let changed = conn.execute(
        "UPDATE access_requests SET status = ?1 WHERE id = ?2 AND status <> ?1",
        params![status, request_id],
    )?;
    if changed > 0 {
        debug!(request_id, status = %status, "Cached request status refreshed");
    }
    Ok(())
}

// ==================
// Reviewer directory
// ==================

impl ReviewerDirectory for SqliteStore {
    fn list(&self) -> AuthResult<Vec<Admin>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, created_at FROM admins ORDER BY id",
        )?;
        let admins = stmt
            .query_map([], admin_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(admins)
    }

    fn count(&self) -> AuthResult<u64> {
        let conn = self.lock()?;
        Ok(count_admins(&conn)?)
    }

    fn find_by_id(&self, id: i64) -> AuthResult<Option<Admin>> {
        let conn = self.lock()?;
        let admin = conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM admins WHERE id = ?",
                [id],
                admin_from_row,
            )
            .optional()?;
        Ok(admin)
    }

    fn find_by_username(&self, username: &str) -> AuthResult<Option<Admin>> {
        let conn = self.lock()?;
        let admin = conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM admins WHERE username = ?",
                [username],
                admin_from_row,
            )
            .optional()?;
        Ok(admin)
    }

    fn add(&self, admin: &NewAdmin) -> AuthResult<Admin> {
        let conn = self.lock()?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO admins (username, password_hash, created_at) VALUES (?, ?, ?)",
            params![admin.username, admin.password_hash, created_at],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UsernameTaken
            } else {
                AuthError::from(e)
            }
        })?;

        let id = conn.last_insert_rowid();
        debug!(admin_id = id, username = %admin.username, "Admin inserted");

        Ok(Admin {
            id,
            username: admin.username.clone(),
            password_hash: admin.password_hash.clone(),
            created_at,
        })
    }

    fn remove(&self, id: i64) -> AuthResult<()> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM admins WHERE id = ?", [id])?;
        if removed == 0 {
            return Err(AuthError::AdminNotFound);
        }
        Ok(())
    }
}

// ==================
// Requests and ledger
// ==================

impl RequestStore for SqliteStore {
    fn insert_request(&self, request: &NewAccessRequest) -> AccessResult<i64> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO access_requests
                (name, email, reason, requested_date, requested_time, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                request.name,
                request.email,
                request.reason,
                request.requested_date,
                request.requested_time,
                RequestStatus::Pending,
                Utc::now(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn recompute_status(&self, request_id: i64) -> AccessResult<Consensus> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if !request_exists(&tx, request_id)? {
            return Err(AccessError::RequestNotFound(request_id));
        }

        let consensus = Consensus::compute(tally_for(&tx, request_id)?, count_admins(&tx)?);
        refresh_cached_status(&tx, request_id, consensus.status)?;
        tx.commit()?;

        Ok(consensus)
    }

    fn request_detail(&self, request_id: i64) -> AccessResult<RequestDetail> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let request =
            load_request(&tx, request_id)?.ok_or(AccessError::RequestNotFound(request_id))?;
        let reviews = load_reviews(&tx, request_id)?;
        let consensus = Consensus::compute(Tally::from_reviews(&reviews), count_admins(&tx)?);

        refresh_cached_status(&tx, request_id, consensus.status)?;
        tx.commit()?;

        Ok(RequestDetail::new(request, reviews, consensus))
    }

    fn request_summaries(&self) -> AccessResult<Vec<RequestSummary>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let requests = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {REQUEST_COLUMNS} FROM access_requests ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], request_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        let total_admins = count_admins(&tx)?;
        let tallies = all_tallies(&tx)?;

        let mut summaries = Vec::with_capacity(requests.len());
        for request in requests {
            let tally = tallies.get(&request.id).copied().unwrap_or_default();
            let consensus = Consensus::compute(tally, total_admins);
            if consensus.status != request.status {
                refresh_cached_status(&tx, request.id, consensus.status)?;
            }
            summaries.push(RequestSummary::new(request, consensus));
        }
        tx.commit()?;

        Ok(summaries)
    }

    fn delete_request(&self, request_id: i64) -> AccessResult<()> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM access_requests WHERE id = ?", [request_id])?;
        if removed == 0 {
            return Err(AccessError::RequestNotFound(request_id));
        }
        Ok(())
    }
}

impl ReviewLedger for SqliteStore {
    fn submit_review(
        &self,
        request_id: i64,
        reviewer: &Identity,
        decision: Decision,
    ) -> AccessResult<ReviewOutcome> {
        let mut conn = self.lock()?;
        // Check-and-insert must also be atomic across processes sharing the file.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !request_exists(&tx, request_id)? {
            return Err(AccessError::RequestNotFound(request_id));
        }

        let already_reviewed: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM request_reviews WHERE request_id = ? AND admin_username = ?)",
            params![request_id, reviewer.username()],
            |row| row.get(0),
        )?;
        if already_reviewed {
            return Err(AccessError::AlreadyReviewed);
        }

        let reviewed_at = Utc::now();
        tx.execute(
            r#"
            INSERT INTO request_reviews (request_id, admin_username, decision, reviewed_at)
            VALUES (?, ?, ?, ?)
            "#,
            params![request_id, reviewer.username(), decision, reviewed_at],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                AccessError::AlreadyReviewed
            } else {
                AccessError::from(e)
            }
        })?;
        let review_id = tx.last_insert_rowid();

        let consensus = Consensus::compute(tally_for(&tx, request_id)?, count_admins(&tx)?);
        refresh_cached_status(&tx, request_id, consensus.status)?;
        tx.commit()?;

        Ok(ReviewOutcome {
            review: Review {
                id: review_id,
                request_id,
                reviewer_username: reviewer.username().to_string(),
                decision,
                reviewed_at,
            },
            consensus,
        })
    }

    fn reviews_for(&self, request_id: i64) -> AccessResult<Vec<Review>> {
        let conn = self.lock()?;
        Ok(load_reviews(&conn, request_id)?)
    }
}

// ==================
// Occupancy
// ==================

fn load_occupancy(conn: &Connection) -> OccupancyResult<Occupancy> {
    let row = conn
        .query_row(
            "SELECT is_occupied, occupied_by, occupied_since FROM room_status WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, bool>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<DateTime<Utc>>>(2)?,
                ))
            },
        )
        .optional()?;

    let (is_occupied, by, since) =
        row.ok_or_else(|| OccupancyError::Corrupt("room_status row missing".to_string()))?;
    Occupancy::from_parts(is_occupied, by, since)
}

impl OccupancyStore for SqliteStore {
    fn load_occupancy(&self) -> OccupancyResult<Occupancy> {
        let conn = self.lock()?;
        load_occupancy(&conn)
    }

    fn store_occupancy(&self, occupancy: &Occupancy) -> OccupancyResult<Occupancy> {
        let conn = self.lock()?;
        let (is_occupied, by, since) = match occupancy {
            Occupancy::Free => (false, None, None),
            Occupancy::Occupied { by, since } => (true, Some(by.as_str()), Some(*since)),
        };

        conn.execute(
            r#"
            UPDATE room_status
            SET is_occupied = ?, occupied_by = ?, occupied_since = ?, updated_at = ?
            WHERE id = 1
            "#,
            params![is_occupied, by, since, Utc::now()],
        )?;

        load_occupancy(&conn)
    }
}

// ==================
// Column codecs
// ==================

impl ToSql for Decision {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Decision {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: AccessError| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for RequestStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RequestStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}
