//! Local persistence for ships, voyages, legs and reports.
//!
//! Everything lives in a single `SQLite` file. Each operation opens its own
//! connection, so a `Storage` can be shared freely; writers serialise on
//! `SQLite`'s write lock.
//!
//! ```text
//! ship            # ships and their last-report pointer
//! voyage / leg    # the containers reports are filed against
//! report          # immutable report headers + zstd-compressed sections
//! leg_aggregate   # rolling per-leg summary (JSON, versioned)
//! leg_progress    # milestone pointers per leg
//! report_edge     # previous -> next report, per ship
//! ```

mod aggregate;
mod chain;
mod report;
mod ship;
mod voyage;

use std::{fs, io, path::PathBuf, time::Duration};

use jiff::Timestamp;
use rusqlite::Connection;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{ConflictError, DataError};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("ship not found: {0}")]
    ShipNotFound(Uuid),

    #[error("ship already exists: {0}")]
    ShipAlreadyExists(Uuid),

    #[error("voyage not found: {0}")]
    VoyageNotFound(Uuid),

    #[error("leg not found: {0}")]
    LegNotFound(Uuid),

    #[error("report not found: {0}")]
    ReportNotFound(Uuid),

    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    #[error("invalid report data: {0}")]
    Data(#[from] DataError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt data: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS ship (
    id              TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    propeller_pitch TEXT,
    last_report     TEXT,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS voyage (
    id          TEXT PRIMARY KEY,
    ship_id     TEXT NOT NULL REFERENCES ship (id),
    voyage_num  INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (ship_id, voyage_num)
);

CREATE TABLE IF NOT EXISTS leg (
    id          TEXT PRIMARY KEY,
    voyage_id   TEXT NOT NULL REFERENCES voyage (id),
    leg_num     INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (voyage_id, leg_num)
);

CREATE TABLE IF NOT EXISTS report (
    id           TEXT PRIMARY KEY,
    leg_id       TEXT NOT NULL REFERENCES leg (id),
    report_type  TEXT NOT NULL,
    seq          INTEGER NOT NULL,
    reported_at  TEXT NOT NULL,
    tz_offset    REAL NOT NULL,
    created_at   TEXT NOT NULL,
    fingerprint  TEXT NOT NULL UNIQUE,
    sections     BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS leg_aggregate (
    leg_id   TEXT PRIMARY KEY REFERENCES leg (id),
    version  INTEGER NOT NULL,
    data     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS leg_progress (
    leg_id              TEXT PRIMARY KEY REFERENCES leg (id),
    departure_standby   TEXT,
    departure_underway  TEXT,
    arrival_standby     TEXT,
    arrival_complete    TEXT,
    latest_periodic     TEXT,
    latest_report       TEXT
);

CREATE TABLE IF NOT EXISTS report_edge (
    previous_report  TEXT PRIMARY KEY REFERENCES report (id),
    next_report      TEXT NOT NULL UNIQUE REFERENCES report (id)
);

CREATE INDEX IF NOT EXISTS report_leg ON report (leg_id);
CREATE INDEX IF NOT EXISTS leg_voyage ON leg (voyage_id);
";

/// `SQLite`-backed storage for the reporting domain.
pub struct Storage {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Storage {
    pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Opens (or creates) the database at `path`.
    ///
    /// The parent directory and the schema are created if they don't exist.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let storage = Self {
            path,
            busy_timeout: Self::DEFAULT_BUSY_TIMEOUT,
        };
        storage.connect()?.execute_batch(SCHEMA)?;
        Ok(storage)
    }

    /// How long a connection waits on a locked database before failing.
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Returns the default database path: `~/.legbook/legbook.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".legbook").join("legbook.sqlite"))
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid> {
    s.parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {what}: {e}")))
}

fn parse_opt_uuid(s: Option<String>, what: &str) -> Result<Option<Uuid>> {
    s.as_deref().map(|s| parse_uuid(s, what)).transpose()
}

fn parse_timestamp(s: &str, what: &str) -> Result<Timestamp> {
    s.parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {what}: {e}")))
}

fn parse_decimal(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {what}: {e}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use crate::model::{Ship, Voyage, VoyageLeg};

    pub(crate) fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("db").join("legbook.sqlite")).unwrap();
        (dir, storage)
    }

    /// A registered ship with one open voyage and leg.
    pub(crate) fn seeded(storage: &Storage) -> (Ship, Voyage, VoyageLeg) {
        let ship = Ship::new("Nordic Tern", Some(Decimal::new(452, 2)));
        storage.register_ship(&ship).unwrap();
        let voyage = storage.open_voyage(ship.id, 1).unwrap();
        let leg = storage.open_leg(voyage.id, 1).unwrap();
        (ship, voyage, leg)
    }

    #[test]
    fn new_creates_parent_dirs_and_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("legbook.sqlite");

        let storage = Storage::new(&path).unwrap();

        assert!(path.is_file());
        let tables: i64 = storage
            .connect()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 7);
    }

    #[test]
    fn reopening_keeps_data() {
        let (dir, storage) = test_storage();
        let ship = Ship::new("Arctic Skua", None);
        storage.register_ship(&ship).unwrap();
        drop(storage);

        let reopened = Storage::new(dir.path().join("db").join("legbook.sqlite")).unwrap();

        assert_eq!(reopened.load_ship(ship.id).unwrap().name, "Arctic Skua");
    }

    #[test]
    fn corrupt_values_are_reported() {
        let err = parse_uuid("not-a-uuid", "ship id").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(msg) if msg.contains("ship id")));
    }
}
