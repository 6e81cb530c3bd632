//! Voyage and leg lifecycle.
//!
//! A new voyage or leg may only be opened once the ship's previous leg has
//! reached arrival-complete. Checks and inserts share one immediate
//! transaction, so two callers cannot both open the "next" leg.

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ConflictError;
use crate::model::{LegProgress, Voyage, VoyageLeg};

use super::aggregate::{insert_progress, load_progress_row};
use super::ship::load_ship_row;
use super::{Result, Storage, StorageError, parse_timestamp, parse_uuid};

impl Storage {
    /// Opens voyage `voyage_num` for a ship.
    ///
    /// The ship's previous voyage, if any, must have at least one leg and its
    /// last leg must be complete.
    pub fn open_voyage(&self, ship_id: Uuid, voyage_num: u32) -> Result<Voyage> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        load_ship_row(&tx, ship_id)?;

        let taken: Option<String> = tx
            .query_row(
                "SELECT id FROM voyage WHERE ship_id = ?1 AND voyage_num = ?2",
                rusqlite::params![ship_id.to_string(), voyage_num],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(conflict(ConflictError::DuplicateVoyage {
                ship_id,
                voyage_num,
            }));
        }

        if let Some(previous) = latest_voyage(&tx, ship_id)? {
            let last_leg = latest_leg(&tx, previous.id)?
                .ok_or(ConflictError::EmptyVoyage(previous.id))
                .map_err(conflict)?;
            ensure_complete(&tx, last_leg.id)?;
        }

        let voyage = Voyage {
            id: Uuid::new_v4(),
            ship_id,
            voyage_num,
            created_at: Timestamp::now(),
        };
        tx.execute(
            "INSERT INTO voyage (id, ship_id, voyage_num, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                voyage.id.to_string(),
                ship_id.to_string(),
                voyage_num,
                voyage.created_at.to_string(),
            ],
        )?;
        tx.commit()?;

        info!(voyage_id = %voyage.id, %ship_id, voyage_num, "opened voyage");
        Ok(voyage)
    }

    /// Opens leg `leg_num` in a voyage, with an empty progress tracker.
    ///
    /// The ship's most recent leg, in whichever voyage, must be complete.
    pub fn open_leg(&self, voyage_id: Uuid, leg_num: u32) -> Result<VoyageLeg> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let voyage = load_voyage_row(&tx, voyage_id)?;

        let taken: Option<String> = tx
            .query_row(
                "SELECT id FROM leg WHERE voyage_id = ?1 AND leg_num = ?2",
                rusqlite::params![voyage_id.to_string(), leg_num],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(conflict(ConflictError::DuplicateLeg { voyage_id, leg_num }));
        }

        if let Some(previous) = latest_ship_leg(&tx, voyage.ship_id)? {
            ensure_complete(&tx, previous.id)?;
        }

        let leg = VoyageLeg {
            id: Uuid::new_v4(),
            voyage_id,
            leg_num,
            created_at: Timestamp::now(),
        };
        tx.execute(
            "INSERT INTO leg (id, voyage_id, leg_num, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                leg.id.to_string(),
                voyage_id.to_string(),
                leg_num,
                leg.created_at.to_string(),
            ],
        )?;
        insert_progress(&tx, &LegProgress::new(leg.id))?;
        tx.commit()?;

        info!(leg_id = %leg.id, %voyage_id, leg_num, "opened leg");
        Ok(leg)
    }

    /// Whether a leg has received its arrival-complete report.
    pub fn is_leg_complete(&self, leg_id: Uuid) -> Result<bool> {
        let conn = self.connect()?;
        load_leg_row(&conn, leg_id)?;
        Ok(load_progress_row(&conn, leg_id)?.is_complete())
    }

    pub fn load_voyage(&self, id: Uuid) -> Result<Voyage> {
        let conn = self.connect()?;
        load_voyage_row(&conn, id)
    }

    pub fn load_leg(&self, id: Uuid) -> Result<VoyageLeg> {
        let conn = self.connect()?;
        load_leg_row(&conn, id)
    }

    /// Lists a ship's voyages in creation order.
    pub fn list_voyages(&self, ship_id: Uuid) -> Result<Vec<Voyage>> {
        let conn = self.connect()?;
        load_ship_row(&conn, ship_id)?;
        let mut stmt = conn.prepare(
            "SELECT id, ship_id, voyage_num, created_at FROM voyage
             WHERE ship_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map([ship_id.to_string()], VoyageRow::read)?;
        let mut voyages = Vec::new();
        for row in rows {
            voyages.push(row?.into_voyage()?);
        }
        Ok(voyages)
    }

    /// Lists every leg of every voyage of a ship, in creation order.
    pub fn list_legs(&self, ship_id: Uuid) -> Result<Vec<VoyageLeg>> {
        let conn = self.connect()?;
        load_ship_row(&conn, ship_id)?;
        let mut stmt = conn.prepare(
            "SELECT leg.id, leg.voyage_id, leg.leg_num, leg.created_at
             FROM leg JOIN voyage ON voyage.id = leg.voyage_id
             WHERE voyage.ship_id = ?1
             ORDER BY leg.rowid",
        )?;
        let rows = stmt.query_map([ship_id.to_string()], LegRow::read)?;
        let mut legs = Vec::new();
        for row in rows {
            legs.push(row?.into_leg()?);
        }
        Ok(legs)
    }
}

fn conflict(err: ConflictError) -> StorageError {
    warn!(%err, "lifecycle conflict");
    StorageError::Conflict(err)
}

fn ensure_complete(conn: &Connection, leg_id: Uuid) -> Result<()> {
    if load_progress_row(conn, leg_id)?.is_complete() {
        Ok(())
    } else {
        Err(conflict(ConflictError::LegIncomplete(leg_id)))
    }
}

struct VoyageRow {
    id: String,
    ship_id: String,
    voyage_num: u32,
    created_at: String,
}

impl VoyageRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            ship_id: row.get(1)?,
            voyage_num: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn into_voyage(self) -> Result<Voyage> {
        Ok(Voyage {
            id: parse_uuid(&self.id, "voyage id")?,
            ship_id: parse_uuid(&self.ship_id, "voyage ship id")?,
            voyage_num: self.voyage_num,
            created_at: parse_timestamp(&self.created_at, "voyage created_at")?,
        })
    }
}

struct LegRow {
    id: String,
    voyage_id: String,
    leg_num: u32,
    created_at: String,
}

impl LegRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            voyage_id: row.get(1)?,
            leg_num: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn into_leg(self) -> Result<VoyageLeg> {
        Ok(VoyageLeg {
            id: parse_uuid(&self.id, "leg id")?,
            voyage_id: parse_uuid(&self.voyage_id, "leg voyage id")?,
            leg_num: self.leg_num,
            created_at: parse_timestamp(&self.created_at, "leg created_at")?,
        })
    }
}

pub(super) fn load_voyage_row(conn: &Connection, id: Uuid) -> Result<Voyage> {
    conn.query_row(
        "SELECT id, ship_id, voyage_num, created_at FROM voyage WHERE id = ?1",
        [id.to_string()],
        VoyageRow::read,
    )
    .optional()?
    .ok_or(StorageError::VoyageNotFound(id))?
    .into_voyage()
}

pub(super) fn load_leg_row(conn: &Connection, id: Uuid) -> Result<VoyageLeg> {
    conn.query_row(
        "SELECT id, voyage_id, leg_num, created_at FROM leg WHERE id = ?1",
        [id.to_string()],
        LegRow::read,
    )
    .optional()?
    .ok_or(StorageError::LegNotFound(id))?
    .into_leg()
}

fn latest_voyage(conn: &Connection, ship_id: Uuid) -> Result<Option<Voyage>> {
    conn.query_row(
        "SELECT id, ship_id, voyage_num, created_at FROM voyage
         WHERE ship_id = ?1 ORDER BY rowid DESC LIMIT 1",
        [ship_id.to_string()],
        VoyageRow::read,
    )
    .optional()?
    .map(VoyageRow::into_voyage)
    .transpose()
}

fn latest_ship_leg(conn: &Connection, ship_id: Uuid) -> Result<Option<VoyageLeg>> {
    conn.query_row(
        "SELECT leg.id, leg.voyage_id, leg.leg_num, leg.created_at
         FROM leg JOIN voyage ON voyage.id = leg.voyage_id
         WHERE voyage.ship_id = ?1 ORDER BY leg.rowid DESC LIMIT 1",
        [ship_id.to_string()],
        LegRow::read,
    )
    .optional()?
    .map(LegRow::into_leg)
    .transpose()
}

fn latest_leg(conn: &Connection, voyage_id: Uuid) -> Result<Option<VoyageLeg>> {
    conn.query_row(
        "SELECT id, voyage_id, leg_num, created_at FROM leg
         WHERE voyage_id = ?1 ORDER BY rowid DESC LIMIT 1",
        [voyage_id.to_string()],
        LegRow::read,
    )
    .optional()?
    .map(LegRow::into_leg)
    .transpose()
}
