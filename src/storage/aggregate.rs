//! Leg summary and progress persistence.

use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::ConflictError;
use crate::model::{LegAggregate, LegProgress};

use super::voyage::load_leg_row;
use super::ship::load_ship_row;
use super::{Result, Storage, StorageError, parse_opt_uuid, parse_uuid};

impl Storage {
    /// The rolling summary for a leg, or `None` before its first report.
    pub fn load_aggregate(&self, leg_id: Uuid) -> Result<Option<LegAggregate>> {
        let conn = self.connect()?;
        load_leg_row(&conn, leg_id)?;
        load_aggregate_row(&conn, leg_id)
    }

    pub fn load_progress(&self, leg_id: Uuid) -> Result<LegProgress> {
        let conn = self.connect()?;
        load_leg_row(&conn, leg_id)?;
        load_progress_row(&conn, leg_id)
    }

    /// The summary of the leg a ship last reported on.
    ///
    /// Used to prefill the next report form; `None` if the ship has never
    /// reported.
    pub fn prefill(&self, ship_id: Uuid) -> Result<Option<LegAggregate>> {
        let conn = self.connect()?;
        let ship = load_ship_row(&conn, ship_id)?;
        let Some(report_id) = ship.last_report else {
            return Ok(None);
        };
        let report = super::report::load_report_row(&conn, report_id)?;
        load_aggregate_row(&conn, report.leg_id)
    }
}

pub(super) fn load_aggregate_row(conn: &Connection, leg_id: Uuid) -> Result<Option<LegAggregate>> {
    let row: Option<(u64, String)> = conn
        .query_row(
            "SELECT version, data FROM leg_aggregate WHERE leg_id = ?1",
            [leg_id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((version, data)) = row else {
        return Ok(None);
    };
    let mut aggregate: LegAggregate = serde_json::from_str(&data)?;
    if aggregate.leg_id != leg_id {
        return Err(StorageError::Corrupt(format!(
            "summary stored under leg {leg_id} belongs to leg {}",
            aggregate.leg_id
        )));
    }
    aggregate.version = version;
    Ok(Some(aggregate))
}

/// Writes a summary if nobody else has since it was loaded.
///
/// Version 0 means never saved. On success the version is bumped.
pub(super) fn save_aggregate(conn: &Connection, aggregate: &mut LegAggregate) -> Result<()> {
    let expected = aggregate.version;
    let next = expected + 1;
    aggregate.version = next;
    let data = serde_json::to_string(&*aggregate)?;

    let rows = if expected == 0 {
        conn.execute(
            "INSERT INTO leg_aggregate (leg_id, version, data) VALUES (?1, ?2, ?3)
             ON CONFLICT (leg_id) DO NOTHING",
            rusqlite::params![aggregate.leg_id.to_string(), next, data],
        )?
    } else {
        conn.execute(
            "UPDATE leg_aggregate SET version = ?1, data = ?2
             WHERE leg_id = ?3 AND version = ?4",
            rusqlite::params![next, data, aggregate.leg_id.to_string(), expected],
        )?
    };

    if rows == 0 {
        aggregate.version = expected;
        return Err(ConflictError::ConcurrentModification(aggregate.leg_id).into());
    }
    Ok(())
}

pub(super) fn insert_progress(conn: &Connection, progress: &LegProgress) -> Result<()> {
    conn.execute(
        "INSERT INTO leg_progress (leg_id) VALUES (?1)",
        [progress.leg_id.to_string()],
    )?;
    save_progress(conn, progress)
}

pub(super) fn save_progress(conn: &Connection, progress: &LegProgress) -> Result<()> {
    let id = |v: Option<Uuid>| v.map(|u| u.to_string());
    let rows = conn.execute(
        "UPDATE leg_progress
         SET departure_standby = ?1, departure_underway = ?2, arrival_standby = ?3,
             arrival_complete = ?4, latest_periodic = ?5, latest_report = ?6
         WHERE leg_id = ?7",
        rusqlite::params![
            id(progress.departure_standby),
            id(progress.departure_underway),
            id(progress.arrival_standby),
            id(progress.arrival_complete),
            id(progress.latest_periodic),
            id(progress.latest_report),
            progress.leg_id.to_string(),
        ],
    )?;
    if rows == 0 {
        return Err(StorageError::LegNotFound(progress.leg_id));
    }
    Ok(())
}

/// Loads the tracker for a leg that is known to exist.
pub(super) fn load_progress_row(conn: &Connection, leg_id: Uuid) -> Result<LegProgress> {
    type Cols = (
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
    );

    let row: Option<Cols> = conn
        .query_row(
            "SELECT leg_id, departure_standby, departure_underway, arrival_standby,
                    arrival_complete, latest_periodic, latest_report
             FROM leg_progress WHERE leg_id = ?1",
            [leg_id.to_string()],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            },
        )
        .optional()?;

    let (id, dep_sby, dep_uw, arr_sby, arr_done, periodic, latest) =
        row.ok_or_else(|| StorageError::Corrupt(format!("leg {leg_id} has no progress row")))?;

    Ok(LegProgress {
        leg_id: parse_uuid(&id, "progress leg id")?,
        departure_standby: parse_opt_uuid(dep_sby, "departure standby")?,
        departure_underway: parse_opt_uuid(dep_uw, "departure underway")?,
        arrival_standby: parse_opt_uuid(arr_sby, "arrival standby")?,
        arrival_complete: parse_opt_uuid(arr_done, "arrival complete")?,
        latest_periodic: parse_opt_uuid(periodic, "latest periodic")?,
        latest_report: parse_opt_uuid(latest, "latest report")?,
    })
}
