//! Report chain persistence and traversal.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::chain;
use crate::model::{Report, ReportEdge};

use super::report::ReportRow;
use super::ship::load_ship_row;
use super::{Result, Storage, StorageError, parse_uuid};

impl Storage {
    /// All edges between a ship's reports, in the order they were created.
    pub fn list_edges(&self, ship_id: Uuid) -> Result<Vec<ReportEdge>> {
        let conn = self.connect()?;
        load_ship_row(&conn, ship_id)?;
        ship_edges(&conn, ship_id)
    }

    /// Every report a ship has filed, in filing order, by walking its chain.
    ///
    /// A chain that loops or leaves edges unreached is reported as corrupt.
    pub fn report_chain(&self, ship_id: Uuid) -> Result<Vec<Report>> {
        let conn = self.connect()?;
        load_ship_row(&conn, ship_id)?;

        let first: Option<String> = conn
            .query_row(
                "SELECT report.id FROM report
                 JOIN leg ON leg.id = report.leg_id
                 JOIN voyage ON voyage.id = leg.voyage_id
                 WHERE voyage.ship_id = ?1
                 ORDER BY report.rowid LIMIT 1",
                [ship_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(first) = first else {
            return Ok(Vec::new());
        };
        let first = parse_uuid(&first, "report id")?;

        let edges = ship_edges(&conn, ship_id)?;
        let order = chain::walk(first, &edges)
            .map_err(|e| StorageError::Corrupt(format!("ship {ship_id}: {e}")))?;

        let mut reports = ship_reports(&conn, ship_id)?;
        order
            .into_iter()
            .map(|id| {
                reports
                    .remove(&id)
                    .ok_or_else(|| StorageError::Corrupt(format!("chain names missing report {id}")))
            })
            .collect()
    }
}

/// Inserts an edge, replacing any edge already leaving the same report.
pub(super) fn upsert_edge(conn: &Connection, edge: ReportEdge) -> Result<()> {
    conn.execute(
        "INSERT INTO report_edge (previous_report, next_report) VALUES (?1, ?2)
         ON CONFLICT (previous_report) DO UPDATE SET next_report = excluded.next_report",
        [edge.previous_report.to_string(), edge.next_report.to_string()],
    )?;
    Ok(())
}

fn ship_edges(conn: &Connection, ship_id: Uuid) -> Result<Vec<ReportEdge>> {
    let mut stmt = conn.prepare(
        "SELECT report_edge.previous_report, report_edge.next_report
         FROM report_edge
         JOIN report ON report.id = report_edge.previous_report
         JOIN leg ON leg.id = report.leg_id
         JOIN voyage ON voyage.id = leg.voyage_id
         WHERE voyage.ship_id = ?1
         ORDER BY report_edge.rowid",
    )?;
    let rows = stmt.query_map([ship_id.to_string()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut edges = Vec::new();
    for row in rows {
        let (previous, next) = row?;
        edges.push(ReportEdge {
            previous_report: parse_uuid(&previous, "edge previous report")?,
            next_report: parse_uuid(&next, "edge next report")?,
        });
    }
    Ok(edges)
}

fn ship_reports(conn: &Connection, ship_id: Uuid) -> Result<HashMap<Uuid, Report>> {
    let mut stmt = conn.prepare(
        "SELECT report.id, report.leg_id, report.report_type, report.seq,
                report.reported_at, report.tz_offset, report.created_at
         FROM report
         JOIN leg ON leg.id = report.leg_id
         JOIN voyage ON voyage.id = leg.voyage_id
         WHERE voyage.ship_id = ?1",
    )?;
    let rows = stmt.query_map([ship_id.to_string()], ReportRow::read)?;

    let mut reports = HashMap::new();
    for row in rows {
        let report = row?.into_report()?;
        reports.insert(report.id, report);
    }
    Ok(reports)
}
