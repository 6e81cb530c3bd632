//! Report submission and lookup.
//!
//! `submit_report` is the only writer of derived state. It stores the
//! report, folds it into the leg summary, records progress and links the
//! ship's chain inside a single immediate transaction.

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ConflictError;
use crate::model::{LegAggregate, Receipt, Report, ReportType, Section, Submission};
use crate::{aggregate, chain};

use super::aggregate::{load_aggregate_row, load_progress_row, save_aggregate, save_progress};
use super::chain::upsert_edge;
use super::ship::{load_ship_row, set_last_report};
use super::voyage::{load_leg_row, load_voyage_row};
use super::{Result, Storage, StorageError, parse_timestamp, parse_uuid};

const SECTIONS_ZSTD_LEVEL: i32 = 3;

impl Storage {
    /// Files a report and updates everything derived from it.
    ///
    /// Nothing is written unless every step succeeds.
    pub fn submit_report(&self, submission: &Submission) -> Result<Receipt> {
        let result = self.submit(submission);
        match &result {
            Ok(receipt) => info!(
                report_id = %receipt.report.id,
                leg_id = %submission.leg_id,
                report_type = %submission.report_type,
                version = receipt.aggregate_version,
                "submitted report"
            ),
            Err(StorageError::Conflict(err)) => warn!(
                leg_id = %submission.leg_id,
                report_type = %submission.report_type,
                %err,
                "rejected report"
            ),
            Err(err) => warn!(leg_id = %submission.leg_id, %err, "report failed"),
        }
        result
    }

    fn submit(&self, submission: &Submission) -> Result<Receipt> {
        let fingerprint = submission.fingerprint()?;
        let sections = serde_json::to_vec(&submission.sections)?;
        let sections = zstd::encode_all(sections.as_slice(), SECTIONS_ZSTD_LEVEL)?;

        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let leg = load_leg_row(&tx, submission.leg_id)?;
        let voyage = load_voyage_row(&tx, leg.voyage_id)?;
        let ship = load_ship_row(&tx, voyage.ship_id)?;

        let duplicate: Option<String> = tx
            .query_row(
                "SELECT id FROM report WHERE fingerprint = ?1",
                [&fingerprint],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(existing) = duplicate {
            let existing = parse_uuid(&existing, "report id")?;
            return Err(ConflictError::DuplicateSubmission { existing }.into());
        }

        let report = Report {
            id: Uuid::new_v4(),
            leg_id: leg.id,
            report_type: submission.report_type,
            seq: submission.seq,
            reported_at: submission.reported_at,
            tz_offset: submission.tz_offset,
            created_at: Timestamp::now(),
        };
        tx.execute(
            "INSERT INTO report
               (id, leg_id, report_type, seq, reported_at, tz_offset, created_at,
                fingerprint, sections)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                report.id.to_string(),
                report.leg_id.to_string(),
                report.report_type.as_str(),
                report.seq,
                report.reported_at.to_string(),
                report.tz_offset,
                report.created_at.to_string(),
                fingerprint,
                sections,
            ],
        )?;

        let mut summary = load_aggregate_row(&tx, leg.id)?
            .unwrap_or_else(|| LegAggregate::seed(leg.id, ship.propeller_pitch));
        aggregate::apply(&mut summary, &report, &submission.sections)?;

        let mut progress = load_progress_row(&tx, leg.id)?;
        progress.record(&report)?;

        let edge = chain::link(ship.last_report, &report);
        if let Some(edge) = edge {
            upsert_edge(&tx, edge)?;
        }
        set_last_report(&tx, ship.id, report.id)?;

        save_aggregate(&tx, &mut summary)?;
        save_progress(&tx, &progress)?;
        tx.commit()?;

        Ok(Receipt {
            report,
            aggregate_version: summary.version,
            edge,
        })
    }

    pub fn load_report(&self, id: Uuid) -> Result<Report> {
        let conn = self.connect()?;
        load_report_row(&conn, id)
    }

    /// The sections a report was filed with, exactly as submitted.
    pub fn load_sections(&self, id: Uuid) -> Result<Vec<Section>> {
        let conn = self.connect()?;
        let blob: Vec<u8> = conn
            .query_row(
                "SELECT sections FROM report WHERE id = ?1",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StorageError::ReportNotFound(id))?;
        let json = zstd::decode_all(blob.as_slice())?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Lists a leg's reports in filing order.
    pub fn list_reports(&self, leg_id: Uuid) -> Result<Vec<Report>> {
        let conn = self.connect()?;
        load_leg_row(&conn, leg_id)?;
        let mut stmt = conn.prepare(
            "SELECT id, leg_id, report_type, seq, reported_at, tz_offset, created_at
             FROM report WHERE leg_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map([leg_id.to_string()], ReportRow::read)?;
        let mut reports = Vec::new();
        for row in rows {
            reports.push(row?.into_report()?);
        }
        Ok(reports)
    }
}

pub(super) struct ReportRow {
    id: String,
    leg_id: String,
    report_type: String,
    seq: u32,
    reported_at: String,
    tz_offset: f64,
    created_at: String,
}

impl ReportRow {
    /// Reads the seven header columns in table order.
    pub(super) fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            leg_id: row.get(1)?,
            report_type: row.get(2)?,
            seq: row.get(3)?,
            reported_at: row.get(4)?,
            tz_offset: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    pub(super) fn into_report(self) -> Result<Report> {
        let report_type = ReportType::parse(&self.report_type).ok_or_else(|| {
            StorageError::Corrupt(format!("unknown report type: {}", self.report_type))
        })?;
        Ok(Report {
            id: parse_uuid(&self.id, "report id")?,
            leg_id: parse_uuid(&self.leg_id, "report leg id")?,
            report_type,
            seq: self.seq,
            reported_at: parse_timestamp(&self.reported_at, "reported_at")?,
            tz_offset: self.tz_offset,
            created_at: parse_timestamp(&self.created_at, "report created_at")?,
        })
    }
}

pub(super) fn load_report_row(conn: &Connection, id: Uuid) -> Result<Report> {
    conn.query_row(
        "SELECT id, leg_id, report_type, seq, reported_at, tz_offset, created_at
         FROM report WHERE id = ?1",
        [id.to_string()],
        ReportRow::read,
    )
    .optional()?
    .ok_or(StorageError::ReportNotFound(id))?
    .into_report()
}
