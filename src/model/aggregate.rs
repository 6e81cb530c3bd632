//! The rolling per-leg summary.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    FreshWaterCounters, FuelLedgers, LoadCondition, LubeLedgers, PlannedOperations, ReportType,
    Route,
};

/// Everything a leg has reported so far, folded into one record.
///
/// Consumption ledgers only grow within a leg. Route, position and
/// performance figures are last-write-wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegAggregate {
    pub leg_id: Uuid,

    /// Bumped on every save; a stale version on write is a conflict.
    pub version: u64,

    pub last_report_type: Option<ReportType>,
    pub last_report_date: Option<Timestamp>,
    pub last_report_tz: Option<f64>,

    pub route: Option<Route>,
    pub load_condition: Option<LoadCondition>,
    pub cargo_total_at_departure: Option<u64>,
    pub displacement_at_departure: Option<Decimal>,

    /// Copied from the ship when the summary is first created.
    pub propeller_pitch: Option<Decimal>,

    pub total_hours: Option<Decimal>,
    pub time_standby_to_underway: Option<Decimal>,
    pub time_stopped_at_sea: Option<Decimal>,
    pub distance_observed_standby_to_underway: Option<Decimal>,
    pub distance_engine_standby_to_underway: Option<Decimal>,
    pub distance_observed_total: Option<Decimal>,
    pub distance_engine_total: Option<Decimal>,
    pub revolution_count: Option<i64>,
    pub revolution_count_standby_to_underway: Option<i64>,
    pub distance_to_go: Option<Decimal>,

    pub speed_average: Option<Decimal>,
    pub rpm_average: Option<Decimal>,
    pub slip_average: Option<Decimal>,

    pub fuel: FuelLedgers,
    pub lube: LubeLedgers,
    pub freshwater: FreshWaterCounters,

    pub next_port_plan: Option<PlannedOperations>,
    pub last_operation: Option<PlannedOperations>,
    pub parking_status: Option<String>,
}

impl LegAggregate {
    /// A fresh summary for a leg that has not reported yet.
    pub fn seed(leg_id: Uuid, propeller_pitch: Option<Decimal>) -> Self {
        Self {
            leg_id,
            propeller_pitch,
            ..Self::default()
        }
    }
}
