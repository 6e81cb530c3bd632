//! Section payloads: the optional data blocks attached to a report.
//!
//! Consumption payloads carry fuel and machinery as raw codes. They are
//! parsed when the section is applied to a leg, which is where an unknown
//! code surfaces as a [`crate::error::DataError`].

use std::collections::BTreeMap;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A report section, self-describing on the wire via its `section` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "camelCase")]
pub enum Section {
    Route(Route),
    CargoOperation(CargoOperation),
    DepartureCondition(DepartureCondition),
    FuelOil(FuelOil),
    LubeOil(LubeOil),
    FreshWater(FreshWater),
    DistanceTime(DistanceTime),
    SailingPlan(SailingPlan),
    Performance(Performance),
    Stoppage(Stoppage),
    PlannedOperations(PlannedOperations),
    ArrivalComplete(ArrivalComplete),
    Event(Event),

    // Archived with the report; no effect on the leg summary.
    Weather(Weather),
    PilotStation(PilotStation),
    BunkerDelivery(BunkerDelivery),
}

impl Section {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Route(_) => "route",
            Self::CargoOperation(_) => "cargoOperation",
            Self::DepartureCondition(_) => "departureCondition",
            Self::FuelOil(_) => "fuelOil",
            Self::LubeOil(_) => "lubeOil",
            Self::FreshWater(_) => "freshWater",
            Self::DistanceTime(_) => "distanceTime",
            Self::SailingPlan(_) => "sailingPlan",
            Self::Performance(_) => "performance",
            Self::Stoppage(_) => "stoppage",
            Self::PlannedOperations(_) => "plannedOperations",
            Self::ArrivalComplete(_) => "arrivalComplete",
            Self::Event(_) => "event",
            Self::Weather(_) => "weather",
            Self::PilotStation(_) => "pilotStation",
            Self::BunkerDelivery(_) => "bunkerDelivery",
        }
    }
}

/// Latitude and longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub departure_port: String,
    pub departure_date: Timestamp,
    pub departure_tz: f64,
    pub arrival_port: String,
    pub arrival_date: Timestamp,
    pub arrival_tz: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadCondition {
    Ballast,
    Laden,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoOperation {
    pub load_condition: LoadCondition,
    pub loading: u64,
    pub unloading: u64,
    pub total: u64,

    /// Hours spent on cargo work.
    #[serde(default)]
    pub time: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureCondition {
    pub draft_fwd: Decimal,
    pub draft_mid: Decimal,
    pub draft_aft: Decimal,
    pub gm: Decimal,
    pub ballast: Decimal,
    pub displacement: Decimal,
}

/// Fuel oil figures, one entry per fuel grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelOil {
    pub entries: Vec<FuelOilEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelOilEntry {
    /// Fuel grade code, e.g. `HFO`.
    pub fuel_type: String,
    pub total_consumption: Decimal,
    #[serde(default)]
    pub receipt: Decimal,
    #[serde(default)]
    pub debunkering: Decimal,
    pub rob: Decimal,

    /// Consumption since the last report by machinery code, e.g. `ME`.
    #[serde(default)]
    pub breakdown: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LubeOil {
    pub entries: Vec<LubeOilEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LubeOilEntry {
    /// Free-form oil name; lube oils are not a closed set.
    pub oil: String,
    pub total_consumption: Decimal,
    #[serde(default)]
    pub receipt: Decimal,
    #[serde(default)]
    pub debunkering: Decimal,
    pub rob: Decimal,
}

/// Freshwater counters, in whole tonnes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshWater {
    pub consumed: u64,
    pub generated: u64,
    pub received: u64,
    pub discharged: u64,
    pub rob: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceTime {
    pub hours_since_last: Decimal,
    pub hours_total: Decimal,
    pub distance_to_go: Decimal,
    pub distance_observed_since_last: Decimal,
    pub distance_observed_total: Decimal,
    pub distance_engine_since_last: Decimal,
    pub distance_engine_total: Decimal,
    pub revolution_count: i64,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SailingPlan {
    pub distance_to_go: Decimal,
    pub speed: Decimal,
    pub me_daily_fo_consumption: Decimal,
    pub me_rpm: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub speed_since_last: Decimal,
    pub rpm_since_last: Decimal,
    pub slip_since_last: Decimal,
    pub speed_average: Decimal,
    pub rpm_average: Decimal,
    pub slip_average: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stoppage {
    pub start_date: Timestamp,
    #[serde(default)]
    pub end_date: Option<Timestamp>,

    /// Hours stopped; absent while the stoppage is ongoing.
    #[serde(default)]
    pub duration: Option<Decimal>,

    /// Zero means a full stop.
    pub reduced_rpm: Decimal,
    pub reason: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Operations planned (or under way) at the next port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannedOperations {
    pub waiting: bool,
    pub cargo_operation_berth: bool,
    pub cargo_operation_sts: bool,
    pub bunkering_debunkering: bool,
    pub dry_docking: bool,
    pub crew_change: bool,
    pub receiving_provisions_spares: bool,
    pub surveying: bool,
    pub others: bool,
    pub others_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalComplete {
    pub time: Timestamp,
    pub position: Position,
    pub parking_status: String,
}

/// A harbour or port event: shifting, anchoring, drifting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub time: Timestamp,
    pub position: Position,
    pub distance_travelled: u32,
    pub parking_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub notation: String,
    pub visibility: u8,
    pub wind_direction: String,
    pub wind_speed: Decimal,
    pub sea_state: u8,
    pub air_pressure: u16,
    pub air_temperature: Decimal,
    pub sea_temperature: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PilotStationKind {
    Departure,
    Arrival,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PilotStation {
    pub kind: PilotStationKind,
    pub name: String,
    pub date: Timestamp,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BunkerDelivery {
    pub delivered_at: Timestamp,
    pub port: String,
    pub supplier: String,
    pub fuels: Vec<BunkerDeliveryLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BunkerDeliveryLine {
    pub fuel_type: String,
    pub quantity: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_are_tagged() {
        let json = r#"{"section":"sailingPlan","distanceToGo":"1200","speed":"12.5","meDailyFoConsumption":"24","meRpm":"78"}"#;
        let section: Section = serde_json::from_str(json).unwrap();

        let Section::SailingPlan(plan) = &section else {
            panic!("expected sailing plan, got {}", section.name());
        };
        assert_eq!(plan.distance_to_go, Decimal::from(1200));
    }

    #[test]
    fn fuel_oil_defaults_optional_quantities() {
        let json = r#"{"section":"fuelOil","entries":[{"fuelType":"HFO","totalConsumption":"5","rob":"95","breakdown":{"ME":"5"}}]}"#;
        let section: Section = serde_json::from_str(json).unwrap();

        let Section::FuelOil(fuel) = section else {
            panic!("expected fuel oil");
        };
        assert_eq!(fuel.entries[0].receipt, Decimal::ZERO);
        assert_eq!(fuel.entries[0].breakdown["ME"], Decimal::from(5));
    }

    #[test]
    fn unknown_section_is_rejected() {
        let json = r#"{"section":"heavyWeather"}"#;
        assert!(serde_json::from_str::<Section>(json).is_err());
    }
}
