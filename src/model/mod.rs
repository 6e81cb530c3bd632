//! Core data model for legbook.
//!
//! These types represent the reporting domain: ships, voyages and legs,
//! the reports filed against them, and the summaries derived from reports.

mod aggregate;
mod ledger;
mod progress;
mod report;
mod section;
mod voyage;

pub use aggregate::LegAggregate;
pub use ledger::{
    FreshWaterCounters, FuelLedger, FuelLedgers, FuelType, LubeLedgers, Machinery,
    QuantityLedger,
};
pub use progress::LegProgress;
pub use report::{
    ConsumptionWindow, Milestone, Receipt, Report, ReportEdge, ReportType, Submission,
};
pub use section::{
    ArrivalComplete, BunkerDelivery, BunkerDeliveryLine, CargoOperation, DepartureCondition,
    DistanceTime, Event, FreshWater, FuelOil, FuelOilEntry, LoadCondition, LubeOil, LubeOilEntry,
    PilotStation, PilotStationKind, PlannedOperations, Performance, Position, Route, SailingPlan,
    Section, Stoppage, Weather,
};
pub use voyage::{Ship, Voyage, VoyageLeg};
