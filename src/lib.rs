//! legbook: voyage report aggregation.
//!
//! Ships file reports against voyage legs. From those reports legbook keeps,
//! per leg, a rolling summary ([`model::LegAggregate`]) and a milestone
//! tracker ([`model::LegProgress`]), and per ship a chain linking every
//! report to the one filed before it.
//!
//! The folding logic is pure and lives in [`aggregate`], [`consumption`],
//! [`progress`] and [`chain`]. [`storage::Storage`] runs it atomically
//! against `SQLite`.

pub mod aggregate;
pub mod chain;
pub mod cli;
pub mod config;
pub mod consumption;
pub mod error;
pub mod model;
pub mod progress;
pub mod storage;
