//! Ships, voyages and legs: the containers reports are filed against.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reporting vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    pub id: Uuid,
    pub name: String,

    /// Static reference copied into each new leg summary.
    pub propeller_pitch: Option<Decimal>,

    /// The most recent report filed by this ship, across all voyages.
    pub last_report: Option<Uuid>,

    pub created_at: Timestamp,
}

impl Ship {
    pub fn new(name: impl Into<String>, propeller_pitch: Option<Decimal>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            propeller_pitch,
            last_report: None,
            created_at: Timestamp::now(),
        }
    }
}

/// A numbered voyage of one ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voyage {
    pub id: Uuid,
    pub ship_id: Uuid,

    /// Unique per ship.
    pub voyage_num: u32,

    pub created_at: Timestamp,
}

/// One port-to-port passage within a voyage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoyageLeg {
    pub id: Uuid,
    pub voyage_id: Uuid,

    /// Unique per voyage.
    pub leg_num: u32,

    pub created_at: Timestamp,
}
