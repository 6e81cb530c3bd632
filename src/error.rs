//! Domain errors raised by the aggregation engine.
//!
//! Storage wraps these in [`crate::storage::StorageError`] so a caller sees a
//! single error type, but the pure engine functions return them directly.

use uuid::Uuid;

use crate::model::Milestone;

/// A transition that would violate an at-most-once or ordering rule.
///
/// Conflicts are never swallowed: the enclosing submission rolls back.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConflictError {
    #[error("{milestone} already recorded for leg {leg_id} by report {existing}")]
    MilestoneAlreadySet {
        leg_id: Uuid,
        milestone: Milestone,
        existing: Uuid,
    },

    #[error("leg summary for {0} was modified concurrently")]
    ConcurrentModification(Uuid),

    #[error("leg {0} has not reached arrival-complete")]
    LegIncomplete(Uuid),

    #[error("voyage {0} has no legs")]
    EmptyVoyage(Uuid),

    #[error("voyage number {voyage_num} already exists for ship {ship_id}")]
    DuplicateVoyage { ship_id: Uuid, voyage_num: u32 },

    #[error("leg number {leg_num} already exists in voyage {voyage_id}")]
    DuplicateLeg { voyage_id: Uuid, leg_num: u32 },

    #[error("submission already recorded as report {existing}")]
    DuplicateSubmission { existing: Uuid },
}

/// Report figures the ledgers cannot represent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("unknown fuel type code: {0:?}")]
    UnknownFuelType(String),

    #[error("unknown machinery code: {0:?}")]
    UnknownMachinery(String),

    /// A running total would exceed what its counter can hold.
    #[error("{ledger} total for {key} overflowed")]
    QuantityOverflow { ledger: &'static str, key: String },
}
