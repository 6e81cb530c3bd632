//! Milestone bookkeeping for a leg.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Milestone;

/// Which one-time reports a leg has received, plus the latest of each kind.
///
/// Created empty alongside the leg. Transitions live in [`crate::progress`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegProgress {
    pub leg_id: Uuid,
    pub departure_standby: Option<Uuid>,
    pub departure_underway: Option<Uuid>,
    pub arrival_standby: Option<Uuid>,
    pub arrival_complete: Option<Uuid>,
    pub latest_periodic: Option<Uuid>,
    pub latest_report: Option<Uuid>,
}

impl LegProgress {
    pub fn new(leg_id: Uuid) -> Self {
        Self {
            leg_id,
            ..Self::default()
        }
    }

    /// The report that marked a milestone, if received.
    pub fn milestone(&self, milestone: Milestone) -> Option<Uuid> {
        match milestone {
            Milestone::DepartureStandby => self.departure_standby,
            Milestone::DepartureUnderway => self.departure_underway,
            Milestone::ArrivalStandby => self.arrival_standby,
            Milestone::ArrivalComplete => self.arrival_complete,
        }
    }

    pub(crate) fn milestone_mut(&mut self, milestone: Milestone) -> &mut Option<Uuid> {
        match milestone {
            Milestone::DepartureStandby => &mut self.departure_standby,
            Milestone::DepartureUnderway => &mut self.departure_underway,
            Milestone::ArrivalStandby => &mut self.arrival_standby,
            Milestone::ArrivalComplete => &mut self.arrival_complete,
        }
    }
}
