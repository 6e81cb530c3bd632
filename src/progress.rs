//! Leg progress tracker.
//!
//! Each milestone may be recorded once per leg. Noon reports move the
//! latest-periodic pointer, and every accepted report moves the
//! latest-report pointer. Milestone order is not enforced.

use crate::error::ConflictError;
use crate::model::{LegProgress, Milestone, Report};

impl LegProgress {
    /// Record a report against this leg.
    ///
    /// A milestone that is already set is a conflict, and the tracker is
    /// left exactly as it was.
    pub fn record(&mut self, report: &Report) -> Result<(), ConflictError> {
        if let Some(milestone) = report.report_type.milestone() {
            let slot = self.milestone_mut(milestone);
            if let Some(existing) = *slot {
                return Err(ConflictError::MilestoneAlreadySet {
                    leg_id: self.leg_id,
                    milestone,
                    existing,
                });
            }
            *slot = Some(report.id);
        } else if report.report_type.is_periodic() {
            self.latest_periodic = Some(report.id);
        }

        self.latest_report = Some(report.id);
        Ok(())
    }

    /// Whether the leg has reached arrival-complete.
    pub fn is_complete(&self) -> bool {
        self.milestone(Milestone::ArrivalComplete).is_some()
    }
}
