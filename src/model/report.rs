//! Reports: the immutable inputs that drive every derived leg summary.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::Section;

/// The kind of report a ship files.
///
/// Determines which milestone (if any) the report marks and which
/// consumption windows its fuel breakdown feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Standing by for departure.
    DepartureStandby,

    /// Commencement of sea passage.
    DepartureUnderway,

    /// Periodic report at sea.
    Noon,

    /// End of sea passage, standing by for arrival.
    ArrivalStandby,

    /// Finished with engines.
    ArrivalComplete,

    EventHarbour,
    EventPort,
    NoonHarbour,
    NoonPort,
    BunkerDelivery,
}

impl ReportType {
    pub const ALL: [Self; 10] = [
        Self::DepartureStandby,
        Self::DepartureUnderway,
        Self::Noon,
        Self::ArrivalStandby,
        Self::ArrivalComplete,
        Self::EventHarbour,
        Self::EventPort,
        Self::NoonHarbour,
        Self::NoonPort,
        Self::BunkerDelivery,
    ];

    /// Column value used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DepartureStandby => "departure_standby",
            Self::DepartureUnderway => "departure_underway",
            Self::Noon => "noon",
            Self::ArrivalStandby => "arrival_standby",
            Self::ArrivalComplete => "arrival_complete",
            Self::EventHarbour => "event_harbour",
            Self::EventPort => "event_port",
            Self::NoonHarbour => "noon_harbour",
            Self::NoonPort => "noon_port",
            Self::BunkerDelivery => "bunker_delivery",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// The one-time milestone this report marks on its leg.
    pub fn milestone(self) -> Option<Milestone> {
        match self {
            Self::DepartureStandby => Some(Milestone::DepartureStandby),
            Self::DepartureUnderway => Some(Milestone::DepartureUnderway),
            Self::ArrivalStandby => Some(Milestone::ArrivalStandby),
            Self::ArrivalComplete => Some(Milestone::ArrivalComplete),
            _ => None,
        }
    }

    /// Repeatable reports at sea.
    pub fn is_periodic(self) -> bool {
        self == Self::Noon
    }

    /// Harbour and port variants, the only reports that accumulate receipts,
    /// debunkering, lube-oil totals and freshwater counters.
    pub fn is_in_harbour(self) -> bool {
        matches!(
            self,
            Self::EventHarbour | Self::EventPort | Self::NoonHarbour | Self::NoonPort
        )
    }

    /// Consumption windows a fuel breakdown on this report is added into.
    pub fn consumption_windows(self) -> &'static [ConsumptionWindow] {
        use ConsumptionWindow::{InHarbour, PilotToPilot, PortToPort};

        match self {
            Self::DepartureUnderway | Self::ArrivalComplete => &[PortToPort],
            Self::Noon | Self::ArrivalStandby => &[PortToPort, PilotToPilot],
            Self::EventHarbour | Self::EventPort | Self::NoonHarbour | Self::NoonPort => {
                &[InHarbour]
            }
            Self::DepartureStandby | Self::BunkerDelivery => &[],
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One-time events on a leg, each recorded at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Milestone {
    DepartureStandby,
    DepartureUnderway,
    ArrivalStandby,
    ArrivalComplete,
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DepartureStandby => "departure-standby",
            Self::DepartureUnderway => "departure-underway",
            Self::ArrivalStandby => "arrival-standby",
            Self::ArrivalComplete => "arrival-complete",
        };
        f.pad(s)
    }
}

/// Disjoint measurement windows for fuel consumption on a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumptionWindow {
    PortToPort,
    PilotToPilot,
    InHarbour,
}

/// A filed report, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub leg_id: Uuid,
    pub report_type: ReportType,

    /// Sequence number assigned by the ship.
    pub seq: u32,

    pub reported_at: Timestamp,

    /// Offset from UTC in hours at the time of the report.
    pub tz_offset: f64,

    pub created_at: Timestamp,
}

/// What a gateway hands in: a report header plus its sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub leg_id: Uuid,
    pub report_type: ReportType,
    pub seq: u32,
    pub reported_at: Timestamp,
    pub tz_offset: f64,

    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Submission {
    /// SHA-256 over the canonical JSON form, hex encoded.
    ///
    /// Two submissions with identical headers and sections share a
    /// fingerprint.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// A link in a ship's report chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEdge {
    pub previous_report: Uuid,
    pub next_report: Uuid,
}

/// Returned from a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub report: Report,

    /// Aggregate version after the report was applied.
    pub aggregate_version: u64,

    /// `None` for a ship's first report.
    pub edge: Option<ReportEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_strings_round_trip() {
        for t in ReportType::ALL {
            assert_eq!(ReportType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ReportType::parse("DEP_SBY"), None);
    }

    #[test]
    fn milestones_map_one_to_one() {
        let marked: Vec<_> = ReportType::ALL
            .into_iter()
            .filter_map(ReportType::milestone)
            .collect();
        assert_eq!(
            marked,
            vec![
                Milestone::DepartureStandby,
                Milestone::DepartureUnderway,
                Milestone::ArrivalStandby,
                Milestone::ArrivalComplete,
            ]
        );
    }

    #[test]
    fn arrival_standby_feeds_both_sea_windows() {
        let windows = ReportType::ArrivalStandby.consumption_windows();
        assert!(windows.contains(&ConsumptionWindow::PortToPort));
        assert!(windows.contains(&ConsumptionWindow::PilotToPilot));
        assert!(!windows.contains(&ConsumptionWindow::InHarbour));
    }

    #[test]
    fn harbour_reports_feed_only_in_harbour() {
        for t in ReportType::ALL.into_iter().filter(|t| t.is_in_harbour()) {
            assert_eq!(t.consumption_windows(), &[ConsumptionWindow::InHarbour]);
        }
    }

    #[test]
    fn departure_standby_feeds_nothing() {
        assert!(ReportType::DepartureStandby.consumption_windows().is_empty());
    }

    #[test]
    fn consumption_windows_per_report_type() {
        use ConsumptionWindow::{InHarbour, PilotToPilot, PortToPort};

        let table: [(ReportType, &[ConsumptionWindow]); 10] = [
            (ReportType::DepartureStandby, &[]),
            (ReportType::DepartureUnderway, &[PortToPort]),
            (ReportType::Noon, &[PortToPort, PilotToPilot]),
            (ReportType::ArrivalStandby, &[PortToPort, PilotToPilot]),
            (ReportType::ArrivalComplete, &[PortToPort]),
            (ReportType::EventHarbour, &[InHarbour]),
            (ReportType::EventPort, &[InHarbour]),
            (ReportType::NoonHarbour, &[InHarbour]),
            (ReportType::NoonPort, &[InHarbour]),
            (ReportType::BunkerDelivery, &[]),
        ];

        for (report_type, windows) in table {
            assert_eq!(report_type.consumption_windows(), windows, "{report_type}");
        }
        assert_eq!(table.map(|(t, _)| t), ReportType::ALL);
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let sub = Submission {
            leg_id: Uuid::nil(),
            report_type: ReportType::Noon,
            seq: 4,
            reported_at: Timestamp::UNIX_EPOCH,
            tz_offset: 0.0,
            sections: Vec::new(),
        };
        let same = sub.clone();
        let other = Submission { seq: 5, ..sub.clone() };

        assert_eq!(sub.fingerprint().unwrap(), same.fingerprint().unwrap());
        assert_ne!(sub.fingerprint().unwrap(), other.fingerprint().unwrap());
        assert_eq!(sub.fingerprint().unwrap().len(), 64);
    }
}
