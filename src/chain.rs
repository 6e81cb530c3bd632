//! Report chain builder.
//!
//! Every report a ship files is linked to the one it filed before, across
//! leg and voyage boundaries. The predecessor is the ship's last-report
//! pointer, so linking never has to search.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::model::{Report, ReportEdge};

/// A chain that cannot be walked end to end.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("report chain revisits report {0}")]
    Cycle(Uuid),

    #[error("report chain from {first} reaches {visited} reports but has {edges} edges")]
    Disconnected {
        first: Uuid,
        visited: usize,
        edges: usize,
    },
}

/// The edge a new report adds, given the ship's previous last report.
///
/// `None` for the first report a ship ever files.
pub fn link(previous: Option<Uuid>, report: &Report) -> Option<ReportEdge> {
    previous.map(|previous_report| ReportEdge {
        previous_report,
        next_report: report.id,
    })
}

/// Follow edges from `first`, returning report ids in filing order.
///
/// Every edge must be reached exactly once.
pub fn walk(first: Uuid, edges: &[ReportEdge]) -> Result<Vec<Uuid>, ChainError> {
    let next: HashMap<Uuid, Uuid> = edges
        .iter()
        .map(|e| (e.previous_report, e.next_report))
        .collect();

    let mut seen = HashSet::from([first]);
    let mut order = vec![first];
    let mut current = first;

    while let Some(&following) = next.get(&current) {
        if !seen.insert(following) {
            return Err(ChainError::Cycle(following));
        }
        order.push(following);
        current = following;
    }

    if order.len() != edges.len() + 1 {
        return Err(ChainError::Disconnected {
            first,
            visited: order.len(),
            edges: edges.len(),
        });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::model::ReportType;

    fn report() -> Report {
        Report {
            id: Uuid::new_v4(),
            leg_id: Uuid::nil(),
            report_type: ReportType::Noon,
            seq: 0,
            reported_at: Timestamp::now(),
            tz_offset: 0.0,
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn first_report_has_no_edge() {
        assert_eq!(link(None, &report()), None);
    }

    #[test]
    fn link_points_previous_to_new() {
        let prev = Uuid::new_v4();
        let r = report();

        let edge = link(Some(prev), &r).unwrap();

        assert_eq!(edge.previous_report, prev);
        assert_eq!(edge.next_report, r.id);
    }

    #[test]
    fn walk_follows_filing_order() {
        let reports: Vec<_> = (0..5).map(|_| report()).collect();
        let mut last = None;
        let mut edges = Vec::new();
        for r in &reports {
            edges.extend(link(last, r));
            last = Some(r.id);
        }

        let order = walk(reports[0].id, &edges).unwrap();

        assert_eq!(edges.len(), 4);
        assert_eq!(order, reports.iter().map(|r| r.id).collect::<Vec<_>>());
    }

    #[test]
    fn walk_single_report() {
        let id = Uuid::new_v4();
        assert_eq!(walk(id, &[]).unwrap(), vec![id]);
    }

    #[test]
    fn walk_detects_cycle() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let edges = [
            ReportEdge {
                previous_report: a,
                next_report: b,
            },
            ReportEdge {
                previous_report: b,
                next_report: a,
            },
        ];

        assert_eq!(walk(a, &edges).unwrap_err(), ChainError::Cycle(a));
    }

    #[test]
    fn walk_detects_orphaned_edges() {
        let a = Uuid::new_v4();
        let edges = [ReportEdge {
            previous_report: Uuid::new_v4(),
            next_report: Uuid::new_v4(),
        }];

        assert!(matches!(
            walk(a, &edges).unwrap_err(),
            ChainError::Disconnected { visited: 1, edges: 1, .. }
        ));
    }
}
