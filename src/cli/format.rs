//! Output formatting for CLI display.

use serde::Serialize;
use uuid::Uuid;

use crate::model::{
    FuelLedger, LegAggregate, LegProgress, Milestone, Report, VoyageLeg,
};

const MILESTONES: [Milestone; 4] = [
    Milestone::DepartureStandby,
    Milestone::DepartureUnderway,
    Milestone::ArrivalStandby,
    Milestone::ArrivalComplete,
];

/// First eight characters of an id.
pub(super) fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

pub(super) fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| format!("failed to serialize: {e}"))?;
    println!("{json}");
    Ok(())
}

pub(super) fn format_report_line(report: &Report) -> String {
    format!(
        "{}  #{:<4} {:<20} {} (UTC{:+})",
        short_id(report.id),
        report.seq,
        report.report_type,
        report.reported_at,
        report.tz_offset,
    )
}

pub(super) fn format_leg_line(leg: &VoyageLeg, voyage_num: Option<u32>, complete: bool) -> String {
    let voyage = voyage_num.map_or_else(|| "?".to_string(), |n| n.to_string());
    let state = if complete { "complete" } else { "open" };
    format!(
        "{}  voyage {voyage} leg {}  [{state}]",
        short_id(leg.id),
        leg.leg_num
    )
}

/// One line per milestone, checked or not, plus the latest pointers.
pub(super) fn format_progress(progress: &LegProgress) -> String {
    let mut lines: Vec<String> = MILESTONES
        .iter()
        .map(|m| match progress.milestone(*m) {
            Some(id) => format!("  [x] {m:<20} {}", short_id(id)),
            None => format!("  [ ] {m}"),
        })
        .collect();

    if let Some(id) = progress.latest_periodic {
        lines.push(format!("  latest noon          {}", short_id(id)));
    }
    if let Some(id) = progress.latest_report {
        lines.push(format!("  latest report        {}", short_id(id)));
    }
    lines.join("\n")
}

/// Human-readable digest of a leg summary. `--json` shows everything.
pub(super) fn format_summary(agg: &LegAggregate) -> String {
    let mut lines = Vec::new();

    if let Some(route) = &agg.route {
        lines.push(format!(
            "Route: {} -> {}",
            route.departure_port, route.arrival_port
        ));
    }
    if let Some(t) = agg.last_report_type {
        lines.push(format!("Last report: {t}"));
    }
    if let Some(d) = agg.distance_observed_total {
        lines.push(format!("Distance observed: {d} nm"));
    }
    if let Some(d) = agg.distance_to_go {
        lines.push(format!("Distance to go: {d} nm"));
    }
    if let Some(h) = agg.time_stopped_at_sea {
        lines.push(format!("Stopped at sea: {h} h"));
    }
    if let Some(p) = &agg.parking_status {
        lines.push(format!("Parking: {p}"));
    }

    if !agg.fuel.robs.is_empty() {
        let robs: Vec<String> = agg
            .fuel
            .robs
            .0
            .iter()
            .map(|(fuel, qty)| format!("{fuel} {qty}"))
            .collect();
        lines.push(format!("Fuel ROB: {}", robs.join(", ")));
    }
    for (label, ledger) in [
        ("port to port", &agg.fuel.port_to_port),
        ("pilot to pilot", &agg.fuel.pilot_to_pilot),
        ("in harbour", &agg.fuel.in_harbour),
    ] {
        if !ledger.is_empty() {
            lines.push(format!("Fuel {label}: {}", format_fuel_ledger(ledger)));
        }
    }
    lines.push(format!("Freshwater ROB: {}", agg.freshwater.rob));
    lines.push(format!("Summary version: {}", agg.version));

    lines.join("\n")
}

fn format_fuel_ledger(ledger: &FuelLedger) -> String {
    ledger
        .0
        .iter()
        .map(|(fuel, per_machinery)| {
            let parts: Vec<String> = per_machinery
                .iter()
                .map(|(m, qty)| format!("{m} {qty}"))
                .collect();
            format!("{fuel} [{}]", parts.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
