//! Ship commands: add, list, latest, legs, chain, prefill.

use clap::Subcommand;
use rust_decimal::Decimal;

use crate::{model::Ship, storage::Storage};

use super::format::{format_leg_line, format_report_line, print_json, short_id};
use super::resolve_ship;

#[derive(Debug, Subcommand)]
pub enum ShipCommand {
    /// Register a ship. Prints the ship ID.
    Add {
        /// Ship name.
        name: String,

        /// Propeller pitch, copied into each new leg summary.
        #[arg(long)]
        propeller_pitch: Option<Decimal>,
    },

    /// List registered ships.
    List,

    /// Show the most recent report a ship filed.
    Latest {
        /// Ship ID: full UUID or unambiguous prefix.
        ship: String,
    },

    /// List every leg across the ship's voyages.
    Legs { ship: String },

    /// Walk every report the ship has filed, oldest first.
    Chain { ship: String },

    /// Print the summary of the leg the ship last reported on, as JSON.
    Prefill { ship: String },
}

pub(super) fn run(storage: &Storage, command: ShipCommand) -> Result<(), String> {
    match command {
        ShipCommand::Add {
            name,
            propeller_pitch,
        } => cmd_add(storage, name, propeller_pitch),
        ShipCommand::List => cmd_list(storage),
        ShipCommand::Latest { ship } => cmd_latest(storage, &ship),
        ShipCommand::Legs { ship } => cmd_legs(storage, &ship),
        ShipCommand::Chain { ship } => cmd_chain(storage, &ship),
        ShipCommand::Prefill { ship } => cmd_prefill(storage, &ship),
    }
}

fn cmd_add(storage: &Storage, name: String, propeller_pitch: Option<Decimal>) -> Result<(), String> {
    let ship = Ship::new(name, propeller_pitch);
    storage
        .register_ship(&ship)
        .map_err(|e| format!("failed to register ship: {e}"))?;

    println!("{}", ship.id);
    Ok(())
}

fn cmd_list(storage: &Storage) -> Result<(), String> {
    let ships = storage
        .list_ships()
        .map_err(|e| format!("failed to list ships: {e}"))?;

    if ships.is_empty() {
        println!("No ships");
        return Ok(());
    }

    for s in &ships {
        let last = s.last_report.map_or_else(|| "-".to_string(), short_id);
        println!("{}  {}  last report {last}", short_id(s.id), s.name);
    }
    Ok(())
}

fn cmd_latest(storage: &Storage, reference: &str) -> Result<(), String> {
    let ship = resolve_ship(storage, reference)?;
    let report = storage
        .latest_report(ship.id)
        .map_err(|e| format!("failed to load latest report: {e}"))?;

    match report {
        Some(r) => print_json(&r),
        None => {
            println!("{} has not reported yet", ship.name);
            Ok(())
        }
    }
}

fn cmd_legs(storage: &Storage, reference: &str) -> Result<(), String> {
    let ship = resolve_ship(storage, reference)?;
    let legs = storage
        .list_legs(ship.id)
        .map_err(|e| format!("failed to list legs: {e}"))?;
    let voyages = storage
        .list_voyages(ship.id)
        .map_err(|e| format!("failed to list voyages: {e}"))?;

    if legs.is_empty() {
        println!("No legs");
        return Ok(());
    }

    for leg in &legs {
        let voyage_num = voyages
            .iter()
            .find(|v| v.id == leg.voyage_id)
            .map(|v| v.voyage_num);
        let complete = storage
            .is_leg_complete(leg.id)
            .map_err(|e| format!("failed to load progress: {e}"))?;
        println!("{}", format_leg_line(leg, voyage_num, complete));
    }
    Ok(())
}

fn cmd_chain(storage: &Storage, reference: &str) -> Result<(), String> {
    let ship = resolve_ship(storage, reference)?;
    let chain = storage
        .report_chain(ship.id)
        .map_err(|e| format!("failed to walk report chain: {e}"))?;

    if chain.is_empty() {
        println!("No reports");
        return Ok(());
    }

    for report in &chain {
        println!("{}", format_report_line(report));
    }
    Ok(())
}

fn cmd_prefill(storage: &Storage, reference: &str) -> Result<(), String> {
    let ship = resolve_ship(storage, reference)?;
    let summary = storage
        .prefill(ship.id)
        .map_err(|e| format!("failed to load prefill: {e}"))?;

    match summary {
        Some(s) => print_json(&s),
        None => {
            println!("{} has not reported yet", ship.name);
            Ok(())
        }
    }
}
