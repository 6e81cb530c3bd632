//! Lifecycle commands: voyage new, leg new, leg show.

use clap::Subcommand;

use crate::storage::Storage;

use super::format::{format_progress, format_summary, print_json, short_id};
use super::{parse_id, resolve_ship};

#[derive(Debug, Subcommand)]
pub enum VoyageCommand {
    /// Open a voyage. Prints the voyage ID.
    ///
    /// Refused while the ship's previous voyage has no complete last leg.
    New {
        /// Ship ID: full UUID or unambiguous prefix.
        #[arg(long)]
        ship: String,

        /// Voyage number, unique per ship.
        voyage_num: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum LegCommand {
    /// Open a leg. Prints the leg ID.
    ///
    /// Refused while the voyage's previous leg has not reached
    /// arrival-complete.
    New {
        /// Voyage ID.
        #[arg(long)]
        voyage: String,

        /// Leg number, unique per voyage.
        leg_num: u32,
    },

    /// Show a leg's progress and rolling summary.
    Show {
        /// Leg ID.
        leg: String,

        /// Print the full summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

pub(super) fn run_voyage(storage: &Storage, command: VoyageCommand) -> Result<(), String> {
    match command {
        VoyageCommand::New { ship, voyage_num } => {
            let ship = resolve_ship(storage, &ship)?;
            let voyage = storage
                .open_voyage(ship.id, voyage_num)
                .map_err(|e| format!("failed to open voyage: {e}"))?;
            println!("{}", voyage.id);
            Ok(())
        }
    }
}

pub(super) fn run_leg(storage: &Storage, command: LegCommand) -> Result<(), String> {
    match command {
        LegCommand::New { voyage, leg_num } => {
            let voyage_id = parse_id("voyage", &voyage)?;
            let leg = storage
                .open_leg(voyage_id, leg_num)
                .map_err(|e| format!("failed to open leg: {e}"))?;
            println!("{}", leg.id);
            Ok(())
        }
        LegCommand::Show { leg, json } => cmd_show(storage, &leg, json),
    }
}

fn cmd_show(storage: &Storage, reference: &str, json: bool) -> Result<(), String> {
    let leg_id = parse_id("leg", reference)?;
    let leg = storage
        .load_leg(leg_id)
        .map_err(|e| format!("leg not found: {e}"))?;
    let summary = storage
        .load_aggregate(leg_id)
        .map_err(|e| format!("failed to load leg summary: {e}"))?;

    if json {
        return print_json(&summary);
    }

    let progress = storage
        .load_progress(leg_id)
        .map_err(|e| format!("failed to load progress: {e}"))?;

    println!("Leg {} (#{})", short_id(leg.id), leg.leg_num);
    println!("{}", format_progress(&progress));
    match &summary {
        Some(s) => println!("{}", format_summary(s)),
        None => println!("No reports yet"),
    }
    Ok(())
}
