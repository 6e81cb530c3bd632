//! CLI interface for legbook.
//!
//! A thin front end over [`Storage`]: each subcommand is non-interactive,
//! arguments in, plain text or JSON out.
//!
//! - `legbook ship add|list|latest|legs|chain|prefill`: ships and their history.
//! - `legbook voyage new` / `legbook leg new|show`: lifecycle.
//! - `legbook report submit|show`: filing and reading reports.
//!
//! Ships can be referenced by full UUID or unambiguous prefix; voyages, legs
//! and reports take a full UUID.

mod format;
mod report;
mod ship;
mod voyage;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::model::Ship;
use crate::storage::Storage;

pub use report::ReportCommand;
pub use ship::ShipCommand;
pub use voyage::{LegCommand, VoyageCommand};

/// legbook: voyage report aggregation.
#[derive(Debug, Parser)]
#[command(name = "legbook", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Database file. Overrides `database` in the config file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: one leg
  1. legbook ship add 'Nordic Tern' --propeller-pitch 4.52
     → prints a ship ID (e.g. 5f0c2a91-...)
  2. legbook voyage new --ship 5f0 1
  3. legbook leg new --voyage <voyage-id> 1
  4. legbook report submit departure-standby.json
  5. legbook leg show <leg-id>

Reports are JSON submissions:
  {"legId": "...", "reportType": "noon", "seq": 3,
   "reportedAt": "2026-03-01T12:00:00Z", "tzOffset": 8.0,
   "sections": [{"section": "sailingPlan", ...}]}"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register ships and inspect their report history.
    Ship {
        #[command(subcommand)]
        command: ShipCommand,
    },

    /// Open voyages.
    Voyage {
        #[command(subcommand)]
        command: VoyageCommand,
    },

    /// Open legs and inspect their summaries.
    Leg {
        #[command(subcommand)]
        command: LegCommand,
    },

    /// File and read reports.
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

/// Run a parsed command, returning an error message on failure.
pub fn run(command: Command, storage: &Storage) -> Result<(), String> {
    match command {
        Command::Ship { command } => ship::run(storage, command),
        Command::Voyage { command } => voyage::run_voyage(storage, command),
        Command::Leg { command } => voyage::run_leg(storage, command),
        Command::Report { command } => report::run(storage, command),
    }
}

/// Parse a full UUID argument.
fn parse_id(kind: &str, reference: &str) -> Result<Uuid, String> {
    reference
        .parse::<Uuid>()
        .map_err(|e| format!("invalid {kind} id '{reference}': {e}"))
}

/// Resolve a ship reference (full UUID or unambiguous prefix) to a ship.
fn resolve_ship(storage: &Storage, reference: &str) -> Result<Ship, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_ship(id)
            .map_err(|e| format!("ship not found: {e}"));
    }

    let ships = storage
        .list_ships()
        .map_err(|e| format!("failed to list ships: {e}"))?;

    let matches: Vec<&Ship> = ships
        .iter()
        .filter(|s| s.id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no ship matching '{reference}'")),
        1 => Ok(matches[0].clone()),
        n => {
            let ids: Vec<String> = matches.iter().map(|s| format::short_id(s.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {n} ships: {}",
                ids.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("legbook.sqlite")).unwrap();
        (dir, storage)
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_commands() {
        let cli = Cli::try_parse_from(["legbook", "--db", "x.sqlite", "ship", "add", "Tern"]).unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("x.sqlite")));
        assert!(matches!(
            cli.command,
            Command::Ship {
                command: ShipCommand::Add { ref name, .. }
            } if name == "Tern"
        ));
    }

    #[test]
    fn resolve_ship_by_prefix() {
        let (_dir, storage) = test_storage();
        let ship = Ship::new("Nordic Tern", None);
        storage.register_ship(&ship).unwrap();

        let prefix = &ship.id.to_string()[..6];
        assert_eq!(resolve_ship(&storage, prefix).unwrap().id, ship.id);
        assert_eq!(
            resolve_ship(&storage, &ship.id.to_string()).unwrap().id,
            ship.id
        );
    }

    #[test]
    fn resolve_ship_without_match_fails() {
        let (_dir, storage) = test_storage();
        let err = resolve_ship(&storage, "zzz").unwrap_err();

        assert!(err.contains("no ship matching"));
    }

    #[test]
    fn parse_id_rejects_prefixes() {
        assert!(parse_id("leg", "a3b").unwrap_err().contains("invalid leg id"));
    }
}
