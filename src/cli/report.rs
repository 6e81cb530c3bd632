//! Report commands: submit, show.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::{model::Submission, storage::Storage};

use super::format::{format_report_line, print_json};
use super::parse_id;

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// File a report from a JSON submission. Prints the report ID.
    Submit {
        /// Submission file, or `-` for stdin.
        file: PathBuf,
    },

    /// Show a report header and its archived sections.
    Show {
        /// Report ID.
        report: String,
    },
}

pub(super) fn run(storage: &Storage, command: ReportCommand) -> Result<(), String> {
    match command {
        ReportCommand::Submit { file } => cmd_submit(storage, &file),
        ReportCommand::Show { report } => cmd_show(storage, &report),
    }
}

fn cmd_submit(storage: &Storage, file: &Path) -> Result<(), String> {
    let json = if file.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        buf
    } else {
        fs::read_to_string(file).map_err(|e| format!("failed to read {}: {e}", file.display()))?
    };

    let submission: Submission =
        serde_json::from_str(&json).map_err(|e| format!("invalid submission: {e}"))?;

    let receipt = storage
        .submit_report(&submission)
        .map_err(|e| format!("failed to submit report: {e}"))?;

    println!("{}", receipt.report.id);
    eprintln!("{}", format_report_line(&receipt.report));
    if let Some(edge) = receipt.edge {
        eprintln!("Follows {}", edge.previous_report);
    }
    Ok(())
}

fn cmd_show(storage: &Storage, reference: &str) -> Result<(), String> {
    let id = parse_id("report", reference)?;
    let report = storage
        .load_report(id)
        .map_err(|e| format!("report not found: {e}"))?;
    let sections = storage
        .load_sections(id)
        .map_err(|e| format!("failed to load sections: {e}"))?;

    print_json(&serde_json::json!({
        "report": report,
        "sections": sections,
    }))
}
