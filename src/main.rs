use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use legbook::cli::{self, Cli};
use legbook::config::Config;
use legbook::storage::Storage;

fn main() {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = cli
        .db
        .clone()
        .or_else(|| config.database.clone())
        .or_else(Storage::default_path)
    else {
        eprintln!("Could not determine home directory.");
        process::exit(1);
    };

    let storage = match Storage::new(path) {
        Ok(s) => s.with_busy_timeout(config.busy_timeout()),
        Err(e) => {
            eprintln!("Failed to initialize storage: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(cli.command, &storage) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
