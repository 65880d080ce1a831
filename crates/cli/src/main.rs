mod cli;
mod commands;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use timesheet_core::config::{load_dotenv, Config};
use timesheet_storage::SqliteStore;

use crate::cli::CliArgs;
use crate::terminal::Terminal;

fn main() -> Result<()> {
    // Logs go to stderr so reports on stdout stay pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // .env must be loaded before parsing so TIMESHEET_DATABASE can come from it.
    load_dotenv();
    let args = CliArgs::parse();

    let mut config = Config::from_env();
    if let Some(database) = args.database.clone() {
        config.storage.database_path = database;
    }
    config.log_summary();

    let store = SqliteStore::new(config.storage.database_path.clone());
    store
        .initialize()
        .with_context(|| format!("failed to initialize {}", store.path().display()))?;
    info!(database = %store.path().display(), "store ready");

    let terminal = Terminal::new(args.json);
    commands::run(args.command, store, &config, &terminal)
}
