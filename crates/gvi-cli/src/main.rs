//! `gvi`: command-line front end for the GVI decile tracker.
//!
//! # Usage
//!
//! ```text
//! gvi upload --file gvi_us.xlsx --date 2025-03-11 --region US
//! gvi dates
//! gvi analyze --start 2024-07-10 --end 2025-03-11
//! gvi analyze --months 6 --end 2025-03-11 --region UK --export-dir reports/
//! gvi export --output summary.csv
//! gvi ticker --symbol aapl
//! ```

mod cli;
mod commands;
mod render;

mod settings;


use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;
use gvi_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use settings::Settings;

fn main() -> anyhow::Result<ExitCode> {
  // Logs go to stderr; stdout carries reports.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)?;
  if let Some(db) = cli.db {
    settings.db_path = settings::expand_tilde(&db);
  }

  // `migrate` opens the raw file so it can report what it changes.
  let store = if matches!(cli.command, Command::Migrate) {
    SqliteStore::open_without_migration(&settings.db_path)
  } else {
    SqliteStore::open(&settings.db_path)
  }
  .with_context(|| format!("failed to open store at {}", settings.db_path.display()))?;

  let mut out = std::io::stdout().lock();
  commands::run(&store, &settings, cli.command, &mut out)
}
