//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use gvi_core::{
  Region,
  movers::{ThresholdPolicy, Thresholds},
  overview::StatusKind,
  record::parse_date,
};

#[derive(Parser, Debug)]
#[command(name = "gvi", version, about = "GVI stock decile movement tracker")]
pub struct Cli {
  /// Path to a TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "gvi.toml")]
  pub config: PathBuf,

  /// SQLite database file; overrides the configured `db_path`.
  #[arg(long, value_name = "PATH")]
  pub db: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Upload a GVI export (xlsx, xls, ods or CSV) as one date/region snapshot.
  Upload {
    #[arg(long)]
    file:   PathBuf,
    /// Snapshot date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    date:   NaiveDate,
    /// Region label; defaults to the configured region.
    #[arg(long)]
    region: Option<Region>,
    /// Fail the upload when the file has no usable rows.
    #[arg(long)]
    strict: bool,
  },

  /// List snapshot dates, newest first.
  Dates {
    #[arg(long)]
    region: Option<Region>,
    #[arg(long)]
    json:   bool,
  },

  /// List regions with data.
  Regions {
    #[arg(long)]
    json: bool,
  },

  /// Row counts per region and date.
  Summary {
    /// Collapse to one line per region with its date range.
    #[arg(long)]
    by_region: bool,
    #[arg(long)]
    json:      bool,
  },

  /// Find tickers that crossed into the top or bottom deciles.
  Analyze(AnalyzeArgs),

  /// Export the data summary, the upload log or one snapshot as CSV.
  Export {
    #[arg(long, default_value = "gvi_summary.csv")]
    output: PathBuf,
    #[arg(long, value_enum, default_value_t = ExportKind::Summary)]
    kind:   ExportKind,
    /// Snapshot date; required with `--kind snapshot`.
    #[arg(long, value_parser = parse_date, required_if_eq("kind", "snapshot"))]
    date:   Option<NaiveDate>,
    /// Restrict a snapshot export to one region.
    #[arg(long)]
    region: Option<Region>,
  },

  /// Show the decile history of one ticker.
  Ticker {
    /// Ticker symbol (case-insensitive).
    #[arg(long)]
    symbol: String,
    #[arg(long)]
    region: Option<Region>,
    /// Also write the history to this CSV file.
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
    #[arg(long)]
    json:   bool,
  },

  /// Show the upload log.
  History {
    /// `success` or `failed`.
    #[arg(long)]
    status: Option<StatusKind>,
    #[arg(long)]
    region: Option<Region>,
    #[arg(long)]
    json:   bool,
  },

  /// Delete stored rows by date, region, or both.
  Delete {
    #[arg(long, value_parser = parse_date)]
    date:   Option<NaiveDate>,
    #[arg(long)]
    region: Option<Region>,
  },

  /// Upgrade a database created before region support.
  Migrate,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
  /// Start date (YYYY-MM-DD).
  #[arg(long, value_parser = parse_date, required_unless_present = "months")]
  pub start:      Option<NaiveDate>,

  /// Use the stored date closest to `end` minus this many months as start.
  #[arg(long, conflicts_with = "start")]
  pub months:     Option<u32>,

  /// End date (YYYY-MM-DD).
  #[arg(long, value_parser = parse_date)]
  pub end:        NaiveDate,

  /// Threshold preset: top-bottom-3, magnitude-3 or magnitude-5.
  #[arg(long, default_value_t = ThresholdPolicy::TopBottom3)]
  pub threshold:  ThresholdPolicy,

  /// Override the top-band threshold of the preset.
  #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
  pub top:        Option<u8>,

  /// Override the bottom-band threshold of the preset.
  #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
  pub bottom:     Option<u8>,

  #[arg(long)]
  pub region:     Option<Region>,

  /// Rows shown per list.
  #[arg(long, default_value_t = 10)]
  pub limit:      usize,

  /// Write top/bottom entrant and movement CSVs into this directory.
  #[arg(long, value_name = "DIR")]
  pub export_dir: Option<PathBuf>,

  #[arg(long)]
  pub json:       bool,
}

impl AnalyzeArgs {
  pub fn thresholds(&self) -> Thresholds {
    let preset = self.threshold.thresholds();
    Thresholds {
      top:    self.top.unwrap_or(preset.top),
      bottom: self.bottom.unwrap_or(preset.bottom),
    }
  }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
  Summary,
  Uploads,
  Snapshot,
}
