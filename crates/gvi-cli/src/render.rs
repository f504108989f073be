//! Plain-text report rendering.

use std::io::{self, Write};

use gvi_core::{
  movers::{Movement, MovementReport},
  overview::{RegionOverview, TickerOverview, UploadStats},
  record::{MigrationReport, SnapshotSummary, StockScoreRecord, UploadRecord},
};

const SCALE_NOTE: &str = "Decile 10 = Best Quality | Decile 1 = Worst Quality";

fn or_dash(value: Option<&str>) -> &str { value.unwrap_or("-") }

pub fn summary(out: &mut impl Write, rows: &[SnapshotSummary]) -> io::Result<()> {
  if rows.is_empty() {
    return writeln!(out, "No data stored yet");
  }
  writeln!(out, "{:<20} {:<10} {:>8}", "REGION", "DATE", "STOCKS")?;
  for row in rows {
    writeln!(out, "{:<20} {:<10} {:>8}", row.region.label(), row.date, row.count)?;
  }
  Ok(())
}

pub fn region_overview(out: &mut impl Write, rows: &[RegionOverview]) -> io::Result<()> {
  if rows.is_empty() {
    return writeln!(out, "No data stored yet");
  }
  writeln!(
    out,
    "{:<20} {:<10} {:<10} {:>6} {:>8}",
    "REGION", "EARLIEST", "LATEST", "DATES", "RECORDS"
  )?;
  for row in rows {
    writeln!(
      out,
      "{:<20} {:<10} {:<10} {:>6} {:>8}",
      row.region.label(),
      row.earliest,
      row.latest,
      row.data_points,
      row.total_records
    )?;
  }
  Ok(())
}

// ─── Movements ───────────────────────────────────────────────────────────────

pub fn movement_report(
  out: &mut impl Write,
  report: &MovementReport,
  limit: usize,
) -> io::Result<()> {
  let scope = report.region.map_or("all regions", |r| r.label());
  writeln!(out, "Decile movements {} -> {} ({scope})", report.start, report.end)?;
  writeln!(out, "{SCALE_NOTE}")?;
  writeln!(
    out,
    "Thresholds: top >= {}, bottom <= {}",
    report.thresholds.top, report.thresholds.bottom
  )?;
  writeln!(out)?;

  writeln!(out, "Top entrants: {}", report.top_entrants.len())?;
  movements(out, &report.top_entrants, limit)?;
  writeln!(out)?;

  writeln!(out, "Bottom entrants: {}", report.bottom_entrants.len())?;
  movements(out, &report.bottom_entrants, limit)?;
  writeln!(out)?;

  writeln!(out, "Total stocks analyzed: {}", report.total_analyzed)?;
  match report.average_change() {
    Some(avg) => writeln!(out, "Average decile change: {avg:+.2}"),
    None => writeln!(out, "No tickers present on both dates"),
  }
}

fn movements(out: &mut impl Write, rows: &[Movement], limit: usize) -> io::Result<()> {
  for m in rows.iter().take(limit) {
    writeln!(
      out,
      "  {:<10} {:<32} {:>2} -> {:<2} ({:+})",
      m.ticker,
      or_dash(m.company_name.as_deref()),
      m.start_decile,
      m.end_decile,
      m.decile_change
    )?;
  }
  if rows.len() > limit {
    writeln!(out, "  ... and {} more", rows.len() - limit)?;
  }
  Ok(())
}

// ─── Tickers ─────────────────────────────────────────────────────────────────

pub fn ticker(
  out: &mut impl Write,
  overview: &TickerOverview,
  history: &[StockScoreRecord],
) -> io::Result<()> {
  writeln!(
    out,
    "{} ({})",
    overview.ticker,
    or_dash(overview.company_name.as_deref())
  )?;
  writeln!(out, "Sector:        {}", or_dash(overview.latest_sector.as_deref()))?;
  writeln!(out, "Region:        {}", overview.latest_region)?;
  writeln!(out, "Latest decile: {}", overview.latest_decile)?;
  match overview.overall_change {
    Some(change) => writeln!(out, "Change:        {change:+}")?,
    None => writeln!(out, "Change:        -")?,
  }
  writeln!(out, "Data points:   {}", overview.data_points)?;
  writeln!(out)?;

  writeln!(out, "{:<10} {:<20} {:>6} {:>10}", "DATE", "REGION", "DECILE", "SCORE")?;
  for row in history {
    let score = row.score.map_or_else(|| "-".to_owned(), |s| format!("{s:.4}"));
    writeln!(
      out,
      "{:<10} {:<20} {:>6} {:>10}",
      row.date,
      row.region.label(),
      row.decile,
      score
    )?;
  }
  Ok(())
}

// ─── Upload log ──────────────────────────────────────────────────────────────

pub fn upload_stats(out: &mut impl Write, stats: &UploadStats) -> io::Result<()> {
  writeln!(
    out,
    "Uploads: {} total, {} successful, {} failed",
    stats.total, stats.successful, stats.failed
  )
}

pub fn uploads(out: &mut impl Write, rows: &[&UploadRecord]) -> io::Result<()> {
  if rows.is_empty() {
    return writeln!(out, "No uploads recorded");
  }
  for u in rows {
    writeln!(
      out,
      "{:>4}  {}  {:<20} {}  {:<20} {:>6}  {}",
      u.id,
      u.uploaded_at.format("%Y-%m-%d %H:%M:%S"),
      u.filename,
      u.date,
      u.region.label(),
      u.stocks_count,
      u.status
    )?;
  }
  Ok(())
}

pub fn migration(out: &mut impl Write, report: &MigrationReport) -> io::Result<()> {
  writeln!(out, "Migration complete:")?;
  if report.created_scores_table {
    writeln!(out, "  created stock_scores table")?;
  }
  if report.added_region_column {
    writeln!(out, "  added region column (existing rows set to US)")?;
  }
  if report.rebuilt_unique_key {
    writeln!(out, "  rebuilt unique key on (date, ticker, region)")?;
  }
  if report.dropped_duplicates > 0 {
    writeln!(out, "  dropped {} duplicate rows", report.dropped_duplicates)?;
  }
  if report.relabeled_regions > 0 {
    writeln!(out, "  relabeled {} rows to canonical region names", report.relabeled_regions)?;
  }
  if report.created_upload_history {
    writeln!(out, "  created upload_history table")?;
  }
  Ok(())
}
