//! CSV export of reports and store listings.
//!
//! Every writer takes any [`std::io::Write`] so callers can target a file,
//! stdout or an in-memory buffer. Optional fields are written as empty
//! cells.

use std::io::Write;

use gvi_core::{
  movers::Movement,
  record::{DATE_FORMAT, SnapshotSummary, StockScoreRecord, UploadRecord},
};

use crate::{Error, Result};

fn opt(s: &Option<String>) -> &str { s.as_deref().unwrap_or("") }

fn opt_f64(v: Option<f64>) -> String { v.map(|x| x.to_string()).unwrap_or_default() }

fn finish<W: Write>(wtr: csv::Writer<W>) -> Result<W> {
  wtr.into_inner().map_err(|e| Error::Flush(e.to_string()))
}

/// Columns: ticker, company_name, sector, start_decile, end_decile,
/// decile_change.
pub fn write_movements<W: Write>(out: W, movements: &[Movement]) -> Result<W> {
  let mut wtr = csv::Writer::from_writer(out);
  wtr.write_record([
    "ticker",
    "company_name",
    "sector",
    "start_decile",
    "end_decile",
    "decile_change",
  ])?;
  for m in movements {
    wtr.write_record([
      m.ticker.as_str(),
      opt(&m.company_name),
      opt(&m.sector),
      &m.start_decile.to_string(),
      &m.end_decile.to_string(),
      &m.decile_change.to_string(),
    ])?;
  }
  finish(wtr)
}

/// Columns: ticker, company_name, sector, decile, score.
pub fn write_snapshot<W: Write>(out: W, records: &[StockScoreRecord]) -> Result<W> {
  let mut wtr = csv::Writer::from_writer(out);
  wtr.write_record(["ticker", "company_name", "sector", "decile", "score"])?;
  for r in records {
    wtr.write_record([
      r.ticker.as_str(),
      opt(&r.company_name),
      opt(&r.sector),
      &r.decile.to_string(),
      &opt_f64(r.score),
    ])?;
  }
  finish(wtr)
}

/// Columns: date, decile, score, sector, region.
pub fn write_ticker_history<W: Write>(out: W, history: &[StockScoreRecord]) -> Result<W> {
  let mut wtr = csv::Writer::from_writer(out);
  wtr.write_record(["date", "decile", "score", "sector", "region"])?;
  for r in history {
    wtr.write_record([
      r.date.format(DATE_FORMAT).to_string().as_str(),
      &r.decile.to_string(),
      &opt_f64(r.score),
      opt(&r.sector),
      &r.region.to_string(),
    ])?;
  }
  finish(wtr)
}

/// Columns: region, date, stock_count.
pub fn write_summary<W: Write>(out: W, summary: &[SnapshotSummary]) -> Result<W> {
  let mut wtr = csv::Writer::from_writer(out);
  wtr.write_record(["region", "date", "stock_count"])?;
  for s in summary {
    wtr.write_record([
      s.region.to_string(),
      s.date.format(DATE_FORMAT).to_string(),
      s.count.to_string(),
    ])?;
  }
  finish(wtr)
}

/// Columns: id, upload_timestamp, filename, date, region, stocks_count,
/// status.
pub fn write_upload_history<'a, W, I>(out: W, uploads: I) -> Result<W>
where
  W: Write,
  I: IntoIterator<Item = &'a UploadRecord>,
{
  let mut wtr = csv::Writer::from_writer(out);
  wtr.write_record([
    "id",
    "upload_timestamp",
    "filename",
    "date",
    "region",
    "stocks_count",
    "status",
  ])?;
  for u in uploads {
    wtr.write_record([
      u.id.to_string(),
      u.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
      u.filename.clone(),
      u.date.format(DATE_FORMAT).to_string(),
      u.region.to_string(),
      u.stocks_count.to_string(),
      u.status.to_string(),
    ])?;
  }
  finish(wtr)
}
