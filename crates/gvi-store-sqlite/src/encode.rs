//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Snapshot dates are `YYYY-MM-DD`. Upload timestamps are RFC 3339 UTC with a
//! fixed microsecond precision so that lexical order matches chronological
//! order. Regions are stored as their display label.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use gvi_core::{
  Region,
  record::{DATE_FORMAT, StockScoreRecord, UploadRecord, UploadStatus},
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Offset-less ISO 8601, as written by older versions of the tracker.
const NAIVE_DT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Accepts RFC 3339, or a naive ISO 8601 timestamp taken to be UTC.
pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .or_else(|e| {
      NaiveDateTime::parse_from_str(s, NAIVE_DT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| e)
    })
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── Region ──────────────────────────────────────────────────────────────────

pub fn encode_region(r: Region) -> String { r.to_string() }

pub fn decode_region(s: &str) -> Result<Region> { Ok(s.parse::<Region>()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `stock_scores` row.
pub struct RawScore {
  pub date:         String,
  pub ticker:       String,
  pub company_name: Option<String>,
  pub sector:       Option<String>,
  pub region:       Option<String>,
  pub score:        Option<f64>,
  pub decile:       Option<i64>,
}

impl RawScore {
  pub const COLUMNS: &'static str =
    "date, ticker, company_name, sector, region, score, decile";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      date:         row.get(0)?,
      ticker:       row.get(1)?,
      company_name: row.get(2)?,
      sector:       row.get(3)?,
      region:       row.get(4)?,
      score:        row.get(5)?,
      decile:       row.get(6)?,
    })
  }

  pub fn into_record(self) -> Result<StockScoreRecord> {
    let decile = self
      .decile
      .and_then(|d| u8::try_from(d).ok())
      .ok_or_else(|| {
        Error::Decode(format!("decile {:?} for {}", self.decile, self.ticker))
      })?;

    Ok(StockScoreRecord {
      date: decode_date(&self.date)?,
      region: self.region.as_deref().map(decode_region).transpose()?.unwrap_or_default(),
      ticker: self.ticker,
      company_name: self.company_name,
      sector: self.sector,
      score: self.score,
      decile,
    })
  }
}

/// Raw values read directly from an `upload_history` row.
pub struct RawUpload {
  pub id:               i64,
  pub upload_timestamp: String,
  pub filename:         String,
  pub date:             String,
  pub region:           String,
  pub stocks_count:     Option<i64>,
  pub status:           Option<String>,
}

impl RawUpload {
  pub const COLUMNS: &'static str =
    "id, upload_timestamp, filename, date, region, stocks_count, status";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      upload_timestamp: row.get(1)?,
      filename:         row.get(2)?,
      date:             row.get(3)?,
      region:           row.get(4)?,
      stocks_count:     row.get(5)?,
      status:           row.get(6)?,
    })
  }

  pub fn into_upload(self) -> Result<UploadRecord> {
    Ok(UploadRecord {
      id:           self.id,
      uploaded_at:  decode_dt(&self.upload_timestamp)?,
      filename:     self.filename,
      date:         decode_date(&self.date)?,
      region:       decode_region(&self.region)?,
      stocks_count: self
        .stocks_count
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0),
      status:       UploadStatus::parse(self.status.as_deref().unwrap_or_default()),
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1500);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn naive_timestamps_decode_as_utc() {
    let expected = Utc.with_ymd_and_hms(2025, 3, 11, 10, 22, 33).unwrap()
      + chrono::Duration::microseconds(123_456);
    assert_eq!(decode_dt("2025-03-11T10:22:33.123456").unwrap(), expected);
    assert_eq!(
      decode_dt("2025-03-11T10:22:33").unwrap(),
      Utc.with_ymd_and_hms(2025, 3, 11, 10, 22, 33).unwrap()
    );
    assert!(matches!(decode_dt("11/03/2025 10:22"), Err(Error::Decode(_))));
  }

  #[test]
  fn null_region_decodes_as_us() {
    let raw = RawScore {
      date:         "2025-01-01".into(),
      ticker:       "AAPL".into(),
      company_name: None,
      sector:       None,
      region:       None,
      score:        None,
      decile:       Some(7),
    };
    assert_eq!(raw.into_record().unwrap().region, Region::Us);
  }

  #[test]
  fn null_decile_is_a_decode_error() {
    let raw = RawScore {
      date:         "2025-01-01".into(),
      ticker:       "AAPL".into(),
      company_name: None,
      sector:       None,
      region:       Some("US".into()),
      score:        None,
      decile:       None,
    };
    assert!(matches!(raw.into_record(), Err(Error::Decode(_))));
  }
}
