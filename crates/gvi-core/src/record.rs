//! Record types: the rows persisted by a [`ScoreStore`](crate::store::ScoreStore).
//!
//! A stock score record is one ticker's quality reading in one snapshot,
//! keyed by `(date, ticker, region)`. Upload records form an append-only log
//! of every ingest attempt.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Region, Result};

/// Date format used for snapshot dates everywhere (ISO 8601 calendar date).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` snapshot date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
    .map_err(|_| Error::InvalidDate(s.to_owned()))
}

// ─── Stock scores ────────────────────────────────────────────────────────────

/// One row per `(date, ticker, region)`.
///
/// `decile` is already inverted from the source polarity: 10 is the best
/// quality band, 1 the worst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockScoreRecord {
  pub date:         NaiveDate,
  pub ticker:       String,
  pub company_name: Option<String>,
  pub sector:       Option<String>,
  pub region:       Region,
  pub score:        Option<f64>,
  pub decile:       u8,
}

/// Row count for one `(region, date)` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
  pub region: Region,
  pub date:   NaiveDate,
  pub count:  u64,
}

/// Criteria for [`ScoreStore::delete_data`](crate::store::ScoreStore::delete_data).
/// Supplied fields are combined with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteFilter {
  pub date:   Option<NaiveDate>,
  pub region: Option<Region>,
}

impl DeleteFilter {
  pub fn is_empty(&self) -> bool { self.date.is_none() && self.region.is_none() }

  /// Fails with [`Error::InvalidArgument`] when no criterion is set.
  pub fn ensure_not_empty(&self) -> Result<()> {
    if self.is_empty() {
      return Err(Error::InvalidArgument(
        "must specify date, region, or both".into(),
      ));
    }
    Ok(())
  }
}

impl fmt::Display for DeleteFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (self.date, self.region) {
      (Some(d), Some(r)) => write!(f, "{r} on {d}"),
      (Some(d), None) => write!(f, "all regions on {d}"),
      (None, Some(r)) => write!(f, "region {r}"),
      (None, None) => write!(f, "nothing"),
    }
  }
}

// ─── Upload history ──────────────────────────────────────────────────────────

/// Outcome of one ingest attempt as written to the upload log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum UploadStatus {
  Success,
  Failed(String),
}

impl UploadStatus {
  const FAILED_PREFIX: &'static str = "FAILED: ";

  pub fn is_success(&self) -> bool { matches!(self, Self::Success) }

  /// Decode the `status` column. Anything other than `SUCCESS` is a failure;
  /// the `FAILED: ` prefix is stripped when present.
  pub fn parse(s: &str) -> Self {
    if s == "SUCCESS" {
      Self::Success
    } else {
      let message = s.strip_prefix(Self::FAILED_PREFIX).unwrap_or(s);
      Self::Failed(message.to_owned())
    }
  }
}

impl fmt::Display for UploadStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Success => f.write_str("SUCCESS"),
      Self::Failed(msg) => write!(f, "{}{msg}", Self::FAILED_PREFIX),
    }
  }
}

/// Input to [`ScoreStore::record_upload`](crate::store::ScoreStore::record_upload).
/// The timestamp is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUpload {
  pub filename:     String,
  pub date:         NaiveDate,
  pub region:       Region,
  pub stocks_count: u64,
  pub status:       UploadStatus,
}

/// A persisted upload-log row. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
  pub id:           i64,
  pub uploaded_at:  DateTime<Utc>,
  pub filename:     String,
  pub date:         NaiveDate,
  pub region:       Region,
  pub stocks_count: u64,
  pub status:       UploadStatus,
}

// ─── Migration ───────────────────────────────────────────────────────────────

/// What a schema migration changed. All-false means the store was current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
  pub created_scores_table:   bool,
  pub added_region_column:    bool,
  pub created_upload_history: bool,
  pub rebuilt_unique_key:     bool,
  /// Rows lost to the tighter uniqueness key during a rebuild, or to a
  /// relabel that made two rows share a key.
  pub dropped_duplicates:     u64,
  /// Rows whose region was missing or stored under an alternate spelling
  /// and was rewritten to the canonical label.
  pub relabeled_regions:      u64,
}

impl MigrationReport {
  pub fn is_noop(&self) -> bool { *self == Self::default() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_display_and_parse() {
    assert_eq!(UploadStatus::Success.to_string(), "SUCCESS");
    let failed = UploadStatus::Failed("missing columns".into());
    assert_eq!(failed.to_string(), "FAILED: missing columns");
    assert_eq!(UploadStatus::parse("FAILED: missing columns"), failed);
    assert_eq!(UploadStatus::parse("SUCCESS"), UploadStatus::Success);
  }

  #[test]
  fn status_without_prefix_is_failure() {
    assert_eq!(
      UploadStatus::parse("garbage"),
      UploadStatus::Failed("garbage".into())
    );
  }

  #[test]
  fn empty_delete_filter_is_rejected() {
    let err = DeleteFilter::default().ensure_not_empty().unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let filter = DeleteFilter { date: None, region: Some(Region::Uk) };
    assert!(filter.ensure_not_empty().is_ok());
  }

  #[test]
  fn parse_date_accepts_iso_only() {
    assert_eq!(
      parse_date("2025-03-11").unwrap(),
      NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
    );
    assert!(matches!(parse_date("11/03/2025"), Err(Error::InvalidDate(_))));
  }

  #[test]
  fn default_migration_report_is_noop() {
    assert!(MigrationReport::default().is_noop());
    let report = MigrationReport { added_region_column: true, ..Default::default() };
    assert!(!report.is_noop());
  }
}
