//! The `ScoreStore` trait.
//!
//! Implemented by storage backends (e.g. `gvi-store-sqlite`). The movement
//! analyzer and upload pipeline take a `&impl ScoreStore`, never a concrete
//! backend. Every method is synchronous and runs as its own transaction.

use chrono::NaiveDate;

use crate::{
  Region,
  record::{
    DeleteFilter, MigrationReport, NewUpload, SnapshotSummary, StockScoreRecord,
    UploadRecord,
  },
};

/// Abstraction over a snapshot store backend.
pub trait ScoreStore {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert or replace each record by its `(date, ticker, region)` key.
  /// Returns the number of records processed, not the number newly inserted.
  fn upsert_snapshot(&self, records: &[StockScoreRecord]) -> Result<u64, Self::Error>;

  /// Append one row to the upload log.
  fn record_upload(&self, upload: NewUpload) -> Result<UploadRecord, Self::Error>;

  /// Delete rows matching every supplied criterion and return how many were
  /// removed. An empty filter is rejected without deleting anything.
  fn delete_data(&self, filter: &DeleteFilter) -> Result<u64, Self::Error>;

  /// Bring an older schema up to the current shape. Idempotent.
  fn migrate(&self) -> Result<MigrationReport, Self::Error>;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Distinct snapshot dates across all regions, newest first.
  fn list_dates(&self) -> Result<Vec<NaiveDate>, Self::Error>;

  /// Distinct regions present, in ascending label order.
  fn list_regions(&self) -> Result<Vec<Region>, Self::Error>;

  /// Distinct snapshot dates for one region, newest first.
  fn list_dates_for_region(&self, region: Region) -> Result<Vec<NaiveDate>, Self::Error>;

  /// Row counts per `(region, date)`, by region then newest date first.
  fn summary(&self) -> Result<Vec<SnapshotSummary>, Self::Error>;

  /// All rows for a date, optionally restricted to one region.
  fn snapshot_at(
    &self,
    date: NaiveDate,
    region: Option<Region>,
  ) -> Result<Vec<StockScoreRecord>, Self::Error>;

  /// All rows for a ticker across dates, oldest first.
  fn history_for(
    &self,
    ticker: &str,
    region: Option<Region>,
  ) -> Result<Vec<StockScoreRecord>, Self::Error>;

  /// Every upload attempt, newest first.
  fn upload_history(&self) -> Result<Vec<UploadRecord>, Self::Error>;
}
