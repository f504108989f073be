//! [`SqliteStore`]: the SQLite implementation of [`ScoreStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

use gvi_core::{
  Region,
  record::{
    DeleteFilter, MigrationReport, NewUpload, SnapshotSummary, StockScoreRecord,
    UploadRecord,
  },
  store::ScoreStore,
};

use crate::{
  Error, Result,
  encode::{
    RawScore, RawUpload, decode_date, decode_region, encode_date, encode_dt,
    encode_region,
  },
  migrate,
  schema::PRAGMAS,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A GVI snapshot store backed by a single SQLite file.
pub struct SqliteStore {
  pub(crate) conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and bring its schema up to date.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path)?;
    Self::init(conn)
  }

  /// Open an in-memory store, for tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    Self::init(conn)
  }

  /// Open a store at `path` without upgrading its schema, so that an
  /// explicit [`ScoreStore::migrate`] can report what it changes.
  pub fn open_without_migration(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path)?;
    conn.execute_batch(PRAGMAS)?;
    Ok(Self { conn })
  }

  /// Wrap an existing connection without touching its schema. Call
  /// [`ScoreStore::migrate`] before use if the schema may be stale.
  pub fn from_connection(conn: Connection) -> Self { Self { conn } }

  fn init(conn: Connection) -> Result<Self> {
    conn.execute_batch(PRAGMAS)?;
    let store = Self { conn };
    let report = store.migrate()?;
    if report.created_scores_table {
      tracing::debug!("initialised empty store");
    } else if !report.is_noop() {
      tracing::info!(?report, "upgraded store schema");
    }
    Ok(store)
  }

  fn query_scores(
    &self,
    sql: &str,
    params: impl rusqlite::Params,
  ) -> Result<Vec<StockScoreRecord>> {
    let mut stmt = self.conn.prepare(sql)?;
    let raws = stmt
      .query_map(params, RawScore::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawScore::into_record).collect()
  }

  fn query_dates(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<NaiveDate>> {
    let mut stmt = self.conn.prepare(sql)?;
    let raws = stmt
      .query_map(params, |row| row.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.iter().map(|s| decode_date(s)).collect()
  }
}

// ─── ScoreStore impl ─────────────────────────────────────────────────────────

impl ScoreStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  fn upsert_snapshot(&self, records: &[StockScoreRecord]) -> Result<u64> {
    let tx = self.conn.unchecked_transaction()?;
    {
      let mut stmt = tx.prepare(
        "INSERT OR REPLACE INTO stock_scores
           (date, ticker, company_name, sector, region, score, decile)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      )?;
      for r in records {
        stmt.execute(rusqlite::params![
          encode_date(r.date),
          r.ticker,
          r.company_name,
          r.sector,
          encode_region(r.region),
          r.score,
          r.decile,
        ])?;
      }
    }
    tx.commit()?;

    tracing::debug!(rows = records.len(), "upserted snapshot rows");
    Ok(records.len() as u64)
  }

  fn record_upload(&self, upload: NewUpload) -> Result<UploadRecord> {
    let uploaded_at = Utc::now();

    self.conn.execute(
      "INSERT INTO upload_history
         (upload_timestamp, filename, date, region, stocks_count, status)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        encode_dt(uploaded_at),
        upload.filename,
        encode_date(upload.date),
        encode_region(upload.region),
        i64::try_from(upload.stocks_count).unwrap_or(i64::MAX),
        upload.status.to_string(),
      ],
    )?;

    Ok(UploadRecord {
      id: self.conn.last_insert_rowid(),
      uploaded_at,
      filename: upload.filename,
      date: upload.date,
      region: upload.region,
      stocks_count: upload.stocks_count,
      status: upload.status,
    })
  }

  fn delete_data(&self, filter: &DeleteFilter) -> Result<u64> {
    filter.ensure_not_empty()?;

    let date_str = filter.date.map(encode_date);
    let region_str = filter.region.map(encode_region);

    let tx = self.conn.unchecked_transaction()?;
    let deleted = tx.execute(
      "DELETE FROM stock_scores
       WHERE (?1 IS NULL OR date = ?1)
         AND (?2 IS NULL OR region = ?2)",
      rusqlite::params![date_str, region_str],
    )?;
    tx.commit()?;

    tracing::info!(deleted, "deleted data for {filter}");
    Ok(deleted as u64)
  }

  fn migrate(&self) -> Result<MigrationReport> {
    migrate::run(&self.conn).map_err(Error::Migration)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  fn list_dates(&self) -> Result<Vec<NaiveDate>> {
    self.query_dates("SELECT DISTINCT date FROM stock_scores ORDER BY date DESC", [])
  }

  fn list_regions(&self) -> Result<Vec<Region>> {
    let mut stmt = self.conn.prepare(
      "SELECT DISTINCT COALESCE(region, 'US') AS r FROM stock_scores ORDER BY r",
    )?;
    let raws = stmt
      .query_map([], |row| row.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.iter().map(|s| decode_region(s)).collect()
  }

  fn list_dates_for_region(&self, region: Region) -> Result<Vec<NaiveDate>> {
    self.query_dates(
      "SELECT DISTINCT date FROM stock_scores WHERE region = ?1 ORDER BY date DESC",
      [encode_region(region)],
    )
  }

  fn summary(&self) -> Result<Vec<SnapshotSummary>> {
    let mut stmt = self.conn.prepare(
      "SELECT COALESCE(region, 'US') AS r, date, COUNT(*)
       FROM stock_scores
       GROUP BY r, date
       ORDER BY r, date DESC",
    )?;
    let raws = stmt
      .query_map([], |row| {
        Ok((
          row.get::<_, String>(0)?,
          row.get::<_, String>(1)?,
          row.get::<_, i64>(2)?,
        ))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    raws
      .into_iter()
      .map(|(region, date, count)| {
        Ok(SnapshotSummary {
          region: decode_region(&region)?,
          date:   decode_date(&date)?,
          count:  u64::try_from(count).unwrap_or(0),
        })
      })
      .collect()
  }

  fn snapshot_at(
    &self,
    date: NaiveDate,
    region: Option<Region>,
  ) -> Result<Vec<StockScoreRecord>> {
    let sql = format!(
      "SELECT {} FROM stock_scores
       WHERE date = ?1 AND (?2 IS NULL OR region = ?2)
       ORDER BY id",
      RawScore::COLUMNS
    );
    self.query_scores(
      &sql,
      rusqlite::params![encode_date(date), region.map(encode_region)],
    )
  }

  fn history_for(
    &self,
    ticker: &str,
    region: Option<Region>,
  ) -> Result<Vec<StockScoreRecord>> {
    let sql = format!(
      "SELECT {} FROM stock_scores
       WHERE ticker = ?1 AND (?2 IS NULL OR region = ?2)
       ORDER BY date, id",
      RawScore::COLUMNS
    );
    self.query_scores(&sql, rusqlite::params![ticker, region.map(encode_region)])
  }

  fn upload_history(&self) -> Result<Vec<UploadRecord>> {
    let sql = format!(
      "SELECT {} FROM upload_history ORDER BY upload_timestamp DESC, id DESC",
      RawUpload::COLUMNS
    );
    let mut stmt = self.conn.prepare(&sql)?;
    let raws = stmt
      .query_map([], RawUpload::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawUpload::into_upload).collect()
  }
}
