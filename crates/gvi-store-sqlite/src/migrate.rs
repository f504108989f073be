//! Schema creation and upgrade.
//!
//! A single routine covers all three cases: an empty database gets the full
//! schema, a legacy one (no `region` column, no upload log, or a uniqueness
//! key without `region`) is upgraded, and a current one is left alone.
//! Region labels are canonicalised in both tables on every run. The whole
//! run is one transaction; on error nothing is applied.

use gvi_core::{Region, record::MigrationReport};
use rusqlite::{Connection, OptionalExtension as _};

use crate::schema::{
  ADD_REGION_COLUMN, COPY_INTO_SHADOW, CREATE_UPLOADS_TABLE, INDEXES, SCHEMA_VERSION,
  SCORES_SHADOW_TABLE, SCORES_TABLE, SWAP_SHADOW, UNIQUE_KEY, UPLOADS_TABLE,
  create_scores_table,
};

pub fn run(conn: &Connection) -> rusqlite::Result<MigrationReport> {
  let tx = conn.unchecked_transaction()?;
  let mut report = MigrationReport::default();

  if !table_exists(&tx, SCORES_TABLE)? {
    tx.execute_batch(&create_scores_table(SCORES_TABLE))?;
    report.created_scores_table = true;
  } else {
    if !column_exists(&tx, SCORES_TABLE, "region")? {
      tracing::info!("adding region column to {SCORES_TABLE}");
      tx.execute_batch(ADD_REGION_COLUMN)?;
      report.added_region_column = true;
    }

    if !has_current_unique_key(&tx)? {
      tracing::info!("rebuilding {SCORES_TABLE} under (date, ticker, region) key");
      report.dropped_duplicates = rebuild_scores_table(&tx)?;
      report.rebuilt_unique_key = true;
    }

    let (relabeled, dropped) = canonicalize_regions(&tx, SCORES_TABLE)?;
    report.relabeled_regions += relabeled;
    report.dropped_duplicates += dropped;
  }

  if !table_exists(&tx, UPLOADS_TABLE)? {
    tx.execute_batch(CREATE_UPLOADS_TABLE)?;
    report.created_upload_history = true;
  } else {
    let (relabeled, _) = canonicalize_regions(&tx, UPLOADS_TABLE)?;
    report.relabeled_regions += relabeled;
  }

  tx.execute_batch(INDEXES)?;
  tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
  tx.commit()?;

  Ok(report)
}

/// Create-copy-swap. Returns the number of rows lost to key collisions.
fn rebuild_scores_table(conn: &Connection) -> rusqlite::Result<u64> {
  let before: i64 =
    conn.query_row(&format!("SELECT COUNT(*) FROM {SCORES_TABLE}"), [], |r| r.get(0))?;

  conn.execute_batch(&format!("DROP TABLE IF EXISTS {SCORES_SHADOW_TABLE}"))?;
  conn.execute_batch(&create_scores_table(SCORES_SHADOW_TABLE))?;
  let copied = conn.execute(COPY_INTO_SHADOW, [])?;
  conn.execute_batch(SWAP_SHADOW)?;

  let dropped = u64::try_from(before).unwrap_or(0).saturating_sub(copied as u64);
  if dropped > 0 {
    tracing::warn!(dropped, "rows collided under the new key and were dropped");
  }
  Ok(dropped)
}

/// Rewrite NULL regions to `US` and alternate spellings (e.g. `APAC (excl
/// Japan)`) to the canonical label. On `stock_scores`, rows that would then
/// share a `(date, ticker, region)` key are reduced to the most recently
/// written one. Unknown labels are left alone.
///
/// Returns `(relabeled, dropped)`.
fn canonicalize_regions(conn: &Connection, table: &str) -> rusqlite::Result<(u64, u64)> {
  let stored = conn
    .prepare(&format!("SELECT DISTINCT region FROM {table}"))?
    .query_map([], |r| r.get::<_, Option<String>>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut relabeled = 0;
  let mut dropped = 0;
  for label in stored {
    let canonical = match label.as_deref() {
      None => Region::Us,
      Some(l) => match l.parse::<Region>() {
        Ok(region) if region.label() != l => region,
        _ => continue,
      },
    };
    let to = canonical.label();

    if table == SCORES_TABLE {
      dropped += conn.execute(
        "DELETE FROM stock_scores
         WHERE (region IS ?1 OR region = ?2)
           AND rowid < (
             SELECT MAX(c.rowid) FROM stock_scores AS c
             WHERE c.date = stock_scores.date
               AND c.ticker = stock_scores.ticker
               AND (c.region IS ?1 OR c.region = ?2)
           )",
        rusqlite::params![label, to],
      )? as u64;
    }
    let updated = conn.execute(
      &format!("UPDATE {table} SET region = ?2 WHERE region IS ?1"),
      rusqlite::params![label, to],
    )?;

    tracing::info!(
      table,
      from = ?label,
      to,
      rows = updated,
      "relabeled region"
    );
    relabeled += updated as u64;
  }
  Ok((relabeled, dropped))
}

fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2",
        [table, column],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// True when some unique index on `stock_scores` covers exactly
/// `(date, ticker, region)`.
fn has_current_unique_key(conn: &Connection) -> rusqlite::Result<bool> {
  let mut stmt =
    conn.prepare("SELECT name FROM pragma_index_list(?1) WHERE \"unique\" = 1")?;
  let indexes = stmt
    .query_map([SCORES_TABLE], |r| r.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut info = conn.prepare("SELECT name FROM pragma_index_info(?1)")?;
  for index in indexes {
    let mut columns = info
      .query_map([&index], |r| r.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    columns.sort();
    if columns == UNIQUE_KEY {
      return Ok(true);
    }
  }
  Ok(false)
}
