//! Normalization of raw spreadsheet rows into [`StockScoreRecord`]s.
//!
//! Source files rank quality with decile 1 as the best band. Stored records
//! use the inverted scale (`11 - raw`) so that a higher decile is always
//! better.

use chrono::NaiveDate;

use crate::{Error, Region, Result, record::StockScoreRecord};

// ─── Source layout ───────────────────────────────────────────────────────────

/// Metadata rows preceding the header row in a GVI export.
pub const PREAMBLE_ROWS: usize = 3;

pub const COL_SYMBOL: &str = "Company Symbol";
pub const COL_COMPANY: &str = "Company Name";
pub const COL_SECTOR: &str = "FactSet Econ Sector";
pub const COL_SCORE: &str = "Score";
pub const COL_DECILE: &str = "Score (Decile)";

/// Columns a source table must carry.
pub const REQUIRED_COLUMNS: [&str; 5] =
  [COL_SYMBOL, COL_COMPANY, COL_SECTOR, COL_SCORE, COL_DECILE];

/// Highest raw decile; inversion maps `raw` to `MAX_DECILE + 1 - raw`.
pub const MAX_DECILE: u8 = 10;

// ─── Raw input ───────────────────────────────────────────────────────────────

/// A spreadsheet-agnostic table: one header row followed by data rows, with
/// any preamble already skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
  pub headers:     Vec<String>,
  pub rows:        Vec<Vec<String>>,
  /// 1-based line of the header row in the original file, used to point
  /// error messages at the offending spreadsheet row.
  pub header_line: usize,
}

impl RawTable {
  fn column(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| h.trim() == name)
  }
}

/// Anything that can produce a [`RawTable`], typically a file on disk.
pub trait TableSource {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Name recorded in the upload log (usually the file's base name).
  fn name(&self) -> String;

  fn read(&self) -> Result<RawTable, Self::Error>;
}

// ─── Normalizer ──────────────────────────────────────────────────────────────

/// Turns a [`RawTable`] into records for one `(date, region)` snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
  /// When `false`, a table with no usable rows fails with [`Error::NoData`]
  /// instead of producing an empty snapshot.
  pub allow_empty: bool,
}

impl Default for Normalizer {
  fn default() -> Self { Self { allow_empty: true } }
}

struct Columns {
  symbol:  usize,
  company: usize,
  sector:  usize,
  score:   usize,
  decile:  usize,
}

impl Normalizer {
  pub fn strict() -> Self { Self { allow_empty: false } }

  pub fn normalize(
    &self,
    table: &RawTable,
    date: NaiveDate,
    region: Region,
  ) -> Result<Vec<StockScoreRecord>> {
    let cols = locate_columns(table)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut no_decile = 0usize;
    for (idx, row) in table.rows.iter().enumerate() {
      let line = table.header_line + 1 + idx;
      let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or("");

      let ticker = cell(cols.symbol);
      if ticker.is_empty() {
        continue;
      }

      let Some(raw_decile) = parse_raw_decile(cell(cols.decile)) else {
        tracing::debug!(line, ticker, value = cell(cols.decile), "row has no usable decile");
        no_decile += 1;
        continue;
      };
      records.push(StockScoreRecord {
        date,
        ticker: ticker.to_owned(),
        company_name: non_empty(cell(cols.company)),
        sector: non_empty(cell(cols.sector)),
        region,
        score: parse_score(cell(cols.score)),
        decile: MAX_DECILE + 1 - raw_decile,
      });
    }

    if no_decile > 0 {
      tracing::warn!(skipped = no_decile, %date, %region, "skipped rows without a usable decile");
    }
    if records.is_empty() && !self.allow_empty {
      return Err(Error::NoData);
    }
    tracing::debug!(
      rows = table.rows.len(),
      kept = records.len(),
      %date,
      %region,
      "normalized table"
    );
    Ok(records)
  }
}

fn locate_columns(table: &RawTable) -> Result<Columns> {
  let missing: Vec<&str> = REQUIRED_COLUMNS
    .iter()
    .copied()
    .filter(|name| table.column(name).is_none())
    .collect();
  if !missing.is_empty() {
    return Err(Error::Format(format!(
      "missing required columns: {}",
      missing.join(", ")
    )));
  }

  // Presence was checked above.
  let at = |name: &str| table.column(name).unwrap_or_default();
  Ok(Columns {
    symbol:  at(COL_SYMBOL),
    company: at(COL_COMPANY),
    sector:  at(COL_SECTOR),
    score:   at(COL_SCORE),
    decile:  at(COL_DECILE),
  })
}

fn non_empty(s: &str) -> Option<String> { (!s.is_empty()).then(|| s.to_owned()) }

/// Raw deciles arrive as `3` or, from spreadsheet tools, `3.0`. Anything
/// that is not a whole number in `1..=10` is unusable.
fn parse_raw_decile(s: &str) -> Option<u8> {
  let value: f64 = s.parse().ok()?;
  (value.fract() == 0.0 && (1.0..=f64::from(MAX_DECILE)).contains(&value))
    .then_some(value as u8)
}

/// Blank or non-numeric scores are stored as missing.
fn parse_score(s: &str) -> Option<f64> { s.parse().ok().filter(|v: &f64| v.is_finite()) }
