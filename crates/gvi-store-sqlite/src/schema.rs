//! SQL schema for the GVI SQLite store.
//!
//! Applied by [`crate::migrate::run`], which also upgrades stores written
//! before regions existed. `PRAGMA user_version` records the applied
//! version.

pub const SCHEMA_VERSION: i64 = 2;

pub const SCORES_TABLE: &str = "stock_scores";
/// Shadow table used while rebuilding `stock_scores` under a new key.
pub const SCORES_SHADOW_TABLE: &str = "stock_scores_new";
pub const UPLOADS_TABLE: &str = "upload_history";

/// Connection-level settings; must run outside a transaction.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
";

/// `stock_scores` DDL under the given table name.
///
/// One row per `(date, ticker, region)`; writes use `INSERT OR REPLACE` so a
/// re-ingested key replaces its row.
pub fn create_scores_table(name: &str) -> String {
  format!(
    "CREATE TABLE {name} (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        date         TEXT NOT NULL,      -- YYYY-MM-DD
        ticker       TEXT NOT NULL,
        company_name TEXT,
        sector       TEXT,
        region       TEXT DEFAULT 'US',
        score        REAL,
        decile       INTEGER,            -- inverted: 10 = best
        UNIQUE (date, ticker, region)
    )"
  )
}

/// Upload log. Append-only; no UPDATE or DELETE is ever issued against it.
pub const CREATE_UPLOADS_TABLE: &str = "
CREATE TABLE upload_history (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    upload_timestamp TEXT NOT NULL,    -- RFC 3339 UTC, fixed width
    filename         TEXT NOT NULL,
    date             TEXT NOT NULL,
    region           TEXT NOT NULL,
    stocks_count     INTEGER,
    status           TEXT              -- 'SUCCESS' | 'FAILED: <message>'
);
";

pub const ADD_REGION_COLUMN: &str =
  "ALTER TABLE stock_scores ADD COLUMN region TEXT DEFAULT 'US'";

/// Copy rows into the shadow table. Rows that collide under the new key are
/// dropped; the earliest-inserted row survives.
pub const COPY_INTO_SHADOW: &str = "
INSERT OR IGNORE INTO stock_scores_new
    (date, ticker, company_name, sector, region, score, decile)
SELECT date, ticker, company_name, sector,
       COALESCE(region, 'US'), score, decile
FROM stock_scores
ORDER BY rowid
";

pub const SWAP_SHADOW: &str = "
DROP TABLE stock_scores;
ALTER TABLE stock_scores_new RENAME TO stock_scores;
";

pub const INDEXES: &str = "
CREATE INDEX IF NOT EXISTS idx_ticker_date  ON stock_scores(ticker, date);
CREATE INDEX IF NOT EXISTS idx_region       ON stock_scores(region);
CREATE INDEX IF NOT EXISTS idx_date_region  ON stock_scores(date, region);
";

/// Columns of the current uniqueness key, sorted.
pub const UNIQUE_KEY: [&str; 3] = ["date", "region", "ticker"];
