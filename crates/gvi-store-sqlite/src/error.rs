//! Error type for `gvi-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] gvi_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  /// The migration transaction was rolled back; the schema is unchanged.
  #[error("schema migration failed: {0}")]
  Migration(#[source] rusqlite::Error),

  /// A stored value could not be decoded into its domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
