//! Error types for `gvi-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The input table does not have the expected shape.
  #[error("format error: {0}")]
  Format(String),

  #[error("no usable rows in input")]
  NoData,

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("unknown region: {0:?}")]
  UnknownRegion(String),

  #[error("invalid date {0:?}, expected YYYY-MM-DD")]
  InvalidDate(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
