//! Error types for the gvi-sheet codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("workbook error: {0}")]
  Workbook(#[from] calamine::Error),

  #[error("workbook has no worksheets")]
  EmptyWorkbook,

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("no header row after {preamble_rows} preamble rows")]
  MissingHeader { preamble_rows: usize },

  /// The CSV writer could not hand back its buffer.
  #[error("failed to flush csv output: {0}")]
  Flush(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
