//! [`CsvSource`]: reads a GVI export saved as CSV.

use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use gvi_core::ingest::{PREAMBLE_ROWS, RawTable, TableSource};

use crate::{Error, Result, workbook::file_name};

/// A delimited file whose first `preamble_rows` lines are metadata, followed
/// by a header row and data rows.
#[derive(Debug, Clone)]
pub struct CsvSource {
  path:          PathBuf,
  preamble_rows: usize,
  delimiter:     u8,
}

impl CsvSource {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), preamble_rows: PREAMBLE_ROWS, delimiter: b',' }
  }

  pub fn with_preamble_rows(mut self, rows: usize) -> Self {
    self.preamble_rows = rows;
    self
  }

  pub fn with_delimiter(mut self, delimiter: u8) -> Self {
    self.delimiter = delimiter;
    self
  }

  pub fn path(&self) -> &Path { &self.path }
}

impl TableSource for CsvSource {
  type Error = Error;

  fn name(&self) -> String { file_name(&self.path) }

  fn read(&self) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
      .has_headers(false)
      .flexible(true)
      .delimiter(self.delimiter)
      .from_path(&self.path)?;

    let mut table = RawTable::default();
    let mut saw_header = false;

    for result in reader.byte_records() {
      let record = result?;
      // Line numbers survive blank lines, which the reader skips silently.
      let line = record.position().map_or(0, |p| p.line() as usize);
      if line <= self.preamble_rows {
        continue;
      }

      let cells: Vec<String> = record.iter().map(decode_cell).collect();
      if saw_header {
        table.rows.push(cells);
      } else {
        table.headers = cells;
        table.header_line = line;
        saw_header = true;
      }
    }

    if !saw_header {
      return Err(Error::MissingHeader { preamble_rows: self.preamble_rows });
    }

    tracing::debug!(
      path = %self.path.display(),
      rows = table.rows.len(),
      "read csv table"
    );
    Ok(table)
  }
}

/// UTF-8 when valid, otherwise Windows-1252 (Excel's "CSV (Comma
/// delimited)" output on Windows).
fn decode_cell(bytes: &[u8]) -> String {
  match std::str::from_utf8(bytes) {
    Ok(s) => s.to_owned(),
    Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
  }
}
