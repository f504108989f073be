//! [`WorkbookSource`]: reads the first worksheet of an Excel or OpenDocument
//! workbook.

use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader as _, open_workbook_auto};
use gvi_core::ingest::{PREAMBLE_ROWS, RawTable, TableSource};

use crate::{Error, Result};

/// A `.xlsx`/`.xlsm`/`.xlsb`/`.xls`/`.ods` export. The first worksheet is
/// read; its first `preamble_rows` rows are metadata, and the next non-empty
/// row is the header.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
  path:          PathBuf,
  preamble_rows: usize,
}

impl WorkbookSource {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), preamble_rows: PREAMBLE_ROWS }
  }

  pub fn with_preamble_rows(mut self, rows: usize) -> Self {
    self.preamble_rows = rows;
    self
  }

  pub fn path(&self) -> &Path { &self.path }
}

impl TableSource for WorkbookSource {
  type Error = Error;

  fn name(&self) -> String { file_name(&self.path) }

  fn read(&self) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(&self.path)?;
    let range = workbook.worksheet_range_at(0).ok_or(Error::EmptyWorkbook)??;

    let table = table_from_range(&range, self.preamble_rows)?;
    tracing::debug!(
      path = %self.path.display(),
      rows = table.rows.len(),
      "read workbook table"
    );
    Ok(table)
  }
}

pub(crate) fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}

/// Row numbers are 1-based sheet rows, so a range that starts below row 1
/// still skips the same preamble.
fn table_from_range(range: &Range<Data>, preamble_rows: usize) -> Result<RawTable> {
  let first_row = range.start().map_or(0, |(row, _)| row as usize);

  let mut table = RawTable::default();
  let mut saw_header = false;
  for (offset, row) in range.rows().enumerate() {
    let line = first_row + offset + 1;
    if line <= preamble_rows {
      continue;
    }

    let cells: Vec<String> = row.iter().map(cell_text).collect();
    if saw_header {
      table.rows.push(cells);
    } else if cells.iter().any(|c| !c.is_empty()) {
      table.headers = cells;
      table.header_line = line;
      saw_header = true;
    }
  }

  if !saw_header {
    return Err(Error::MissingHeader { preamble_rows });
  }
  Ok(table)
}

/// Whole floats print without a fraction, so a decile stored as `3.0`
/// reads back as `3`.
fn cell_text(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.clone(),
    Data::Float(f) => f.to_string(),
    Data::Int(i) => i.to_string(),
    other => other.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  fn text(s: &str) -> Data { Data::String(s.into()) }

  fn export_range() -> Range<Data> {
    let mut range = Range::new((0, 0), (5, 4));
    range.set_value((0, 0), text("GVI Quality Screen"));
    range.set_value((1, 0), text("Universe: Europe"));
    range.set_value((2, 0), text("Generated 2025-03-11"));
    let header = [
      "Company Symbol",
      "Company Name",
      "FactSet Econ Sector",
      "Score",
      "Score (Decile)",
    ];
    for (col, name) in header.iter().enumerate() {
      range.set_value((3, col as u32), text(name));
    }
    range.set_value((4, 0), text("NESN"));
    range.set_value((4, 1), text("Nestlé S.A."));
    range.set_value((4, 2), text("Consumer Non-Durables"));
    range.set_value((4, 3), Data::Float(0.82));
    range.set_value((4, 4), Data::Float(2.0));
    range.set_value((5, 0), text("ROG"));
    range.set_value((5, 4), Data::Int(9));
    range
  }

  #[test]
  fn skips_preamble_and_reads_header() {
    let table = table_from_range(&export_range(), PREAMBLE_ROWS).unwrap();
    assert_eq!(table.headers[4], "Score (Decile)");
    assert_eq!(table.header_line, 4);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0], ["NESN", "Nestlé S.A.", "Consumer Non-Durables", "0.82", "2"]);
    assert_eq!(table.rows[1], ["ROG", "", "", "", "9"]);
  }

  #[test]
  fn normalizes_float_deciles() {
    use chrono::NaiveDate;
    use gvi_core::{Region, ingest::Normalizer};

    let table = table_from_range(&export_range(), PREAMBLE_ROWS).unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
    let records = Normalizer::default().normalize(&table, date, Region::EuropeExUk).unwrap();
    let deciles: Vec<(&str, u8)> =
      records.iter().map(|r| (r.ticker.as_str(), r.decile)).collect();
    assert_eq!(deciles, [("NESN", 9), ("ROG", 2)]);
  }

  #[test]
  fn range_starting_below_first_row_keeps_row_numbers() {
    let mut range = Range::new((3, 1), (4, 2));
    range.set_value((3, 1), text("Company Symbol"));
    range.set_value((3, 2), text("Score (Decile)"));
    range.set_value((4, 1), text("AAPL"));
    range.set_value((4, 2), Data::Int(1));

    let table = table_from_range(&range, PREAMBLE_ROWS).unwrap();
    assert_eq!(table.header_line, 4);
    assert_eq!(table.headers, ["Company Symbol", "Score (Decile)"]);
    assert_eq!(table.rows, [["AAPL", "1"]]);
  }

  #[test]
  fn sheet_shorter_than_preamble_has_no_header() {
    let mut range = Range::new((0, 0), (1, 0));
    range.set_value((0, 0), text("only"));
    let err = table_from_range(&range, PREAMBLE_ROWS).unwrap_err();
    assert!(matches!(err, Error::MissingHeader { preamble_rows: 3 }));
  }

  #[test]
  fn unreadable_workbook_is_an_error() {
    let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    file.write_all(b"not a zip archive").unwrap();
    let err = WorkbookSource::new(file.path()).read().unwrap_err();
    assert!(matches!(err, Error::Workbook(_)));
  }
}
