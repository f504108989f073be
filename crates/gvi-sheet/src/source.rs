//! [`SheetSource`]: picks a reader by file extension.

use std::path::{Path, PathBuf};

use gvi_core::ingest::{RawTable, TableSource};

use crate::{CsvSource, Error, Result, WorkbookSource};

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Either reader behind one [`TableSource`].
#[derive(Debug, Clone)]
pub enum SheetSource {
  Csv(CsvSource),
  Workbook(WorkbookSource),
}

impl SheetSource {
  /// Workbook extensions (case-insensitive) get a [`WorkbookSource`];
  /// everything else is read as CSV.
  pub fn open(path: impl Into<PathBuf>, preamble_rows: usize) -> Self {
    let path = path.into();
    if is_workbook(&path) {
      Self::Workbook(WorkbookSource::new(path).with_preamble_rows(preamble_rows))
    } else {
      Self::Csv(CsvSource::new(path).with_preamble_rows(preamble_rows))
    }
  }

  pub fn path(&self) -> &Path {
    match self {
      Self::Csv(s) => s.path(),
      Self::Workbook(s) => s.path(),
    }
  }
}

fn is_workbook(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| w.eq_ignore_ascii_case(ext)))
}

impl TableSource for SheetSource {
  type Error = Error;

  fn name(&self) -> String {
    match self {
      Self::Csv(s) => s.name(),
      Self::Workbook(s) => s.name(),
    }
  }

  fn read(&self) -> Result<RawTable> {
    match self {
      Self::Csv(s) => s.read(),
      Self::Workbook(s) => s.read(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn chooses_reader_by_extension() {
    assert!(matches!(SheetSource::open("gvi_us.xlsx", 3), SheetSource::Workbook(_)));
    assert!(matches!(SheetSource::open("GVI_UK.XLS", 3), SheetSource::Workbook(_)));
    assert!(matches!(SheetSource::open("gvi_us.csv", 3), SheetSource::Csv(_)));
    assert!(matches!(SheetSource::open("gvi_us", 3), SheetSource::Csv(_)));
  }

  #[test]
  fn name_is_the_base_name() {
    assert_eq!(SheetSource::open("/data/gvi_jp.xlsx", 3).name(), "gvi_jp.xlsx");
  }
}
