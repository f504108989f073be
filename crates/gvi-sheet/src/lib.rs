//! Tabular file codec for GVI exports.
//!
//! Reads GVI exports (Excel/OpenDocument workbooks or delimited text) into a
//! [`gvi_core::ingest::RawTable`] and writes analysis results back out as
//! CSV. Pure synchronous; no database dependencies.

pub mod error;
pub mod export;
mod read;
mod source;
mod workbook;

pub use error::{Error, Result};
pub use read::CsvSource;
pub use source::SheetSource;
pub use workbook::WorkbookSource;
