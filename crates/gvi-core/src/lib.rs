//! Core types and trait definitions for the GVI decile tracker.
//!
//! This crate has no database or file-format dependencies.
//! Storage backends implement [`store::ScoreStore`]; file readers implement
//! [`ingest::TableSource`].

pub mod error;
pub mod ingest;
pub mod movers;
pub mod overview;
pub mod record;
pub mod region;
pub mod store;
pub mod upload;

pub use error::{Error, Result};
pub use region::Region;
