//! SQLite backend for the GVI snapshot store.
//!
//! A single [`rusqlite::Connection`] owned by [`SqliteStore`]. Access is
//! synchronous and single-writer; every public operation is its own
//! transaction.

mod encode;
mod migrate;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
