//! SQLite persistence for game documents and match records.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub(crate) use models::{GameChangeset, GameRow, NewRecordRow, RecordRow};
pub use repository::{MIGRATIONS, SqliteStore};
