// SQLite-based storage engine
// One table, parameterized queries, nothing clever

pub mod database;

pub use database::{Database, StoreError};

// Callers build criteria and records out of raw SQLite values
pub use rusqlite::types::Value;

pub type Result<T> = std::result::Result<T, StoreError>;
