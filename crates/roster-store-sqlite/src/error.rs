//! Error type for `roster-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] roster_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("transaction aborted by the database: {0}")]
  TransactionAborted(#[source] rusqlite::Error),

  #[error("unsupported schema version {found} (expected {expected})")]
  SchemaVersion { found: i64, expected: i64 },

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("count out of range in column {0}")]
  CountOutOfRange(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
