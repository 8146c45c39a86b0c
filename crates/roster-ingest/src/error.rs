//! Error type for `roster-ingest`.
//!
//! Every variant is fatal for the ingestion call it occurs in. Row-level
//! problems never surface here; they are tallied into the result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Sheet(#[from] roster_sheet::Error),

  #[error("file loader task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
