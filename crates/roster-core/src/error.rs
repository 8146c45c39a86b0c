//! Error types for `roster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("name is required")]
  EmptyName,

  #[error("invalid category: {0:?}")]
  InvalidCategory(String),

  #[error("unknown upload status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown duplicate policy: {0:?}")]
  UnknownPolicy(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
