//! Error type for `roster-sheet`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unsupported file type {0:?}: only .xlsx, .xls, .csv allowed")]
  UnsupportedExtension(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("workbook error: {0}")]
  Workbook(#[from] calamine::Error),

  #[error("workbook has no sheets")]
  NoSheets,

  /// The file has no header row to map columns from.
  #[error("no columns to parse from file")]
  NoHeader,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
