//! Tabular file loader for roster uploads.
//!
//! Reads CSV and Excel (`.xlsx`, `.xls`) files into a [`roster_core::table::Table`]:
//! the first row is the header, rows that are empty across every column are
//! dropped, and missing cells become empty strings. Pure synchronous; callers
//! on an async runtime should run [`load`] on the blocking pool.
//!
//! # Quick start
//!
//! ```no_run
//! let table = roster_sheet::load("uploads/roster.xlsx").unwrap();
//! println!("{} headers, {} rows", table.headers.len(), table.len());
//! ```

pub mod error;
mod delimited;
mod workbook;

use std::path::Path;

pub use error::{Error, Result};
use roster_core::table::Table;

// ─── Formats ─────────────────────────────────────────────────────────────────

/// The file formats an upload may arrive in, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
  Csv,
  Xlsx,
  Xls,
}

/// Accepted extensions, lower-case and without the dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

impl SourceFormat {
  /// Classify a file name or path by its extension, ignoring case.
  ///
  /// Never touches the filesystem.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let ext = path
      .extension()
      .and_then(|e| e.to_str())
      .map(str::to_ascii_lowercase)
      .unwrap_or_default();

    match ext.as_str() {
      "csv" => Ok(Self::Csv),
      "xlsx" => Ok(Self::Xlsx),
      "xls" => Ok(Self::Xls),
      _ => Err(Error::UnsupportedExtension(path.display().to_string())),
    }
  }
}

/// `true` if `file_name` carries one of [`ALLOWED_EXTENSIONS`].
pub fn is_supported(file_name: &str) -> bool {
  SourceFormat::from_path(file_name).is_ok()
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Read `path` into a [`Table`], dispatching on its extension.
///
/// An unsupported extension is rejected before the file is opened.
pub fn load(path: impl AsRef<Path>) -> Result<Table> {
  let path = path.as_ref();
  let format = SourceFormat::from_path(path)?;

  let table = match format {
    SourceFormat::Csv => delimited::read(path)?,
    SourceFormat::Xlsx | SourceFormat::Xls => workbook::read(path)?,
  };

  tracing::debug!(
    path = %path.display(),
    ?format,
    columns = table.headers.len(),
    rows = table.len(),
    "loaded table",
  );
  Ok(table)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extension_check_ignores_case() {
    assert_eq!(SourceFormat::from_path("a/b/Roster.CSV").unwrap(), SourceFormat::Csv);
    assert_eq!(SourceFormat::from_path("roster.XlsX").unwrap(), SourceFormat::Xlsx);
    assert_eq!(SourceFormat::from_path("old.xls").unwrap(), SourceFormat::Xls);
  }

  #[test]
  fn unsupported_extensions_are_rejected() {
    for name in ["notes.txt", "scan.pdf", "noextension", "archive.csv.zip"] {
      assert!(
        matches!(SourceFormat::from_path(name), Err(Error::UnsupportedExtension(_))),
        "{name} should be rejected"
      );
      assert!(!is_supported(name));
    }
  }

  #[test]
  fn load_rejects_before_opening() {
    // The file does not exist; an io error here would mean we tried to open it.
    let err = load("/definitely/not/here.pdf").unwrap_err();
    assert!(matches!(err, Error::UnsupportedExtension(_)));
  }
}
