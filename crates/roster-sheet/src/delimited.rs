//! CSV reader.

use std::path::Path;

use roster_core::table::Table;

use crate::{Error, Result};

pub fn read(path: &Path) -> Result<Table> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_path(path)?;

  let headers: Vec<String> =
    reader.headers()?.iter().map(str::to_owned).collect();
  if headers.is_empty() {
    return Err(Error::NoHeader);
  }

  let rows = reader
    .records()
    .map(|record| record.map(|r| r.iter().map(str::to_owned).collect()))
    .collect::<csv::Result<Vec<Vec<String>>>>()?;

  Ok(Table::from_raw(headers, rows))
}
