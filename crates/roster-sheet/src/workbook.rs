//! Excel reader for `.xlsx` and `.xls` workbooks. Only the first sheet is read.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use roster_core::table::Table;

use crate::{Error, Result};

pub fn read(path: &Path) -> Result<Table> {
  // calamine picks the xls/xlsx/xlsb/ods backend from the extension.
  let mut workbook = open_workbook_auto(path)?;

  let sheet_name = workbook
    .sheet_names()
    .first()
    .cloned()
    .ok_or(Error::NoSheets)?;
  let range = workbook.worksheet_range(&sheet_name)?;

  let mut rows = range.rows();
  let headers: Vec<String> = match rows.next() {
    Some(header_row) => header_row.iter().map(cell_text).collect(),
    None => return Err(Error::NoHeader),
  };

  let raw: Vec<Vec<String>> =
    rows.map(|row| row.iter().map(cell_text).collect()).collect();

  Ok(Table::from_raw(headers, raw))
}

/// Render a cell as the text stored in the canonical table.
///
/// Whole-number floats lose their fractional part so an identifier typed as
/// `1042` does not come back as `1042.0`.
fn cell_text(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.clone(),
    Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
      format!("{}", *f as i64)
    }
    other => other.to_string(),
  }
}
