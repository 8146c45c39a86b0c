//! The raw tabular dataset handed from a file loader to the column mapper.

use serde::{Deserialize, Serialize};

/// A data row together with its position in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
  /// 0-based index among the data rows of the source, counting rows that
  /// were later dropped as blank.
  pub index: usize,
  /// One cell per header; missing cells are empty strings.
  pub cells: Vec<String>,
}

impl Row {
  /// The physical spreadsheet row number: 1-based, after the header row.
  pub fn line(&self) -> usize { self.index + 2 }

  pub fn cell(&self, column: usize) -> &str {
    self.cells.get(column).map(String::as_str).unwrap_or("")
  }
}

/// A header row plus data rows, blank rows already removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
  pub headers: Vec<String>,
  pub rows:    Vec<Row>,
}

impl Table {
  /// Build a table from raw rows as read from a file.
  ///
  /// Rows whose cells are all empty are dropped; short rows are padded with
  /// empty strings up to the header width. A row holding only whitespace is
  /// kept so the row loop can report it. Row indices refer to the raw input,
  /// so a dropped row still advances the numbering.
  pub fn from_raw<I>(headers: Vec<String>, raw_rows: I) -> Self
  where
    I: IntoIterator<Item = Vec<String>>,
  {
    let width = headers.len();
    let rows = raw_rows
      .into_iter()
      .enumerate()
      .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
      .map(|(index, mut cells)| {
        if cells.len() < width {
          cells.resize(width, String::new());
        }
        Row { index, cells }
      })
      .collect();

    Self { headers, rows }
  }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}
