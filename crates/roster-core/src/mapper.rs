//! Column mapper: reduces arbitrary spreadsheet headers to canonical fields.
//!
//! Headers are normalised (trimmed, lower-cased) once per table. For each
//! canonical field the alias list is tried in priority order and the first
//! alias present wins. A field with no matching header is filled with the
//! empty string for every row.
//!
//! The category hint is accepted for interface stability but never selects
//! a different alias table: every category uses [`ALIASES`].

use serde::Serialize;

use crate::{
  record::{CanonicalField, CanonicalRecord, FIELD_COUNT},
  table::{Row, Table},
};

/// Accepted source headers per canonical field, highest priority first.
pub const ALIASES: [(CanonicalField, &[&str]); FIELD_COUNT] = [
  (CanonicalField::Region, &["region", "state", "area", "zone", "region_name"]),
  (CanonicalField::Designation, &["designation", "role", "position", "title"]),
  (CanonicalField::Name, &["name", "full name", "person", "person name"]),
  (CanonicalField::KcId, &["kc id", "kc_id", "kcid", "id", "identifier"]),
  (CanonicalField::BlwZone, &["blw zone", "blw_zone", "blwzone", "zone"]),
];

/// Lower-case and trim a header for alias matching.
pub fn normalize_header(header: &str) -> String { header.trim().to_lowercase() }

// ─── Resolved mapping ────────────────────────────────────────────────────────

/// The column chosen for one canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSource {
  pub field:  CanonicalField,
  /// Position of the source column in the table.
  pub column: usize,
  /// The normalised header that matched.
  pub header: String,
}

/// A header set resolved against [`ALIASES`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
  columns:  [Option<usize>; FIELD_COUNT],
  headers:  Vec<String>,
}

impl ColumnMapping {
  /// Resolve `headers` once; the result is applied to every row.
  pub fn resolve(headers: &[String]) -> Self {
    let normalised: Vec<String> =
      headers.iter().map(|h| normalize_header(h)).collect();

    let mut columns = [None; FIELD_COUNT];
    for (field, aliases) in ALIASES {
      columns[field.index()] = aliases
        .iter()
        .find_map(|alias| normalised.iter().position(|h| h == alias));
    }

    Self { columns, headers: normalised }
  }

  /// Source column for `field`, if any alias matched.
  pub fn column(&self, field: CanonicalField) -> Option<usize> {
    self.columns[field.index()]
  }

  /// Every canonical field that found a source column.
  pub fn sources(&self) -> Vec<FieldSource> {
    CanonicalField::all()
      .filter_map(|field| {
        self.column(field).map(|column| FieldSource {
          field,
          column,
          header: self.headers[column].clone(),
        })
      })
      .collect()
  }

  /// Canonical fields with no matching header.
  pub fn missing(&self) -> Vec<CanonicalField> {
    CanonicalField::all().filter(|f| self.column(*f).is_none()).collect()
  }

  /// Normalised source headers that feed no canonical field.
  pub fn unused_headers(&self) -> Vec<String> {
    self
      .headers
      .iter()
      .enumerate()
      .filter(|(i, _)| !self.columns.contains(&Some(*i)))
      .map(|(_, h)| h.clone())
      .collect()
  }

  /// Project one row onto the canonical fields. Values are not trimmed.
  pub fn apply(&self, row: &Row) -> CanonicalRecord {
    let mut record = CanonicalRecord::default();
    for field in CanonicalField::all() {
      if let Some(column) = self.column(field) {
        record.set(field, row.cell(column).to_owned());
      }
    }
    record
  }
}

// ─── Mapped output ───────────────────────────────────────────────────────────

/// A canonical record paired with the source row it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRow {
  /// Physical spreadsheet row number, see [`Row::line`].
  pub line:   usize,
  pub record: CanonicalRecord,
}

/// The output of [`map_columns`].
#[derive(Debug, Clone, Default)]
pub struct MappedTable {
  pub mapping: ColumnMapping,
  pub rows:    Vec<MappedRow>,
}

/// Map every row of `table` onto the canonical schema, preserving order.
///
/// `_category` does not influence the mapping.
pub fn map_columns(table: &Table, _category: Option<&str>) -> MappedTable {
  let mapping = ColumnMapping::resolve(&table.headers);
  let rows = table
    .rows
    .iter()
    .map(|row| MappedRow { line: row.line(), record: mapping.apply(row) })
    .collect();
  MappedTable { mapping, rows }
}
