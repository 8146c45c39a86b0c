//! Encoding and decoding helpers between roster domain types and the plain
//! text stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; statuses as their lower-case
//! names.

use chrono::{DateTime, SecondsFormat, Utc};
use roster_core::{
  record::{CanonicalRecord, StoredRecord},
  upload::{UploadLogEntry, UploadStatus},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Fixed-width so that lexical order in SQL equals chronological order.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── UploadStatus ────────────────────────────────────────────────────────────

pub fn encode_status(s: UploadStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<UploadStatus> { Ok(s.parse()?) }

// ─── Counts ──────────────────────────────────────────────────────────────────

pub fn decode_count(n: i64, column: &'static str) -> Result<usize> {
  usize::try_from(n).map_err(|_| Error::CountOutOfRange(column))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `gpd_records` row.
pub struct RawRecord {
  pub id:          i64,
  pub region:      String,
  pub designation: String,
  pub name:        String,
  pub kc_id:       String,
  pub blw_zone:    String,
  pub image_path:  Option<String>,
  pub created_at:  String,
}

impl RawRecord {
  pub const COLUMNS: &'static str =
    "id, region, designation, name, kc_id, blw_zone, image_path, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      region:      row.get(1)?,
      designation: row.get(2)?,
      name:        row.get(3)?,
      kc_id:       row.get(4)?,
      blw_zone:    row.get(5)?,
      image_path:  row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<StoredRecord> {
    Ok(StoredRecord {
      id:         self.id,
      record:     CanonicalRecord {
        region:      self.region,
        designation: self.designation,
        name:        self.name,
        kc_id:       self.kc_id,
        blw_zone:    self.blw_zone,
      },
      image_path: self.image_path,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `upload_logs` row.
pub struct RawUploadLog {
  pub id:           i64,
  pub file_name:    String,
  pub category:     String,
  pub record_count: i64,
  pub status:       String,
  pub description:  String,
  pub created_at:   String,
}

impl RawUploadLog {
  pub const COLUMNS: &'static str =
    "id, file_name, category, record_count, status, description, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      file_name:    row.get(1)?,
      category:     row.get(2)?,
      record_count: row.get(3)?,
      status:       row.get(4)?,
      description:  row.get(5)?,
      created_at:   row.get(6)?,
    })
  }

  pub fn into_entry(self) -> Result<UploadLogEntry> {
    Ok(UploadLogEntry {
      id:           self.id,
      file_name:    self.file_name,
      category:     self.category,
      record_count: decode_count(self.record_count, "record_count")?,
      status:       decode_status(&self.status)?,
      description:  self.description,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
