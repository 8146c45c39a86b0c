//! Upload audit log entries, duplicate policy and the ingestion result.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// At most this many row error messages are returned to the caller.
pub const MAX_ERROR_DETAILS: usize = 10;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Outcome recorded on an upload log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
  /// Every row was inserted.
  Success,
  /// At least one row was skipped as a duplicate or errored.
  Partial,
  /// The batch was rejected under [`DuplicatePolicy::Strict`].
  Failed,
}

impl UploadStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Success => "success",
      Self::Partial => "partial",
      Self::Failed => "failed",
    }
  }
}

impl fmt::Display for UploadStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for UploadStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "success" => Ok(Self::Success),
      "partial" => Ok(Self::Partial),
      "failed" => Ok(Self::Failed),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── Duplicate policy ────────────────────────────────────────────────────────

/// How rows rejected by the name uniqueness constraint affect a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
  /// Any duplicate fails the batch; its rows are rolled back.
  Strict,
  /// Duplicates are skipped, counted, and mark the batch `partial`.
  #[default]
  Lenient,
  /// Duplicates are skipped and neither counted nor reflected in status.
  Silent,
}

impl FromStr for DuplicatePolicy {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "strict" => Ok(Self::Strict),
      "lenient" => Ok(Self::Lenient),
      "silent" => Ok(Self::Silent),
      _ => Err(Error::UnknownPolicy(s.to_owned())),
    }
  }
}

// ─── Log entries ─────────────────────────────────────────────────────────────

/// An upload log entry before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUploadLog {
  pub file_name:    String,
  pub category:     String,
  /// Rows accepted into the canonical table.
  pub record_count: usize,
  pub status:       UploadStatus,
  pub description:  String,
}

/// One persisted audit record per ingestion call. Never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadLogEntry {
  pub id:           i64,
  pub file_name:    String,
  pub category:     String,
  pub record_count: usize,
  pub status:       UploadStatus,
  pub description:  String,
  pub created_at:   DateTime<Utc>,
}

// ─── Ingestion result ────────────────────────────────────────────────────────

/// The structured outcome of one ingestion call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResult {
  pub success:          bool,
  pub records_inserted: usize,
  /// Rows skipped as duplicates.
  pub records_skipped:  usize,
  pub errors:           usize,
  /// The first [`MAX_ERROR_DETAILS`] row error messages.
  pub error_details:    Vec<String>,
  pub message:          String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error:            Option<String>,
}

impl IngestResult {
  /// A fatal failure: nothing inserted, nothing logged.
  pub fn failure(error: impl fmt::Display) -> Self {
    let error = error.to_string();
    Self {
      success: false,
      message: format!("Upload failed: {error}"),
      error: Some(error),
      ..Default::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_round_trips_through_text() {
    for status in
      [UploadStatus::Success, UploadStatus::Partial, UploadStatus::Failed]
    {
      assert_eq!(status.as_str().parse::<UploadStatus>().unwrap(), status);
    }
    assert!("done".parse::<UploadStatus>().is_err());
  }

  #[test]
  fn lenient_is_the_default_policy() {
    assert_eq!(DuplicatePolicy::default(), DuplicatePolicy::Lenient);
    assert_eq!(" Strict ".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Strict);
    assert!("loose".parse::<DuplicatePolicy>().is_err());
  }

  #[test]
  fn failure_result_omits_counts() {
    let result = IngestResult::failure("bad file");
    assert!(!result.success);
    assert_eq!(result.records_inserted, 0);
    assert_eq!(result.error.as_deref(), Some("bad file"));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["error"], "bad file");
    assert_eq!(json["success"], false);
  }

  #[test]
  fn success_result_has_no_error_key() {
    let result = IngestResult { success: true, ..Default::default() };
    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("error").is_none());
  }
}
