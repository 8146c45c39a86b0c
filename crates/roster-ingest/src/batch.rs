//! The row loop: insert mapped rows through a [`RecordWriter`], classify each
//! outcome, apply the duplicate policy and append the upload log entry.
//!
//! Runs synchronously inside the store's transaction.

use roster_core::{
  mapper::MappedRow,
  store::{InsertOutcome, RecordWriter},
  upload::{
    DuplicatePolicy, IngestResult, MAX_ERROR_DETAILS, NewUploadLog,
    UploadStatus,
  },
};

/// Everything the row loop needs, moved onto the store's thread.
#[derive(Debug, Clone)]
pub struct Batch {
  pub rows:        Vec<MappedRow>,
  pub policy:      DuplicatePolicy,
  pub file_name:   String,
  pub category:    String,
  pub description: String,
}

/// Raw counts from one pass over the rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
  pub inserted:        usize,
  pub duplicates:      usize,
  pub errors:          Vec<String>,
  /// Line and name of the first duplicate, for strict-mode reporting.
  pub first_duplicate: Option<(usize, String)>,
}

impl Tally {
  fn record_duplicate(&mut self, line: usize, name: &str) {
    self.duplicates += 1;
    if self.first_duplicate.is_none() {
      self.first_duplicate = Some((line, name.to_owned()));
    }
  }
}

/// The committed outcome of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
  pub result: IngestResult,
  pub status: UploadStatus,
  pub log_id: i64,
}

impl Batch {
  /// Process every row, then write exactly one upload log entry.
  ///
  /// Row failures are tallied and never returned as `Err`; an `Err` here
  /// means the writer itself failed, the remaining rows are not attempted and
  /// the whole unit of work must roll back.
  pub fn run<W>(self, writer: &mut W) -> Result<BatchReport, W::Error>
  where
    W: RecordWriter + ?Sized,
  {
    let mut tally = Tally::default();

    for row in &self.rows {
      let Ok(record) = row.record.validated() else {
        tally.errors.push(format!("Row {}: empty name", row.line));
        continue;
      };

      match writer.insert_record(&record)? {
        InsertOutcome::Inserted(_) => tally.inserted += 1,
        InsertOutcome::Duplicate => tally.record_duplicate(row.line, &record.name),
        InsertOutcome::Rejected(reason) => {
          tracing::debug!(line = row.line, %reason, "row rejected by store");
          tally.errors.push(format!("Row {}: {reason}", row.line));
        }
      }
    }

    let rejected =
      self.policy == DuplicatePolicy::Strict && tally.duplicates > 0;
    if rejected {
      writer.discard_records()?;
      tally.inserted = 0;
    }

    let result = summarize(&tally, self.policy);
    let status = status_of(&tally, self.policy);

    let description = if self.description.trim().is_empty() {
      result.message.clone()
    } else {
      self.description.trim().to_owned()
    };

    let entry = writer.append_upload_log(&NewUploadLog {
      file_name: self.file_name,
      category: self.category,
      record_count: tally.inserted,
      status,
      description,
    })?;

    Ok(BatchReport { result, status, log_id: entry.id })
  }
}

/// The status an upload log entry records for `tally` under `policy`.
pub fn status_of(tally: &Tally, policy: DuplicatePolicy) -> UploadStatus {
  let errors = !tally.errors.is_empty();
  match policy {
    DuplicatePolicy::Strict if tally.duplicates > 0 => UploadStatus::Failed,
    DuplicatePolicy::Silent if !errors => UploadStatus::Success,
    _ if errors || tally.duplicates > 0 => UploadStatus::Partial,
    _ => UploadStatus::Success,
  }
}

/// Build the caller-facing result for `tally` under `policy`.
pub fn summarize(tally: &Tally, policy: DuplicatePolicy) -> IngestResult {
  let error_count = tally.errors.len();
  let error_details: Vec<String> =
    tally.errors.iter().take(MAX_ERROR_DETAILS).cloned().collect();

  if policy == DuplicatePolicy::Strict
    && let Some((line, name)) = &tally.first_duplicate
  {
    let error = format!(
      "Row {line}: duplicate name \"{name}\" ({} duplicates in file)",
      tally.duplicates
    );
    return IngestResult {
      success: false,
      records_inserted: 0,
      records_skipped: tally.duplicates,
      errors: error_count,
      error_details,
      message: format!(
        "Upload rejected: {} duplicate names found, no records added",
        tally.duplicates
      ),
      error: Some(error),
    };
  }

  let skipped = match policy {
    DuplicatePolicy::Silent => 0,
    _ => tally.duplicates,
  };

  let mut message = format!("{} added", tally.inserted);
  if policy != DuplicatePolicy::Silent {
    message.push_str(&format!(", {skipped} duplicates skipped"));
  }
  if error_count > 0 {
    message.push_str(&format!(", {error_count} errors"));
  }

  IngestResult {
    success: true,
    records_inserted: tally.inserted,
    records_skipped: skipped,
    errors: error_count,
    error_details,
    message,
    error: None,
  }
}
