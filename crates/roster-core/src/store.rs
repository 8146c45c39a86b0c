//! The `RosterStore` trait and the transactional `RecordWriter` it hands out.
//!
//! Backends (e.g. `roster-store-sqlite`) implement both. Higher layers
//! (`roster-ingest`, `roster-api`) depend on this abstraction only.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  record::{CanonicalRecord, StoredRecord},
  upload::{NewUploadLog, UploadLogEntry},
};

/// Default number of upload log entries returned by a listing.
pub const DEFAULT_LOG_LIMIT: usize = 50;

/// What happened to a single insert attempt that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
  /// The record was stored under this row id.
  Inserted(i64),
  /// The uniqueness constraint on the normalised name rejected the record.
  Duplicate,
  /// The store refused this record for another reason. Only the one
  /// statement failed; the unit of work is still usable.
  Rejected(String),
}

/// Aggregate figures over the canonical table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
  pub total_records: u64,
}

// ─── Writer ──────────────────────────────────────────────────────────────────

/// Synchronous write access to the store for the duration of one unit of
/// work. Everything done through one writer commits or rolls back together.
///
/// A rejected `insert_record` affects only that statement; earlier inserts
/// in the same unit of work are kept. An `Err` from any method means the
/// unit of work can no longer commit and must be abandoned.
pub trait RecordWriter {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a record whose fields are already trimmed.
  ///
  /// A uniqueness violation on `name` is reported as
  /// [`InsertOutcome::Duplicate`] and any other statement-level failure as
  /// [`InsertOutcome::Rejected`]. `Err` is reserved for failures that
  /// aborted the surrounding transaction.
  fn insert_record(
    &mut self,
    record: &CanonicalRecord,
  ) -> Result<InsertOutcome, Self::Error>;

  /// Undo every record inserted through this writer so far.
  fn discard_records(&mut self) -> Result<(), Self::Error>;

  /// Append one upload log entry.
  fn append_upload_log(
    &mut self,
    entry: &NewUploadLog,
  ) -> Result<UploadLogEntry, Self::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a roster store backend.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run `work` against a [`RecordWriter`] inside a single transaction.
  ///
  /// The transaction commits when `work` returns `Ok` and rolls back when it
  /// returns `Err`. The underlying connection is held for the whole closure
  /// and released on every exit path.
  fn transact<F, T>(
    &self,
    work: F,
  ) -> impl Future<Output = Result<T, Self::Error>> + Send + '_
  where
    F: FnOnce(&mut dyn RecordWriter<Error = Self::Error>) -> Result<T, Self::Error>
      + Send
      + 'static,
    T: Send + 'static;

  /// Insert a single record outside of any batch.
  fn add_record(
    &self,
    record: CanonicalRecord,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// All stored records, newest first.
  fn list_records(
    &self,
  ) -> impl Future<Output = Result<Vec<StoredRecord>, Self::Error>> + Send + '_;

  /// The most recent upload log entries, newest first.
  fn list_upload_logs(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<UploadLogEntry>, Self::Error>> + Send + '_;

  fn stats(&self) -> impl Future<Output = Result<Stats, Self::Error>> + Send + '_;

  /// Attach an image path to the record whose normalised name matches `name`.
  /// Returns `false` when no record matched.
  fn link_image(
    &self,
    name: String,
    image_path: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
