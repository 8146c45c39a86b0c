//! Ingestion engine: one uploaded file in, one [`IngestResult`] out.
//!
//! An ingestion call moves through
//! `Received → Parsed → Mapped → RowLoop → Logged → Done`. Parsing failures
//! short-circuit to a failed result before the store is touched, so no rows
//! and no upload log entry are written for them. Everything after mapping
//! runs inside a single store transaction.
//!
//! ```rust,ignore
//! let ingestor = Ingestor::new(Arc::new(store)).with_policy(DuplicatePolicy::Lenient);
//! let result = ingestor.ingest("uploads/roster.xlsx", "regional", "").await;
//! ```

pub mod batch;
pub mod error;

use std::{path::Path, sync::Arc};

use roster_core::{
  mapper::map_columns,
  store::RosterStore,
  upload::{DuplicatePolicy, IngestResult},
};
use roster_sheet::SourceFormat;

pub use batch::{Batch, BatchReport};
pub use error::{Error, Result};

/// Drives ingestion calls against a shared store.
pub struct Ingestor<S> {
  store:  Arc<S>,
  policy: DuplicatePolicy,
}

impl<S> Clone for Ingestor<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), policy: self.policy }
  }
}

impl<S> Ingestor<S>
where
  S: RosterStore,
{
  pub fn new(store: Arc<S>) -> Self {
    Self { store, policy: DuplicatePolicy::default() }
  }

  pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn policy(&self) -> DuplicatePolicy { self.policy }

  /// Ingest the file at `path`, folding fatal errors into a failed result.
  pub async fn ingest(
    &self,
    path: impl AsRef<Path>,
    category: &str,
    description: &str,
  ) -> IngestResult {
    let path = path.as_ref();
    match self.try_ingest(path, category, description).await {
      Ok(report) => report.result,
      Err(e) => {
        tracing::warn!(path = %path.display(), error = %e, "ingestion failed");
        IngestResult::failure(e)
      }
    }
  }

  /// Ingest the file at `path`.
  ///
  /// Returns `Err` only for fatal failures: an unsupported extension, an
  /// unreadable file, or a store failure that rolled the batch back.
  pub async fn try_ingest(
    &self,
    path: impl AsRef<Path>,
    category: &str,
    description: &str,
  ) -> Result<BatchReport> {
    let path = path.as_ref();

    // Reject before any file or store I/O.
    SourceFormat::from_path(path)?;

    let owned = path.to_path_buf();
    let table = tokio::task::spawn_blocking(move || roster_sheet::load(owned))
      .await??;

    let mapped = map_columns(&table, Some(category));
    tracing::debug!(
      sources = ?mapped.mapping.sources(),
      missing = ?mapped.mapping.missing(),
      unused = ?mapped.mapping.unused_headers(),
      "mapped columns",
    );

    let batch = Batch {
      rows:        mapped.rows,
      policy:      self.policy,
      file_name:   file_name(path),
      category:    category.to_owned(),
      description: description.to_owned(),
    };

    let report = self
      .store
      .transact(move |writer| batch.run(writer))
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    tracing::info!(
      file = %path.display(),
      category,
      log_id = report.log_id,
      status = %report.status,
      inserted = report.result.records_inserted,
      skipped = report.result.records_skipped,
      errors = report.result.errors,
      "ingestion finished",
    );
    Ok(report)
  }
}

/// The base name recorded in the upload log.
fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}
