//! [`SqliteStore`] is the SQLite implementation of [`RosterStore`].

use std::path::Path;

use chrono::Utc;
use roster_core::{
  record::{CanonicalRecord, StoredRecord, normalize_key},
  store::{InsertOutcome, RecordWriter, RosterStore, Stats},
  upload::{NewUploadLog, UploadLogEntry},
};

use crate::{
  Error, Result,
  encode::{RawRecord, RawUploadLog, encode_dt, encode_status},
  schema::{SCHEMA, SCHEMA_VERSION},
};

/// Savepoint opened at the start of every unit of work so a batch's records
/// can be discarded without losing the rest of the transaction.
const BATCH_SAVEPOINT: &str = "batch_records";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let found: i64 = self
      .conn
      .call(|conn| {
        let found: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        if found == 0 || found == SCHEMA_VERSION {
          conn.execute_batch(SCHEMA)?;
          conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        Ok(found)
      })
      .await?;

    if found != 0 && found != SCHEMA_VERSION {
      return Err(Error::SchemaVersion { found, expected: SCHEMA_VERSION });
    }
    Ok(())
  }

  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(conn.execute_batch(sql)?))
      .await?;
    Ok(())
  }

  /// The value of `PRAGMA user_version`.
  pub async fn schema_version(&self) -> Result<i64> {
    let version = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;
    Ok(version)
  }
}

// ─── Statements ──────────────────────────────────────────────────────────────

/// `true` if `err` is a violation of a UNIQUE constraint or index. The unique
/// keys on `gpd_records` are the name and its normalised form.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn insert_record(
  conn: &rusqlite::Connection,
  record: &CanonicalRecord,
) -> rusqlite::Result<InsertOutcome> {
  let inserted = conn.execute(
    "INSERT INTO gpd_records (region, designation, name, name_key, kc_id, blw_zone, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      record.region,
      record.designation,
      record.name,
      normalize_key(&record.name),
      record.kc_id,
      record.blw_zone,
      encode_dt(Utc::now()),
    ],
  );

  match inserted {
    Ok(_) => Ok(InsertOutcome::Inserted(conn.last_insert_rowid())),
    Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
    Err(e) => Err(e),
  }
}

fn insert_upload_log(
  conn: &rusqlite::Connection,
  entry: &NewUploadLog,
) -> Result<UploadLogEntry> {
  let created_at = Utc::now();
  let record_count = i64::try_from(entry.record_count)
    .map_err(|_| Error::CountOutOfRange("record_count"))?;

  conn.execute(
    "INSERT INTO upload_logs (file_name, category, record_count, status, description, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      entry.file_name,
      entry.category,
      record_count,
      encode_status(entry.status),
      entry.description,
      encode_dt(created_at),
    ],
  )?;

  Ok(UploadLogEntry {
    id:           conn.last_insert_rowid(),
    file_name:    entry.file_name.clone(),
    category:     entry.category.clone(),
    record_count: entry.record_count,
    status:       entry.status,
    description:  entry.description.clone(),
    created_at,
  })
}

// ─── Writer ──────────────────────────────────────────────────────────────────

/// [`RecordWriter`] over an open transaction.
struct TxWriter<'c> {
  conn: &'c rusqlite::Connection,
}

impl RecordWriter for TxWriter<'_> {
  type Error = Error;

  fn insert_record(&mut self, record: &CanonicalRecord) -> Result<InsertOutcome> {
    match insert_record(self.conn, record) {
      Ok(outcome) => Ok(outcome),
      // SQLITE_FULL, IOERR, NOMEM and RAISE(ROLLBACK) end the transaction
      // themselves; later statements would autocommit.
      Err(e) if self.conn.is_autocommit() => Err(Error::TransactionAborted(e)),
      Err(e) => Ok(InsertOutcome::Rejected(e.to_string())),
    }
  }

  fn discard_records(&mut self) -> Result<()> {
    self
      .conn
      .execute_batch(&format!("ROLLBACK TO {BATCH_SAVEPOINT}"))?;
    Ok(())
  }

  fn append_upload_log(&mut self, entry: &NewUploadLog) -> Result<UploadLogEntry> {
    insert_upload_log(self.conn, entry)
  }
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = Error;

  async fn transact<F, T>(&self, work: F) -> Result<T>
  where
    F: FnOnce(&mut dyn RecordWriter<Error = Error>) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(&format!("SAVEPOINT {BATCH_SAVEPOINT}"))?;

        let result = work(&mut TxWriter { conn: &tx });

        match result {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          // Dropping `tx` rolls the whole unit of work back.
          Err(e) => Ok(Err(e)),
        }
      })
      .await?;

    outcome
  }

  async fn add_record(&self, record: CanonicalRecord) -> Result<InsertOutcome> {
    let outcome = self
      .conn
      .call(move |conn| Ok(insert_record(conn, &record)?))
      .await?;
    Ok(outcome)
  }

  async fn list_records(&self) -> Result<Vec<StoredRecord>> {
    let raws: Vec<RawRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM gpd_records ORDER BY created_at DESC, id DESC",
          RawRecord::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn list_upload_logs(&self, limit: usize) -> Result<Vec<UploadLogEntry>> {
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawUploadLog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM upload_logs ORDER BY created_at DESC, id DESC LIMIT ?1",
          RawUploadLog::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawUploadLog::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUploadLog::into_entry).collect()
  }

  async fn stats(&self) -> Result<Stats> {
    let total: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM gpd_records", [], |r| r.get(0))?)
      })
      .await?;

    Ok(Stats {
      total_records: u64::try_from(total)
        .map_err(|_| Error::CountOutOfRange("total_records"))?,
    })
  }

  async fn link_image(&self, name: String, image_path: String) -> Result<bool> {
    let key = normalize_key(&name);
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE gpd_records SET image_path = ?1 WHERE name_key = ?2",
          rusqlite::params![image_path, key],
        )?)
      })
      .await?;

    tracing::debug!(affected, "linked image");
    Ok(affected > 0)
  }
}
