//! Integration tests for `SqliteStore` against an in-memory database.

use roster_core::{
  record::CanonicalRecord,
  store::{InsertOutcome, RosterStore},
  upload::{NewUploadLog, UploadStatus},
};

use crate::{Error, SqliteStore, schema::SCHEMA_VERSION};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn person(name: &str) -> CanonicalRecord {
  CanonicalRecord {
    region:      "North".into(),
    designation: "Coordinator".into(),
    name:        name.into(),
    kc_id:       "KC-1".into(),
    blw_zone:    "Zone 1".into(),
  }
}

fn log(file_name: &str, record_count: usize) -> NewUploadLog {
  NewUploadLog {
    file_name: file_name.into(),
    category: "regional".into(),
    record_count,
    status: UploadStatus::Success,
    description: String::new(),
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn schema_version_is_recorded() {
  let s = store().await;
  assert_eq!(s.schema_version().await.unwrap(), SCHEMA_VERSION);
}

#[tokio::test]
async fn older_schema_version_is_refused() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("old.db");
  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.pragma_update(None, "user_version", 1).unwrap();
  }

  let err = SqliteStore::open(&path).await.err().unwrap();
  assert!(
    matches!(err, Error::SchemaVersion { found: 1, expected: SCHEMA_VERSION }),
    "{err}"
  );
}

#[tokio::test]
async fn reopening_a_file_keeps_data() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("roster.db");

  let s = SqliteStore::open(&path).await.unwrap();
  s.add_record(person("Jane Doe")).await.unwrap();
  drop(s);

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.stats().await.unwrap().total_records, 1);
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_list_record() {
  let s = store().await;

  let outcome = s.add_record(person("Jane Doe")).await.unwrap();
  assert!(matches!(outcome, InsertOutcome::Inserted(_)));

  let records = s.list_records().await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].record, person("Jane Doe"));
  assert!(records[0].image_path.is_none());
}

#[tokio::test]
async fn duplicate_names_collide_case_insensitively() {
  let s = store().await;

  s.add_record(person("Jane Doe")).await.unwrap();
  for variant in ["Jane Doe", "jane doe", "JANE DOE", " Jane Doe "] {
    let outcome = s.add_record(person(variant)).await.unwrap();
    assert_eq!(outcome, InsertOutcome::Duplicate, "{variant:?}");
  }

  assert_eq!(s.stats().await.unwrap().total_records, 1);
}

#[tokio::test]
async fn accented_names_collide_under_unicode_case_folding() {
  let s = store().await;

  let first = s.add_record(person("Émile Zola")).await.unwrap();
  assert!(matches!(first, InsertOutcome::Inserted(_)));
  for variant in ["ÉMILE ZOLA", "émile zola", " Émile zola "] {
    let outcome = s.add_record(person(variant)).await.unwrap();
    assert_eq!(outcome, InsertOutcome::Duplicate, "{variant:?}");
  }

  let names: Vec<String> = s
    .list_records()
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.record.name)
    .collect();
  assert_eq!(names, ["Émile Zola"]);
}

#[tokio::test]
async fn list_records_newest_first() {
  let s = store().await;
  s.add_record(person("First")).await.unwrap();
  s.add_record(person("Second")).await.unwrap();

  let names: Vec<String> = s
    .list_records()
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.record.name)
    .collect();
  assert_eq!(names, ["Second", "First"]);
}

#[tokio::test]
async fn link_image_matches_normalised_name() {
  let s = store().await;
  s.add_record(person("Jane Doe")).await.unwrap();

  assert!(
    s.link_image("  JANE doe ".into(), "/images/Jane_Doe_20260101.png".into())
      .await
      .unwrap()
  );
  assert!(
    !s.link_image("Nobody".into(), "/images/x.png".into())
      .await
      .unwrap()
  );

  let records = s.list_records().await.unwrap();
  assert_eq!(
    records[0].image_path.as_deref(),
    Some("/images/Jane_Doe_20260101.png")
  );
}

#[tokio::test]
async fn link_image_folds_accented_names() {
  let s = store().await;
  s.add_record(person("Émile Zola")).await.unwrap();

  assert!(
    s.link_image("ÉMILE ZOLA".into(), "/images/emile.png".into())
      .await
      .unwrap()
  );
  let records = s.list_records().await.unwrap();
  assert_eq!(records[0].image_path.as_deref(), Some("/images/emile.png"));
}

// ─── Transactions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn transact_commits_rows_and_log_together() {
  let s = store().await;

  let entry = s
    .transact(|w| {
      assert!(matches!(w.insert_record(&person("A"))?, InsertOutcome::Inserted(_)));
      assert!(matches!(w.insert_record(&person("B"))?, InsertOutcome::Inserted(_)));
      assert_eq!(w.insert_record(&person("a"))?, InsertOutcome::Duplicate);
      w.append_upload_log(&log("batch.csv", 2))
    })
    .await
    .unwrap();

  assert_eq!(entry.record_count, 2);
  assert_eq!(s.stats().await.unwrap().total_records, 2);

  let logs = s.list_upload_logs(50).await.unwrap();
  assert_eq!(logs.len(), 1);
  assert_eq!(logs[0].file_name, "batch.csv");
  assert_eq!(logs[0].status, UploadStatus::Success);
}

#[tokio::test]
async fn failed_statement_keeps_earlier_rows() {
  let s = store().await;
  s.add_record(person("Existing")).await.unwrap();

  s.transact(|w| {
    w.insert_record(&person("New One"))?;
    // Duplicate aborts only its own statement.
    assert_eq!(w.insert_record(&person("existing"))?, InsertOutcome::Duplicate);
    w.insert_record(&person("New Two"))?;
    Ok(())
  })
  .await
  .unwrap();

  assert_eq!(s.stats().await.unwrap().total_records, 3);
}

#[tokio::test]
async fn statement_failure_is_a_rejection_not_an_abort() {
  let s = store().await;
  s.execute_batch(
    "CREATE TRIGGER refuse_robots BEFORE INSERT ON gpd_records
     WHEN NEW.name = 'Robot'
     BEGIN SELECT RAISE(ABORT, 'no robots'); END;",
  )
  .await
  .unwrap();

  s.transact(|w| {
    w.insert_record(&person("Before"))?;
    assert_eq!(
      w.insert_record(&person("Robot"))?,
      InsertOutcome::Rejected("no robots".into())
    );
    w.insert_record(&person("After"))?;
    w.append_upload_log(&log("robots.csv", 2))
  })
  .await
  .unwrap();

  assert_eq!(s.stats().await.unwrap().total_records, 2);
  assert_eq!(s.list_upload_logs(50).await.unwrap().len(), 1);
}

#[tokio::test]
async fn database_rollback_mid_batch_is_fatal() {
  let s = store().await;
  s.execute_batch(
    "CREATE TRIGGER abort_batch BEFORE INSERT ON gpd_records
     WHEN NEW.name = 'Poison'
     BEGIN SELECT RAISE(ROLLBACK, 'forced rollback'); END;",
  )
  .await
  .unwrap();

  let result = s
    .transact(|w| {
      w.insert_record(&person("Before"))?;
      w.insert_record(&person("Poison"))?;
      w.insert_record(&person("After"))?;
      w.append_upload_log(&log("poison.csv", 2))
    })
    .await;

  assert!(matches!(result, Err(Error::TransactionAborted(_))), "{result:?}");
  assert_eq!(s.stats().await.unwrap().total_records, 0);
  assert!(s.list_upload_logs(50).await.unwrap().is_empty());
}

#[tokio::test]
async fn transact_error_rolls_everything_back() {
  let s = store().await;

  let result: Result<(), Error> = s
    .transact(|w| {
      w.insert_record(&person("Ghost"))?;
      w.append_upload_log(&log("ghost.csv", 1))?;
      Err(Error::DateParse("forced".into()))
    })
    .await;

  assert!(result.is_err());
  assert_eq!(s.stats().await.unwrap().total_records, 0);
  assert!(s.list_upload_logs(50).await.unwrap().is_empty());
}

#[tokio::test]
async fn discard_records_keeps_the_log() {
  let s = store().await;

  s.transact(|w| {
    w.insert_record(&person("A"))?;
    w.insert_record(&person("B"))?;
    w.discard_records()?;
    let mut entry = log("strict.csv", 0);
    entry.status = UploadStatus::Failed;
    w.append_upload_log(&entry)
  })
  .await
  .unwrap();

  assert_eq!(s.stats().await.unwrap().total_records, 0);
  let logs = s.list_upload_logs(50).await.unwrap();
  assert_eq!(logs.len(), 1);
  assert_eq!(logs[0].status, UploadStatus::Failed);
}

#[tokio::test]
async fn upload_logs_respect_limit_and_order() {
  let s = store().await;
  for i in 0..5 {
    s.transact(move |w| w.append_upload_log(&log(&format!("f{i}.csv"), i)))
      .await
      .unwrap();
  }

  let logs = s.list_upload_logs(3).await.unwrap();
  let names: Vec<&str> = logs.iter().map(|l| l.file_name.as_str()).collect();
  assert_eq!(names, ["f4.csv", "f3.csv", "f2.csv"]);
}

#[tokio::test]
async fn concurrent_inserts_of_one_name_store_one_row() {
  let s = store().await;

  let handles: Vec<_> = (0..8)
    .map(|i| {
      let s = s.clone();
      let name = if i % 2 == 0 { "Race Winner" } else { "race winner " };
      tokio::spawn(async move { s.add_record(person(name)).await.unwrap() })
    })
    .collect();

  let mut inserted = 0;
  for h in handles {
    if matches!(h.await.unwrap(), InsertOutcome::Inserted(_)) {
      inserted += 1;
    }
  }

  assert_eq!(inserted, 1);
  assert_eq!(s.stats().await.unwrap().total_records, 1);
}
