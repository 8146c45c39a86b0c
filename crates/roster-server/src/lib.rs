//! Process wiring for the roster service: configuration, store start-up and
//! the layered HTTP application.

pub mod settings;

use std::sync::Arc;

use anyhow::Context as _;
use axum::{Router, extract::DefaultBodyLimit};
use roster_api::{ApiConfig, AppState};
use roster_ingest::Ingestor;
use roster_store_sqlite::SqliteStore;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub use settings::ServerConfig;

/// Open the store, create the upload and image directories and build the
/// shared handler state.
pub async fn open_state(cfg: &ServerConfig) -> anyhow::Result<AppState<SqliteStore>> {
  let store = SqliteStore::open(&cfg.database_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.database_path))?;

  for dir in [&cfg.upload_dir, &cfg.images_dir] {
    tokio::fs::create_dir_all(dir)
      .await
      .with_context(|| format!("failed to create {dir:?}"))?;
  }

  let store = Arc::new(store);
  let ingestor = Ingestor::new(Arc::clone(&store)).with_policy(cfg.duplicate_policy);
  let api = ApiConfig {
    upload_dir:       cfg.upload_dir.clone(),
    images_dir:       cfg.images_dir.clone(),
    database_path:    cfg.database_path.clone(),
    default_category: cfg.default_category.clone(),
  };

  tracing::info!(
    database = %cfg.database_path.display(),
    policy = ?cfg.duplicate_policy,
    "store ready",
  );
  Ok(AppState::new(store, ingestor, api))
}

/// The API router with request tracing and the upload size limit applied.
pub fn app(state: AppState<SqliteStore>, max_upload_bytes: usize) -> Router {
  roster_api::router(state)
    .layer(DefaultBodyLimit::disable())
    .layer(RequestBodyLimitLayer::new(max_upload_bytes))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use tower::ServiceExt as _;

  use super::*;

  fn config(dir: &tempfile::TempDir) -> ServerConfig {
    ServerConfig {
      database_path: dir.path().join("roster.db"),
      upload_dir: dir.path().join("uploads"),
      images_dir: dir.path().join("images"),
      ..ServerConfig::default()
    }
  }

  #[tokio::test]
  async fn open_state_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    open_state(&cfg).await.unwrap();
    assert!(cfg.upload_dir.is_dir());
    assert!(cfg.images_dir.is_dir());
    assert!(cfg.database_path.exists());
  }

  #[tokio::test]
  async fn oversized_bodies_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    let app = app(open_state(&cfg).await.unwrap(), 16);

    let body = br#"{"type":"regional","name":"A rather long name indeed"}"#;
    let request = Request::post("/api/add-record")
      .header(header::CONTENT_TYPE, "application/json")
      .header(header::CONTENT_LENGTH, body.len())
      .body(Body::from(body.to_vec()))
      .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
  }

  #[tokio::test]
  async fn health_is_served_through_the_layers() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    let app = app(open_state(&cfg).await.unwrap(), cfg.max_upload_bytes);

    let request = Request::get("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
  }
}
