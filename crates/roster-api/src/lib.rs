//! JSON and multipart HTTP API for the roster service.
//!
//! Exposes an axum [`Router`] backed by any [`RosterStore`]. Authentication,
//! TLS and static file serving are the caller's responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/upload-dataset` | multipart `file`, `category`, `description` |
//! | `POST` | `/api/add-record` | JSON record with `type` |
//! | `POST` | `/api/upload-image` | multipart `image`, `name` |
//! | `GET`  | `/api/records` | newest first |
//! | `GET`  | `/api/upload-logs` | optional `?limit=` |
//! | `GET`  | `/api/stats` | |
//! | `GET`  | `/health` | |

pub mod error;
pub mod files;
pub mod images;
pub mod records;
pub mod uploads;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::State,
  routing::{get, post},
};
use roster_core::store::RosterStore;
use roster_ingest::Ingestor;
use serde_json::{Value, json};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// The filesystem and default values the handlers need.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Directory uploaded dataset files are stored in before ingestion.
  pub upload_dir:       PathBuf,
  /// Directory linked photos are stored in.
  pub images_dir:       PathBuf,
  /// Reported by `/health`.
  pub database_path:    PathBuf,
  /// Category used when an upload does not carry one.
  pub default_category: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct AppState<S: RosterStore> {
  pub store:    Arc<S>,
  pub ingestor: Ingestor<S>,
  pub config:   Arc<ApiConfig>,
}

impl<S: RosterStore> AppState<S> {
  pub fn new(store: Arc<S>, ingestor: Ingestor<S>, config: ApiConfig) -> Self {
    Self { store, ingestor, config: Arc::new(config) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RosterStore + Clone + 'static,
{
  let api = Router::new()
    .route("/upload-dataset", post(uploads::upload_dataset::<S>))
    .route("/upload-logs", get(uploads::list_logs::<S>))
    .route("/add-record", post(records::create::<S>))
    .route("/records", get(records::list::<S>))
    .route("/stats", get(records::stats::<S>))
    .route("/upload-image", post(images::upload_image::<S>));

  Router::new()
    .route("/health", get(health::<S>))
    .nest("/api", api)
    .with_state(state)
}

/// `GET /health`
async fn health<S>(State(state): State<AppState<S>>) -> Json<Value>
where
  S: RosterStore + Clone + 'static,
{
  Json(json!({
    "status":   "OK",
    "database": state.config.database_path.display().to_string(),
  }))
}
