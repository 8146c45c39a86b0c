//! Handlers for manual record entry and record reads.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/add-record` | Body: `{"type":"regional","name":"…",…}` |
//! | `GET`  | `/api/records` | |
//! | `GET`  | `/api/stats` | |

use axum::{Json, extract::State};
use roster_core::{
  Error as CoreError,
  record::{CanonicalRecord, validate_category},
  store::{InsertOutcome, RosterStore},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(rename = "type", default)]
  pub kind:   String,
  #[serde(flatten)]
  pub record: CanonicalRecord,
}

/// `POST /api/add-record`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<Json<Value>, ApiError>
where
  S: RosterStore + Clone + 'static,
{
  validate_category(&body.kind)
    .map_err(|_| ApiError::BadRequest("Invalid category".into()))?;

  let record = body.record.validated().map_err(|e| match e {
    CoreError::EmptyName => ApiError::BadRequest("Name is required".into()),
    other => ApiError::BadRequest(other.to_string()),
  })?;

  match state.store.add_record(record.clone()).await.map_err(ApiError::store)? {
    InsertOutcome::Inserted(id) => {
      tracing::info!(id, name = %record.name, "record added");
      Ok(Json(json!({
        "success": true,
        "message": "Record added successfully!",
        "id":      id,
      })))
    }
    InsertOutcome::Duplicate => Err(ApiError::BadRequest(format!(
      "Duplicate name: \"{}\" already exists",
      record.name
    ))),
    InsertOutcome::Rejected(reason) => Err(ApiError::BadRequest(reason)),
  }
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /api/records`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Value>, ApiError>
where
  S: RosterStore + Clone + 'static,
{
  let records = state.store.list_records().await.map_err(ApiError::store)?;
  Ok(Json(json!({ "success": true, "data": records })))
}

/// `GET /api/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Value>, ApiError>
where
  S: RosterStore + Clone + 'static,
{
  let stats = state.store.stats().await.map_err(ApiError::store)?;
  Ok(Json(json!({ "success": true, "stats": stats })))
}
