//! Dataset upload and upload log handlers.

use axum::{
  Json,
  extract::{Multipart, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::store::{DEFAULT_LOG_LIMIT, RosterStore};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError, files};

/// The parts of an upload form this service reads.
#[derive(Debug, Default)]
struct UploadForm {
  file:        Option<(String, Vec<u8>)>,
  category:    Option<String>,
  description: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
  let mut form = UploadForm::default();
  while let Some(field) = multipart.next_field().await? {
    match field.name() {
      Some("file") => {
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let data = field.bytes().await?;
        form.file = Some((file_name, data.to_vec()));
      }
      Some("category") => form.category = Some(field.text().await?),
      Some("description") => form.description = Some(field.text().await?),
      _ => {}
    }
  }
  Ok(form)
}

/// `POST /api/upload-dataset`
///
/// Stores the file under the upload directory, then ingests it. Responds
/// `200` with the ingestion result, or `400` with the same shape when the
/// file could not be ingested at all.
pub async fn upload_dataset<S>(
  State(state): State<AppState<S>>,
  multipart: Multipart,
) -> Result<Response, ApiError>
where
  S: RosterStore + Clone + 'static,
{
  let form = read_form(multipart).await?;

  let Some((file_name, data)) = form.file else {
    return Err(ApiError::BadRequest("No file provided".into()));
  };
  if file_name.is_empty() {
    return Err(ApiError::BadRequest("No file selected".into()));
  }
  if !roster_sheet::is_supported(&file_name) {
    return Err(ApiError::BadRequest("Only .xlsx, .xls, .csv allowed".into()));
  }

  let category = form
    .category
    .map(|c| c.trim().to_owned())
    .filter(|c| !c.is_empty())
    .unwrap_or_else(|| state.config.default_category.clone());
  let description = form.description.unwrap_or_default();

  let path = files::save_upload(&state.config.upload_dir, &file_name, &data).await?;
  tracing::info!(path = %path.display(), %category, "stored upload");

  let result = state.ingestor.ingest(&path, &category, &description).await;
  let status = if result.success {
    StatusCode::OK
  } else {
    StatusCode::BAD_REQUEST
  };
  Ok((status, Json(result)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct LogParams {
  pub limit: Option<usize>,
}

/// `GET /api/upload-logs[?limit=<n>]`
pub async fn list_logs<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<LogParams>,
) -> Result<Response, ApiError>
where
  S: RosterStore + Clone + 'static,
{
  let logs = state
    .store
    .list_upload_logs(params.limit.unwrap_or(DEFAULT_LOG_LIMIT))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "success": true, "logs": logs })).into_response())
}
