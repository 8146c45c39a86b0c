//! Photo upload: store an image and link it to a record by name.

use axum::{
  Json,
  extract::{Multipart, State},
};
use chrono::Local;
use roster_core::store::RosterStore;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError, files};

/// Accepted image extensions, lower-case with the leading dot.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// URL prefix under which linked images are referenced.
pub const IMAGE_URL_PREFIX: &str = "/images";

/// `POST /api/upload-image`, multipart `image` and `name`.
///
/// The image is stored as `<name>_<YYYYMMDD><ext>`. If no record matches
/// `name` the stored file is removed again and `404` is returned.
pub async fn upload_image<S>(
  State(state): State<AppState<S>>,
  mut multipart: Multipart,
) -> Result<Json<Value>, ApiError>
where
  S: RosterStore + Clone + 'static,
{
  let mut image: Option<(String, Vec<u8>)> = None;
  let mut name = String::new();

  while let Some(field) = multipart.next_field().await? {
    match field.name() {
      Some("image") => {
        let file_name = field.file_name().unwrap_or_default().to_owned();
        image = Some((file_name, field.bytes().await?.to_vec()));
      }
      Some("name") => name = field.text().await?.trim().to_owned(),
      _ => {}
    }
  }

  let Some((file_name, data)) = image else {
    return Err(ApiError::BadRequest("No image provided".into()));
  };
  if name.is_empty() {
    return Err(ApiError::BadRequest("Name is required".into()));
  }
  if file_name.is_empty() {
    return Err(ApiError::BadRequest("No file selected".into()));
  }

  let ext = files::extension(&file_name);
  if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
    return Err(ApiError::BadRequest("Invalid image format".into()));
  }

  let stored_name = format!(
    "{}_{}{ext}",
    files::secure_filename(&name.replace(' ', "_")),
    Local::now().format("%Y%m%d"),
  );
  tokio::fs::create_dir_all(&state.config.images_dir).await?;
  let path = state.config.images_dir.join(&stored_name);
  tokio::fs::write(&path, &data).await?;

  let image_url = format!("{IMAGE_URL_PREFIX}/{stored_name}");
  let linked = state
    .store
    .link_image(name.clone(), image_url.clone())
    .await
    .map_err(ApiError::store)?;

  if !linked {
    tokio::fs::remove_file(&path).await?;
    return Err(ApiError::NotFound(format!("No record found: \"{name}\"")));
  }

  tracing::info!(%name, %image_url, "photo linked");
  Ok(Json(json!({
    "success":    true,
    "message":    "Photo linked successfully!",
    "image_path": image_url,
  })))
}
