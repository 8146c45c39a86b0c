//! Saving uploaded blobs to disk.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use chrono::Local;
use tokio::{fs::OpenOptions, io::AsyncWriteExt as _};

/// Reduce a client-supplied file name to a safe basename.
///
/// Path separators and whitespace become `_`; anything outside ASCII
/// alphanumerics, `.`, `-` and `_` is dropped; leading and trailing dots and
/// underscores are stripped. Returns an empty string if nothing survives.
pub fn secure_filename(name: &str) -> String {
  let joined = name
    .split(|c: char| c.is_whitespace() || c == '/' || c == '\\')
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("_");

  joined
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    .collect::<String>()
    .trim_matches(|c| c == '.' || c == '_')
    .to_owned()
}

/// Lower-case extension of `name` including the leading dot, or `""`.
pub fn extension(name: &str) -> String {
  Path::new(name)
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| format!(".{}", e.to_ascii_lowercase()))
    .unwrap_or_default()
}

/// Give up looking for a free name after this many collisions.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Write an uploaded dataset into `dir` as `<YYYYMMDD_HHMMSS>_<name>`.
///
/// An existing file is never overwritten: if the name is taken within the
/// same second, `_<n>` is inserted after the timestamp.
pub async fn save_upload(
  dir: &Path,
  original_name: &str,
  data: &[u8],
) -> std::io::Result<PathBuf> {
  let mut safe = secure_filename(original_name);
  if safe.is_empty() {
    safe = format!("upload{}", extension(original_name));
  }
  let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

  tokio::fs::create_dir_all(dir).await?;
  for attempt in 0..MAX_NAME_ATTEMPTS {
    let name = match attempt {
      0 => format!("{stamp}_{safe}"),
      n => format!("{stamp}_{n}_{safe}"),
    };
    let path = dir.join(name);
    match OpenOptions::new().write(true).create_new(true).open(&path).await {
      Ok(mut file) => {
        file.write_all(data).await?;
        file.flush().await?;
        return Ok(path);
      }
      Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
      Err(e) => return Err(e),
    }
  }

  Err(std::io::Error::new(
    ErrorKind::AlreadyExists,
    format!("no free upload name for {safe:?}"),
  ))
}
