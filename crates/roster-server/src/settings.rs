//! Runtime configuration, layered from an optional TOML file and
//! `ROSTER_`-prefixed environment variables.

use std::path::{Path, PathBuf};

use roster_core::{record::DEFAULT_CATEGORY, upload::DuplicatePolicy};
use serde::Deserialize;

/// Environment variable prefix, e.g. `ROSTER_PORT=8080`.
pub const ENV_PREFIX: &str = "ROSTER";

/// Runtime server configuration. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub database_path:    PathBuf,
  pub upload_dir:       PathBuf,
  pub images_dir:       PathBuf,
  pub duplicate_policy: DuplicatePolicy,
  /// Largest accepted request body, in bytes.
  pub max_upload_bytes: usize,
  pub default_category: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".into(),
      port:             5000,
      database_path:    "gpd_database.db".into(),
      upload_dir:       "uploads".into(),
      images_dir:       "images".into(),
      duplicate_policy: DuplicatePolicy::default(),
      max_upload_bytes: 50 * 1024 * 1024,
      default_category: DEFAULT_CATEGORY.into(),
    }
  }
}

impl ServerConfig {
  /// Read `path` if it exists, then apply environment overrides.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  /// The configured paths with a leading `~` expanded.
  pub fn expanded(mut self) -> Self {
    self.database_path = expand_tilde(&self.database_path);
    self.upload_dir = expand_tilde(&self.upload_dir);
    self.images_dir = expand_tilde(&self.images_dir);
    self
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_yields_defaults() {
    let cfg = from_toml("");
    assert_eq!(cfg.port, 5000);
    assert_eq!(cfg.duplicate_policy, DuplicatePolicy::Lenient);
    assert_eq!(cfg.default_category, "regional");
    assert_eq!(cfg.max_upload_bytes, 50 * 1024 * 1024);
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = from_toml(
      r#"
        port = 8080
        database_path = "/var/lib/roster/roster.db"
        duplicate_policy = "strict"
      "#,
    );
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.database_path, PathBuf::from("/var/lib/roster/roster.db"));
    assert_eq!(cfg.duplicate_policy, DuplicatePolicy::Strict);
    assert_eq!(cfg.upload_dir, PathBuf::from("uploads"));
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ServerConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.address(), format!("{}:{}", cfg.host, cfg.port));
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    let plain = Path::new("data/~/roster.db");
    assert_eq!(expand_tilde(plain), plain);
  }
}
