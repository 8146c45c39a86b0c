//! Canonical records: the fixed shape every ingested row is reduced to.
//!
//! Source spreadsheets arrive with arbitrary headers; after column mapping
//! each row is a [`CanonicalRecord`] with exactly five text fields. `name` is
//! the uniqueness key and is compared case-insensitively after trimming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator as _, IntoStaticStr};

use crate::{Error, Result};

// ─── Fields ──────────────────────────────────────────────────────────────────

/// One of the five target attributes, in storage column order.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr, EnumIter,
  Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CanonicalField {
  Region,
  Designation,
  Name,
  KcId,
  BlwZone,
}

impl CanonicalField {
  /// All fields in canonical order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  /// Position of this field in canonical order.
  pub fn index(self) -> usize {
    match self {
      Self::Region => 0,
      Self::Designation => 1,
      Self::Name => 2,
      Self::KcId => 3,
      Self::BlwZone => 4,
    }
  }
}

/// Number of canonical fields.
pub const FIELD_COUNT: usize = 5;

// ─── Records ─────────────────────────────────────────────────────────────────

/// A row reduced to the canonical schema. Unmatched fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalRecord {
  pub region:      String,
  pub designation: String,
  pub name:        String,
  pub kc_id:       String,
  pub blw_zone:    String,
}

impl CanonicalRecord {
  pub fn get(&self, field: CanonicalField) -> &str {
    match field {
      CanonicalField::Region => &self.region,
      CanonicalField::Designation => &self.designation,
      CanonicalField::Name => &self.name,
      CanonicalField::KcId => &self.kc_id,
      CanonicalField::BlwZone => &self.blw_zone,
    }
  }

  pub fn set(&mut self, field: CanonicalField, value: String) {
    let slot = match field {
      CanonicalField::Region => &mut self.region,
      CanonicalField::Designation => &mut self.designation,
      CanonicalField::Name => &mut self.name,
      CanonicalField::KcId => &mut self.kc_id,
      CanonicalField::BlwZone => &mut self.blw_zone,
    };
    *slot = value;
  }

  /// Copy of the record with every field trimmed of surrounding whitespace.
  pub fn trimmed(&self) -> Self {
    Self {
      region:      self.region.trim().to_owned(),
      designation: self.designation.trim().to_owned(),
      name:        self.name.trim().to_owned(),
      kc_id:       self.kc_id.trim().to_owned(),
      blw_zone:    self.blw_zone.trim().to_owned(),
    }
  }

  /// Trim all fields and reject a record whose name is blank.
  pub fn validated(&self) -> Result<Self> {
    let record = self.trimmed();
    if record.name.is_empty() {
      return Err(Error::EmptyName);
    }
    Ok(record)
  }
}

/// The normalised form of a uniqueness key: trimmed and lower-cased with
/// full Unicode case mapping.
///
/// Backends store this value and enforce uniqueness on it, so every layer
/// folds names the same way.
pub fn normalize_key(name: &str) -> String { name.trim().to_lowercase() }

/// A canonical record as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
  pub id:         i64,
  #[serde(flatten)]
  pub record:     CanonicalRecord,
  pub image_path: Option<String>,
  pub created_at: DateTime<Utc>,
}

// ─── Categories ──────────────────────────────────────────────────────────────

/// Categories accepted for manually entered records.
pub const RECORD_CATEGORIES: &[&str] = &["regional", "group_regional"];

/// Default category label for uploads that do not supply one.
pub const DEFAULT_CATEGORY: &str = "regional";

/// Normalise and check a manual-entry category.
pub fn validate_category(raw: &str) -> Result<String> {
  let category = raw.trim().to_lowercase();
  if RECORD_CATEGORIES.contains(&category.as_str()) {
    Ok(category)
  } else {
    Err(Error::InvalidCategory(raw.to_owned()))
  }
}
