//! SQL schema for the roster SQLite store.
//!
//! Executed once at connection startup. The layout is versioned through
//! `PRAGMA user_version`; tables are never created from upload headers.

/// Current schema version written to `PRAGMA user_version`.
///
/// Version 1 enforced uniqueness through `lower(trim(name))`, which only
/// folds ASCII; version 2 stores the Rust-side key in `name_key`.
pub const SCHEMA_VERSION: i64 = 2;

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`. The version pragma
/// is written separately from [`SCHEMA_VERSION`].
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS gpd_records (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    region       TEXT NOT NULL DEFAULT '',
    designation  TEXT NOT NULL DEFAULT '',
    name         TEXT NOT NULL UNIQUE,
    name_key     TEXT NOT NULL UNIQUE,      -- normalize_key(name)
    kc_id        TEXT NOT NULL DEFAULT '',
    blw_zone     TEXT NOT NULL DEFAULT '',
    image_path   TEXT DEFAULT NULL,
    created_at   TIMESTAMP NOT NULL         -- RFC 3339 UTC; store-assigned
);

-- name_key holds the trimmed, Unicode-lower-cased name computed by the
-- store. Duplicate detection relies on its UNIQUE constraint rejecting the
-- insert, never on a prior SELECT.

-- Append-only audit trail; one row per ingestion call. No foreign keys.
CREATE TABLE IF NOT EXISTS upload_logs (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name     TEXT NOT NULL,
    category      TEXT NOT NULL,
    record_count  INTEGER NOT NULL,
    status        TEXT NOT NULL,            -- 'success' | 'partial' | 'failed'
    description   TEXT NOT NULL DEFAULT '',
    created_at    TIMESTAMP NOT NULL
);

CREATE INDEX IF NOT EXISTS gpd_records_created_idx ON gpd_records(created_at);
CREATE INDEX IF NOT EXISTS upload_logs_created_idx ON upload_logs(created_at);

";
