//! Error type for `orbit-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] orbit_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unrecognised column value: {0}")]
  Decode(String),

  /// The database was written by a newer schema than this build understands.
  #[error("database schema version {found} is newer than supported version {supported}")]
  UnsupportedSchema { found: i64, supported: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
