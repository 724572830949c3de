//! Error type for `tally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tally_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored discriminant, date, or time failed to decode.
  #[error("column decode error: {0}")]
  Decode(String),

  #[error("series not found: {0}")]
  SeriesNotFound(uuid::Uuid),

  #[error("occurrence not found or not pending: {0}")]
  OccurrenceNotFound(uuid::Uuid),

  #[error("policy not found: {0}")]
  PolicyNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
