//! Error type for `tally-engine`.

use thiserror::Error;

use crate::sender::SendError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tally_core::Error),

  /// The persistent store failed. Fatal for the current run; the next
  /// scheduled invocation retries from scratch (upserts make that safe).
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A delivery failed. Transient: recorded in the audit log, never fatal
  /// for the batch.
  #[error("send error: {0}")]
  Send(#[from] SendError),
}

impl Error {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
