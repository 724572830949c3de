//! Error types for `tally-core`.

use thiserror::Error;

use crate::policy::PolicyConfigError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("recurrence interval must be at least 1, got {0}")]
  InvalidInterval(u32),

  #[error("a series may be bounded by installments_total or recurrence_until, not both")]
  ConflictingSeriesBounds,

  #[error("computed due date is out of the representable calendar range")]
  DateOutOfRange,

  #[error("invalid notification policy: {0}")]
  InvalidPolicy(#[from] PolicyConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
