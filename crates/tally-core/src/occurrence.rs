//! Transaction occurrences — one concrete, payable obligation per installment.
//!
//! Occurrences are created only by the materialiser and mutated only by user
//! action (marking paid, cancelling). The pair (series_id, installment_index)
//! is unique: re-materialising a series can never mint a duplicate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Stored status ───────────────────────────────────────────────────────────

/// The status written to the database. "Overdue" is never stored — it is
/// derived from `due_date` and the current day by
/// [`crate::status::effective_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredStatus {
  Pending,
  Paid,
  Canceled,
}

impl StoredStatus {
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Paid => "paid",
      Self::Canceled => "canceled",
    }
  }
}

// ─── TransactionOccurrence ───────────────────────────────────────────────────

/// One installment of a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionOccurrence {
  pub occurrence_id:     Uuid,
  pub series_id:         Uuid,
  /// 0-based position within the series.
  pub installment_index: u32,
  pub due_date:          NaiveDate,
  pub amount_cents:      i64,
  pub status:            StoredStatus,
  pub paid_at:           Option<DateTime<Utc>>,
  /// The amount actually settled, which may differ from `amount_cents`
  /// (partial payment, rounding on the payer's side).
  pub value_paid_cents:  Option<i64>,
}

// ─── NewOccurrence ───────────────────────────────────────────────────────────

/// Input to [`crate::store::LedgerStore::insert_occurrence_if_absent`].
/// Always created in `Pending` status with no payment recorded.
#[derive(Debug, Clone)]
pub struct NewOccurrence {
  pub series_id:         Uuid,
  pub installment_index: u32,
  pub due_date:          NaiveDate,
  pub amount_cents:      i64,
}
