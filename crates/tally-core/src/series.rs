//! Transaction series — the recurring definition a user creates once.
//!
//! A series is never materialised directly into a ledger; the engine expands
//! it into concrete [`TransactionOccurrence`](crate::occurrence::TransactionOccurrence)
//! rows up to a safety horizon. Deactivating a series stops future
//! materialisation without deleting history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Flow direction ──────────────────────────────────────────────────────────

/// Whether money leaves or enters the household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
  Expense,
  Income,
}

impl Flow {
  /// The discriminant string stored in the `flow` column.
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Expense => "expense",
      Self::Income => "income",
    }
  }
}

// ─── Recurrence ──────────────────────────────────────────────────────────────

/// The calendar unit a series repeats on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
  Weekly,
  Monthly,
  Yearly,
}

impl RecurrenceKind {
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Weekly => "weekly",
      Self::Monthly => "monthly",
      Self::Yearly => "yearly",
    }
  }
}

/// A recurrence pattern: a unit and a positive step count.
/// `interval` of 2 with [`RecurrenceKind::Weekly`] means "every other week".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
  pub kind:     RecurrenceKind,
  pub interval: u32,
}

impl Recurrence {
  pub fn new(kind: RecurrenceKind, interval: u32) -> Result<Self> {
    if interval < 1 {
      return Err(Error::InvalidInterval(interval));
    }
    Ok(Self { kind, interval })
  }
}

// ─── TransactionSeries ───────────────────────────────────────────────────────

/// The recurring definition. Occurrences are derived from it; the series
/// itself carries no per-installment state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSeries {
  pub series_id:          Uuid,
  pub organization_id:    Uuid,
  pub owner_id:           Uuid,
  /// The counterparty, if it is a known user (e.g. the housemate being
  /// reimbursed).
  pub pay_to_id:          Option<Uuid>,
  pub title:              String,
  pub amount_cents:       i64,
  pub flow:               Flow,
  pub category_id:        Option<Uuid>,
  pub start_date:         NaiveDate,
  pub recurrence:         Recurrence,
  /// Upper bound on the number of occurrences (0-based indices
  /// `0..installments_total`). Mutually exclusive with `recurrence_until`.
  pub installments_total: Option<u32>,
  /// No occurrence is ever generated with a due date past this bound.
  pub recurrence_until:   Option<NaiveDate>,
  pub active:             bool,
  pub created_at:         DateTime<Utc>,
}

// ─── NewSeries ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::LedgerStore::create_series`].
#[derive(Debug, Clone)]
pub struct NewSeries {
  pub organization_id:    Uuid,
  pub owner_id:           Uuid,
  pub pay_to_id:          Option<Uuid>,
  pub title:              String,
  pub amount_cents:       i64,
  pub flow:               Flow,
  pub category_id:        Option<Uuid>,
  pub start_date:         NaiveDate,
  pub recurrence:         Recurrence,
  pub installments_total: Option<u32>,
  pub recurrence_until:   Option<NaiveDate>,
}

impl NewSeries {
  /// Reject definitions materialisation could not honour: a zero interval,
  /// or two competing series bounds.
  pub fn validate(&self) -> Result<()> {
    if self.recurrence.interval < 1 {
      return Err(Error::InvalidInterval(self.recurrence.interval));
    }
    if self.installments_total.is_some() && self.recurrence_until.is_some() {
      return Err(Error::ConflictingSeriesBounds);
    }
    Ok(())
  }
}
