//! Savings goals — the second kind of resource a notification policy may
//! target.
//!
//! A goal's deadline plays the role of a due date: `due_soon` policies warn
//! before the deadline, `overdue` policies fire when the deadline passed with
//! the goal still unmet. Progress tracking itself belongs to the host
//! application; the engine only needs the alert-relevant projection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
  pub goal_id:             Uuid,
  pub organization_id:     Uuid,
  pub owner_id:            Uuid,
  pub title:               String,
  pub target_amount_cents: i64,
  pub saved_amount_cents:  i64,
  pub deadline:            NaiveDate,
  /// An achieved goal is never alert-eligible, regardless of its deadline.
  pub achieved:            bool,
  pub active:              bool,
  pub created_at:          DateTime<Utc>,
}

/// Input to [`crate::store::LedgerStore::create_goal`].
#[derive(Debug, Clone)]
pub struct NewGoal {
  pub organization_id:     Uuid,
  pub owner_id:            Uuid,
  pub title:               String,
  pub target_amount_cents: i64,
  pub deadline:            NaiveDate,
}
