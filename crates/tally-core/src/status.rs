//! The effective-status state machine — computed, never stored.
//!
//! This is the single source of truth for "is this obligation late". Both UI
//! projections and notification-policy evaluation must go through
//! [`effective_status`]; nothing else in the system is allowed to compare
//! due dates against the clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::occurrence::StoredStatus;

/// The status of an obligation as of a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EffectiveStatus {
  /// Terminal: a paid obligation is never downgraded, even if the recorded
  /// payment predates the due date.
  Paid,
  /// Terminal.
  Canceled,
  /// Pending and past due. `days_overdue` is always ≥ 1 — an obligation due
  /// today is `Pending { days_until_due: 0 }`, not overdue.
  Overdue { days_overdue: u32 },
  /// Pending with the due date today or in the future.
  Pending { days_until_due: u32 },
}

impl EffectiveStatus {
  pub fn is_overdue(&self) -> bool { matches!(self, Self::Overdue { .. }) }

  pub fn is_open(&self) -> bool {
    matches!(self, Self::Pending { .. } | Self::Overdue { .. })
  }
}

/// Compute the effective status of an obligation from its stored fields and
/// the current day.
pub fn effective_status(
  stored: StoredStatus,
  due_date: NaiveDate,
  today: NaiveDate,
) -> EffectiveStatus {
  match stored {
    StoredStatus::Paid => EffectiveStatus::Paid,
    StoredStatus::Canceled => EffectiveStatus::Canceled,
    StoredStatus::Pending => {
      let days = (today - due_date).num_days();
      if days > 0 {
        EffectiveStatus::Overdue {
          days_overdue: days as u32,
        }
      } else {
        EffectiveStatus::Pending {
          days_until_due: (-days) as u32,
        }
      }
    }
  }
}
