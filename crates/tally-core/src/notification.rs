//! The dedup ledger and the append-only audit log.
//!
//! [`NotificationState`] holds one row per (policy, resource) pair and is the
//! memory that makes alerting at-most-once-per-window: the evaluator answers
//! "is it time", this ledger answers "have we already handled this window".
//! [`NotificationRun`] records every send attempt, successful or not, and is
//! never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::policy::Channel;

// ─── Resource reference ──────────────────────────────────────────────────────

/// The kind of resource a notification concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
  Transaction,
  Goal,
}

impl ResourceKind {
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Transaction => "transaction",
      Self::Goal => "goal",
    }
  }
}

/// A typed pointer to the resource an alert is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
  pub kind: ResourceKind,
  pub id:   Uuid,
}

impl ResourceRef {
  pub fn transaction(id: Uuid) -> Self {
    Self {
      kind: ResourceKind::Transaction,
      id,
    }
  }

  pub fn goal(id: Uuid) -> Self {
    Self {
      kind: ResourceKind::Goal,
      id,
    }
  }
}

// ─── NotificationState ───────────────────────────────────────────────────────

/// Whether a state row can still produce alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateStatus {
  Active,
  /// The repeat cap was reached; terminal for this (policy, resource) pair
  /// regardless of continued eligibility.
  Capped,
}

impl StateStatus {
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Capped => "capped",
    }
  }
}

/// One row of the dedup ledger, unique on (policy_id, resource kind,
/// resource id). Created lazily on the first eligible evaluation and updated
/// by atomic upsert on every send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
  pub state_id:         Uuid,
  pub policy_id:        Uuid,
  pub resource:         ResourceRef,
  pub last_notified_at: DateTime<Utc>,
  /// Number of alerts sent for this resource under this policy.
  pub occurrences:      u32,
  /// Earliest instant the next repeat may fire; `None` for one-shot
  /// policies.
  pub next_eligible_at: Option<DateTime<Utc>>,
  pub status:           StateStatus,
}

// ─── NotificationRun ─────────────────────────────────────────────────────────

/// Outcome of a single send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunStatus {
  Sent,
  Failed { error: String },
}

/// One append-only audit entry per send attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRun {
  pub run_id:    Uuid,
  pub policy_id: Uuid,
  pub resource:  ResourceRef,
  pub channel:   Channel,
  pub sent_at:   DateTime<Utc>,
  pub status:    RunStatus,
}

/// Input to [`crate::store::LedgerStore::append_run`].
#[derive(Debug, Clone)]
pub struct NewNotificationRun {
  pub policy_id: Uuid,
  pub resource:  ResourceRef,
  pub channel:   Channel,
  pub sent_at:   DateTime<Utc>,
  pub status:    RunStatus,
}
