//! The `LedgerStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! Higher layers (`tally-engine`, `tally-api`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  eligibility::Candidate,
  goal::{Goal, NewGoal},
  notification::{
    NewNotificationRun, NotificationRun, NotificationState, ResourceRef,
  },
  occurrence::{NewOccurrence, TransactionOccurrence},
  policy::{NewPolicy, NotificationPolicy, PolicyEvent, PolicyScope},
  series::{NewSeries, TransactionSeries},
};

/// Abstraction over the durable keyed store behind the engine.
///
/// The two write paths that can race across job keys — occurrence creation
/// and the dedup ledger — are expressed as single-statement upserts, never
/// read-then-write. All methods return `Send` futures so the trait can be
/// used from multi-threaded async runtimes.
pub trait LedgerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Series ────────────────────────────────────────────────────────────

  /// Validate and persist a new recurring series.
  fn create_series(
    &self,
    input: NewSeries,
  ) -> impl Future<Output = Result<TransactionSeries, Self::Error>> + Send + '_;

  /// All series with `active = true`, across every organization.
  fn list_active_series(
    &self,
  ) -> impl Future<Output = Result<Vec<TransactionSeries>, Self::Error>> + Send + '_;

  /// Flip a series' `active` flag. Deactivation stops future
  /// materialisation; existing occurrences are untouched.
  fn set_series_active(
    &self,
    series_id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Occurrences ───────────────────────────────────────────────────────

  /// Insert an occurrence unless one already exists for
  /// (series_id, installment_index). Returns `true` if a row was created.
  /// Existing rows are never mutated by this call.
  fn insert_occurrence_if_absent(
    &self,
    input: NewOccurrence,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All occurrences of a series, ordered by installment index.
  fn list_occurrences(
    &self,
    series_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TransactionOccurrence>, Self::Error>> + Send + '_;

  /// Record a payment against a pending occurrence.
  fn mark_occurrence_paid(
    &self,
    occurrence_id: Uuid,
    paid_at: DateTime<Utc>,
    value_paid_cents: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Cancel a pending occurrence.
  fn cancel_occurrence(
    &self,
    occurrence_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Goals ─────────────────────────────────────────────────────────────

  fn create_goal(
    &self,
    input: NewGoal,
  ) -> impl Future<Output = Result<Goal, Self::Error>> + Send + '_;

  /// An organization's active, unachieved goals, ordered by deadline.
  fn list_open_goals(
    &self,
    organization_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Goal>, Self::Error>> + Send + '_;

  // ── Alert reads ───────────────────────────────────────────────────────

  /// The alert-relevant projection of one organization's open resources:
  /// pending occurrences joined with their series for
  /// [`PolicyScope::Transaction`], active unachieved goals for
  /// [`PolicyScope::Goal`].
  fn list_candidates(
    &self,
    organization_id: Uuid,
    scope: PolicyScope,
  ) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send + '_;

  // ── Policies ──────────────────────────────────────────────────────────

  /// Validate and persist a new policy. Invalid configurations are rejected
  /// here and never reach evaluation.
  fn create_policy(
    &self,
    input: NewPolicy,
  ) -> impl Future<Output = Result<NotificationPolicy, Self::Error>> + Send + '_;

  /// All active policies for an event, across every organization.
  fn list_active_policies(
    &self,
    event: PolicyEvent,
  ) -> impl Future<Output = Result<Vec<NotificationPolicy>, Self::Error>> + Send + '_;

  /// Flip a policy's `active` flag.
  fn set_policy_active(
    &self,
    policy_id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Dedup ledger ──────────────────────────────────────────────────────

  fn get_notification_state(
    &self,
    policy_id: Uuid,
    resource: ResourceRef,
  ) -> impl Future<Output = Result<Option<NotificationState>, Self::Error>> + Send + '_;

  /// Atomic upsert keyed on (policy_id, resource kind, resource id).
  fn upsert_notification_state(
    &self,
    state: NotificationState,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Audit log ─────────────────────────────────────────────────────────

  /// Append one send-attempt record. The log is append-only; rows are never
  /// updated or deleted.
  fn append_run(
    &self,
    input: NewNotificationRun,
  ) -> impl Future<Output = Result<NotificationRun, Self::Error>> + Send + '_;

  /// The most recent audit entries, newest first.
  fn list_recent_runs(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<NotificationRun>, Self::Error>> + Send + '_;
}
