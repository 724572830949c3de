//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, TimeZone, Utc};
use tally_core::{
  goal::NewGoal,
  notification::{NewNotificationRun, NotificationState, ResourceRef, RunStatus, StateStatus},
  occurrence::{NewOccurrence, StoredStatus},
  policy::{Channel, NewPolicy, PolicyEvent, PolicyScope},
  series::{Flow, NewSeries, Recurrence, RecurrenceKind},
  store::LedgerStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn monthly_series(org: Uuid) -> NewSeries {
  NewSeries {
    organization_id:    org,
    owner_id:           Uuid::new_v4(),
    pay_to_id:          None,
    title:              "rent".into(),
    amount_cents:       120_000,
    flow:               Flow::Expense,
    category_id:        None,
    start_date:         d(2024, 1, 15),
    recurrence:         Recurrence {
      kind:     RecurrenceKind::Monthly,
      interval: 1,
    },
    installments_total: None,
    recurrence_until:   None,
  }
}

fn occurrence(series_id: Uuid, index: u32, due: NaiveDate) -> NewOccurrence {
  NewOccurrence {
    series_id,
    installment_index: index,
    due_date: due,
    amount_cents: 120_000,
  }
}

// ─── Series ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_list_series() {
  let s = store().await;
  let org = Uuid::new_v4();

  let series = s.create_series(monthly_series(org)).await.unwrap();
  assert!(series.active);

  let all = s.list_active_series().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].series_id, series.series_id);
  assert_eq!(all[0].title, "rent");
  assert_eq!(all[0].recurrence.kind, RecurrenceKind::Monthly);
  assert_eq!(all[0].start_date, d(2024, 1, 15));
}

#[tokio::test]
async fn invalid_series_rejected() {
  let s = store().await;
  let mut input = monthly_series(Uuid::new_v4());
  input.recurrence.interval = 0;
  assert!(s.create_series(input).await.is_err());

  let mut input = monthly_series(Uuid::new_v4());
  input.installments_total = Some(3);
  input.recurrence_until = Some(d(2025, 1, 1));
  assert!(s.create_series(input).await.is_err());
}

#[tokio::test]
async fn deactivated_series_excluded_from_active_list() {
  let s = store().await;
  let series = s
    .create_series(monthly_series(Uuid::new_v4()))
    .await
    .unwrap();

  s.set_series_active(series.series_id, false).await.unwrap();
  assert!(s.list_active_series().await.unwrap().is_empty());

  s.set_series_active(series.series_id, true).await.unwrap();
  assert_eq!(s.list_active_series().await.unwrap().len(), 1);
}

#[tokio::test]
async fn set_active_on_unknown_series_errors() {
  let s = store().await;
  let err = s.set_series_active(Uuid::new_v4(), false).await.unwrap_err();
  assert!(matches!(err, crate::Error::SeriesNotFound(_)));
}

// ─── Occurrences ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_occurrence_is_create_once() {
  let s = store().await;
  let series = s
    .create_series(monthly_series(Uuid::new_v4()))
    .await
    .unwrap();

  let first = s
    .insert_occurrence_if_absent(occurrence(series.series_id, 0, d(2024, 1, 15)))
    .await
    .unwrap();
  assert!(first);

  // Same index again: no insert, no error.
  let second = s
    .insert_occurrence_if_absent(occurrence(series.series_id, 0, d(2024, 1, 15)))
    .await
    .unwrap();
  assert!(!second);

  let rows = s.list_occurrences(series.series_id).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].installment_index, 0);
  assert_eq!(rows[0].status, StoredStatus::Pending);
}

#[tokio::test]
async fn occurrences_ordered_by_index() {
  let s = store().await;
  let series = s
    .create_series(monthly_series(Uuid::new_v4()))
    .await
    .unwrap();

  for (idx, due) in [(2, d(2024, 3, 15)), (0, d(2024, 1, 15)), (1, d(2024, 2, 15))] {
    s.insert_occurrence_if_absent(occurrence(series.series_id, idx, due))
      .await
      .unwrap();
  }

  let rows = s.list_occurrences(series.series_id).await.unwrap();
  let indices: Vec<u32> = rows.iter().map(|o| o.installment_index).collect();
  assert_eq!(indices, [0, 1, 2]);
}

#[tokio::test]
async fn mark_paid_records_payment_and_is_not_repeatable() {
  let s = store().await;
  let series = s
    .create_series(monthly_series(Uuid::new_v4()))
    .await
    .unwrap();
  s.insert_occurrence_if_absent(occurrence(series.series_id, 0, d(2024, 1, 15)))
    .await
    .unwrap();
  let occ = &s.list_occurrences(series.series_id).await.unwrap()[0];

  let paid_at = Utc.with_ymd_and_hms(2024, 1, 14, 9, 0, 0).unwrap();
  s.mark_occurrence_paid(occ.occurrence_id, paid_at, 119_500)
    .await
    .unwrap();

  let occ = &s.list_occurrences(series.series_id).await.unwrap()[0];
  assert_eq!(occ.status, StoredStatus::Paid);
  assert_eq!(occ.paid_at, Some(paid_at));
  assert_eq!(occ.value_paid_cents, Some(119_500));

  // Already paid: the guarded update matches no row.
  let err = s
    .mark_occurrence_paid(occ.occurrence_id, paid_at, 119_500)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::OccurrenceNotFound(_)));
}

#[tokio::test]
async fn cancel_only_applies_to_pending() {
  let s = store().await;
  let series = s
    .create_series(monthly_series(Uuid::new_v4()))
    .await
    .unwrap();
  s.insert_occurrence_if_absent(occurrence(series.series_id, 0, d(2024, 1, 15)))
    .await
    .unwrap();
  let occ = &s.list_occurrences(series.series_id).await.unwrap()[0];

  s.cancel_occurrence(occ.occurrence_id).await.unwrap();
  let occ = &s.list_occurrences(series.series_id).await.unwrap()[0];
  assert_eq!(occ.status, StoredStatus::Canceled);

  let err = s.cancel_occurrence(occ.occurrence_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::OccurrenceNotFound(_)));
}

// ─── Goals ───────────────────────────────────────────────────────────────────

fn goal(org: Uuid, title: &str, deadline: NaiveDate) -> NewGoal {
  NewGoal {
    organization_id:     org,
    owner_id:            Uuid::new_v4(),
    title:               title.into(),
    target_amount_cents: 500_000,
    deadline,
  }
}

#[tokio::test]
async fn open_goals_are_tenant_scoped_and_ordered_by_deadline() {
  let s = store().await;
  let org = Uuid::new_v4();

  let later = s.create_goal(goal(org, "new roof", d(2024, 9, 1))).await.unwrap();
  let sooner = s
    .create_goal(goal(org, "vacation fund", d(2024, 6, 1)))
    .await
    .unwrap();
  s.create_goal(goal(Uuid::new_v4(), "foreign", d(2024, 6, 1)))
    .await
    .unwrap();

  let goals = s.list_open_goals(org).await.unwrap();
  assert_eq!(goals.len(), 2);
  assert_eq!(goals[0].goal_id, sooner.goal_id);
  assert_eq!(goals[0].title, "vacation fund");
  assert_eq!(goals[0].deadline, d(2024, 6, 1));
  assert_eq!(goals[0].saved_amount_cents, 0);
  assert!(!goals[0].achieved);
  assert!(goals[0].active);
  assert_eq!(goals[1].goal_id, later.goal_id);
}

// ─── Candidates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn transaction_candidates_are_pending_only_and_tenant_scoped() {
  let s = store().await;
  let org = Uuid::new_v4();
  let other_org = Uuid::new_v4();

  let series = s.create_series(monthly_series(org)).await.unwrap();
  let foreign = s.create_series(monthly_series(other_org)).await.unwrap();

  s.insert_occurrence_if_absent(occurrence(series.series_id, 0, d(2024, 1, 15)))
    .await
    .unwrap();
  s.insert_occurrence_if_absent(occurrence(series.series_id, 1, d(2024, 2, 15)))
    .await
    .unwrap();
  s.insert_occurrence_if_absent(occurrence(foreign.series_id, 0, d(2024, 1, 15)))
    .await
    .unwrap();

  // Pay one off; it must drop out of the candidate set.
  let occ = &s.list_occurrences(series.series_id).await.unwrap()[0];
  s.mark_occurrence_paid(occ.occurrence_id, Utc::now(), 120_000)
    .await
    .unwrap();

  let candidates = s
    .list_candidates(org, PolicyScope::Transaction)
    .await
    .unwrap();
  assert_eq!(candidates.len(), 1);
  assert_eq!(candidates[0].title, "rent");
  assert_eq!(candidates[0].due_date, d(2024, 2, 15));
  assert_eq!(candidates[0].flow, Some(Flow::Expense));
  assert_eq!(candidates[0].owner_id, series.owner_id);
}

#[tokio::test]
async fn goal_candidates_exclude_achieved_and_inactive() {
  let s = store().await;
  let org = Uuid::new_v4();

  let created = s
    .create_goal(goal(org, "vacation fund", d(2024, 6, 1)))
    .await
    .unwrap();

  let candidates = s.list_candidates(org, PolicyScope::Goal).await.unwrap();
  assert_eq!(candidates.len(), 1);
  assert_eq!(candidates[0].resource, ResourceRef::goal(created.goal_id));
  assert_eq!(candidates[0].due_date, d(2024, 6, 1));
  assert_eq!(candidates[0].flow, None);
}

// ─── Policies ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn policy_round_trips_every_field() {
  let s = store().await;
  let category = Uuid::new_v4();

  let mut input = NewPolicy::new(
    Uuid::new_v4(),
    PolicyScope::Transaction,
    PolicyEvent::DueSoon,
    3,
  );
  input.repeat_every_minutes = Some(1440);
  input.max_occurrences = Some(2);
  input.channels = vec![Channel::Push, Channel::Sms];
  input.flow_filter = Some(Flow::Expense);
  input.category_id = Some(category);
  input.amount_min_cents = Some(10_000);
  input.amount_max_cents = Some(500_000);
  input.quiet_hours_start = chrono::NaiveTime::from_hms_opt(22, 0, 0);
  input.quiet_hours_end = chrono::NaiveTime::from_hms_opt(6, 0, 0);
  input.utc_offset = "-04:00".parse().unwrap();
  input.weekdays_mask = 0b0111_1110; // weekdays + Saturday

  let created = s.create_policy(input).await.unwrap();
  let listed = s.list_active_policies(PolicyEvent::DueSoon).await.unwrap();
  assert_eq!(listed.len(), 1);
  let p = &listed[0];

  assert_eq!(p.policy_id, created.policy_id);
  assert_eq!(p.days_before, Some(3));
  assert_eq!(p.days_overdue, None);
  assert_eq!(p.repeat_every_minutes, Some(1440));
  assert_eq!(p.max_occurrences, Some(2));
  assert_eq!(p.channels, vec![Channel::Push, Channel::Sms]);
  assert_eq!(p.flow_filter, Some(Flow::Expense));
  assert_eq!(p.category_id, Some(category));
  assert_eq!(p.quiet_hours_start, chrono::NaiveTime::from_hms_opt(22, 0, 0));
  assert_eq!(p.utc_offset.to_string(), "-04:00");
  assert_eq!(p.weekdays_mask, 0b0111_1110);
}

#[tokio::test]
async fn invalid_policy_rejected_at_creation() {
  let s = store().await;
  let mut input = NewPolicy::new(
    Uuid::new_v4(),
    PolicyScope::Transaction,
    PolicyEvent::DueSoon,
    3,
  );
  input.days_overdue = Some(1);
  assert!(s.create_policy(input).await.is_err());
}

#[tokio::test]
async fn policy_listing_filters_by_event_and_active() {
  let s = store().await;
  let org = Uuid::new_v4();

  let due_soon = s
    .create_policy(NewPolicy::new(
      org,
      PolicyScope::Transaction,
      PolicyEvent::DueSoon,
      3,
    ))
    .await
    .unwrap();
  let overdue = s
    .create_policy(NewPolicy::new(
      org,
      PolicyScope::Transaction,
      PolicyEvent::Overdue,
      1,
    ))
    .await
    .unwrap();

  let listed = s.list_active_policies(PolicyEvent::Overdue).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].policy_id, overdue.policy_id);

  s.set_policy_active(due_soon.policy_id, false).await.unwrap();
  assert!(
    s.list_active_policies(PolicyEvent::DueSoon)
      .await
      .unwrap()
      .is_empty()
  );
}

// ─── Dedup ledger ────────────────────────────────────────────────────────────

#[tokio::test]
async fn notification_state_upsert_converges_on_one_row() {
  let s = store().await;
  let policy = s
    .create_policy(NewPolicy::new(
      Uuid::new_v4(),
      PolicyScope::Transaction,
      PolicyEvent::DueSoon,
      3,
    ))
    .await
    .unwrap();
  let resource = ResourceRef::transaction(Uuid::new_v4());

  assert!(
    s.get_notification_state(policy.policy_id, resource)
      .await
      .unwrap()
      .is_none()
  );

  let first = NotificationState {
    state_id:         Uuid::new_v4(),
    policy_id:        policy.policy_id,
    resource,
    last_notified_at: Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap(),
    occurrences:      1,
    next_eligible_at: None,
    status:           StateStatus::Active,
  };
  s.upsert_notification_state(first.clone()).await.unwrap();

  let stored = s
    .get_notification_state(policy.policy_id, resource)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored, first);

  // A second upsert with a fresh state_id must update, not duplicate.
  let second = NotificationState {
    state_id: Uuid::new_v4(),
    occurrences: 2,
    status: StateStatus::Capped,
    ..first.clone()
  };
  s.upsert_notification_state(second).await.unwrap();

  let stored = s
    .get_notification_state(policy.policy_id, resource)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.occurrences, 2);
  assert_eq!(stored.status, StateStatus::Capped);
  // The original row was updated in place.
  assert_eq!(stored.state_id, first.state_id);
}

// ─── Audit log ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn runs_append_and_list_newest_first() {
  let s = store().await;
  let policy_id = Uuid::new_v4();
  let resource = ResourceRef::transaction(Uuid::new_v4());

  for (hour, status) in [
    (9, RunStatus::Sent),
    (10, RunStatus::Failed { error: "sender timeout".into() }),
    (11, RunStatus::Sent),
  ] {
    s.append_run(NewNotificationRun {
      policy_id,
      resource,
      channel: Channel::Push,
      sent_at: Utc.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap(),
      status,
    })
    .await
    .unwrap();
  }

  let runs = s.list_recent_runs(2).await.unwrap();
  assert_eq!(runs.len(), 2);
  assert_eq!(
    runs[0].sent_at,
    Utc.with_ymd_and_hms(2024, 3, 10, 11, 0, 0).unwrap()
  );
  assert!(matches!(
    runs[1].status,
    RunStatus::Failed { ref error } if error == "sender timeout"
  ));
}
