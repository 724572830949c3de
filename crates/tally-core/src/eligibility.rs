//! Policy eligibility — the pure, time-sliced alert predicate.
//!
//! [`is_eligible`] answers "could this policy fire for this resource right
//! now". It is deliberately ignorant of history: whether an alert already
//! went out for the current window is the dedup ledger's concern
//! (see [`crate::dedup`]).

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use uuid::Uuid;

use crate::{
  notification::ResourceRef,
  policy::{NotificationPolicy, PolicyEvent},
  series::Flow,
  status::{EffectiveStatus, effective_status},
};

// ─── Candidate ───────────────────────────────────────────────────────────────

/// The alert-relevant projection of a resource, as fetched by the store
/// (a pending occurrence joined with its series, or an open goal).
#[derive(Debug, Clone)]
pub struct Candidate {
  pub resource:     ResourceRef,
  /// Human-readable name used in alert messages (series title, goal title).
  pub title:        String,
  pub owner_id:     Uuid,
  pub due_date:     chrono::NaiveDate,
  pub amount_cents: i64,
  /// `None` for goals, which have no flow direction.
  pub flow:         Option<Flow>,
  pub category_id:  Option<Uuid>,
}

impl Candidate {
  /// The candidate's effective status as of the policy-local day derived
  /// from `now`. Candidates are pending by construction; paid and canceled
  /// resources never reach evaluation.
  pub fn status_at(
    &self,
    policy: &NotificationPolicy,
    now: DateTime<Utc>,
  ) -> EffectiveStatus {
    let today = policy.utc_offset.localize(now).date_naive();
    effective_status(
      crate::occurrence::StoredStatus::Pending,
      self.due_date,
      today,
    )
  }
}

// ─── Predicate ───────────────────────────────────────────────────────────────

/// All gates a policy applies to a candidate, in evaluation order: event and
/// day threshold, flow/category/amount filters, quiet hours, weekday mask.
pub fn is_eligible(
  policy: &NotificationPolicy,
  candidate: &Candidate,
  now: DateTime<Utc>,
) -> bool {
  if !policy.active {
    return false;
  }

  // Event gate against the effective status.
  match (policy.event, candidate.status_at(policy, now)) {
    (PolicyEvent::DueSoon, EffectiveStatus::Pending { days_until_due }) => {
      if days_until_due > policy.days_before.unwrap_or(0) {
        return false;
      }
    }
    (PolicyEvent::Overdue, EffectiveStatus::Overdue { days_overdue }) => {
      if days_overdue < policy.days_overdue.unwrap_or(1) {
        return false;
      }
    }
    _ => return false,
  }

  // Optional filters; any configured filter that does not match excludes.
  if let Some(flow) = policy.flow_filter
    && candidate.flow != Some(flow)
  {
    return false;
  }
  if let Some(category) = policy.category_id
    && candidate.category_id != Some(category)
  {
    return false;
  }
  if let Some(min) = policy.amount_min_cents
    && candidate.amount_cents < min
  {
    return false;
  }
  if let Some(max) = policy.amount_max_cents
    && candidate.amount_cents > max
  {
    return false;
  }

  // Local-time suppression windows.
  let local = policy.utc_offset.localize(now);
  if let (Some(start), Some(end)) =
    (policy.quiet_hours_start, policy.quiet_hours_end)
    && in_quiet_window(local.time(), start, end)
  {
    return false;
  }
  if !policy.allows_weekday(local.date_naive().weekday()) {
    return false;
  }

  true
}

/// Whether `at` falls inside the quiet window. A window whose start is
/// later than its end spans midnight (e.g. 22:00–06:00).
fn in_quiet_window(at: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
  if start <= end {
    at >= start && at < end
  } else {
    at >= start || at < end
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone};

  use super::*;
  use crate::policy::{NewPolicy, PolicyScope, weekday_bit};

  fn policy(event: PolicyEvent, threshold: u32) -> NotificationPolicy {
    let new = NewPolicy::new(
      Uuid::new_v4(),
      PolicyScope::Transaction,
      event,
      threshold,
    );
    NotificationPolicy {
      policy_id:            Uuid::new_v4(),
      organization_id:      new.organization_id,
      scope:                new.scope,
      event:                new.event,
      days_before:          new.days_before,
      days_overdue:         new.days_overdue,
      repeat_every_minutes: new.repeat_every_minutes,
      max_occurrences:      new.max_occurrences,
      channels:             new.channels,
      flow_filter:          new.flow_filter,
      category_id:          new.category_id,
      amount_min_cents:     new.amount_min_cents,
      amount_max_cents:     new.amount_max_cents,
      quiet_hours_start:    new.quiet_hours_start,
      quiet_hours_end:      new.quiet_hours_end,
      utc_offset:           new.utc_offset,
      weekdays_mask:        new.weekdays_mask,
      active:               true,
      created_at:           Utc::now(),
    }
  }

  fn candidate(due: NaiveDate) -> Candidate {
    Candidate {
      resource:     ResourceRef::transaction(Uuid::new_v4()),
      title:        "rent".into(),
      owner_id:     Uuid::new_v4(),
      due_date:     due,
      amount_cents: 120_000,
      flow:         Some(Flow::Expense),
      category_id:  None,
    }
  }

  fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
  }

  #[test]
  fn due_soon_window_is_inclusive() {
    let p = policy(PolicyEvent::DueSoon, 3);
    let now = at(2024, 3, 10, 12, 0);

    // Due today, in 3 days: eligible. In 4 days: not yet.
    let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    assert!(is_eligible(&p, &candidate(due), now));
    let due = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
    assert!(is_eligible(&p, &candidate(due), now));
    let due = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
    assert!(!is_eligible(&p, &candidate(due), now));
  }

  #[test]
  fn due_soon_ignores_overdue_resources() {
    let p = policy(PolicyEvent::DueSoon, 3);
    let now = at(2024, 3, 10, 12, 0);
    let due = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    assert!(!is_eligible(&p, &candidate(due), now));
  }

  #[test]
  fn overdue_threshold_is_a_minimum() {
    let p = policy(PolicyEvent::Overdue, 2);
    let now = at(2024, 3, 10, 12, 0);

    // 1 day late: below the threshold.
    let due = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    assert!(!is_eligible(&p, &candidate(due), now));
    // 2 days late: at the threshold.
    let due = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
    assert!(is_eligible(&p, &candidate(due), now));
    // 30 days late: still eligible (minimum, not exact-match).
    let due = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
    assert!(is_eligible(&p, &candidate(due), now));
  }

  #[test]
  fn inactive_policy_never_fires() {
    let mut p = policy(PolicyEvent::DueSoon, 3);
    p.active = false;
    let now = at(2024, 3, 10, 12, 0);
    let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    assert!(!is_eligible(&p, &candidate(due), now));
  }

  #[test]
  fn flow_filter_excludes_mismatches_and_goals() {
    let mut p = policy(PolicyEvent::DueSoon, 3);
    p.flow_filter = Some(Flow::Income);
    let now = at(2024, 3, 10, 12, 0);
    let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

    let mut c = candidate(due);
    assert!(!is_eligible(&p, &c, now));
    c.flow = Some(Flow::Income);
    assert!(is_eligible(&p, &c, now));
    // A goal has no flow; a configured flow filter excludes it.
    c.flow = None;
    assert!(!is_eligible(&p, &c, now));
  }

  #[test]
  fn amount_bounds_are_inclusive() {
    let mut p = policy(PolicyEvent::DueSoon, 3);
    p.amount_min_cents = Some(100_000);
    p.amount_max_cents = Some(120_000);
    let now = at(2024, 3, 10, 12, 0);
    let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

    let mut c = candidate(due);
    assert!(is_eligible(&p, &c, now)); // exactly at the max
    c.amount_cents = 120_001;
    assert!(!is_eligible(&p, &c, now));
    c.amount_cents = 99_999;
    assert!(!is_eligible(&p, &c, now));
  }

  #[test]
  fn category_filter_applies() {
    let groceries = Uuid::new_v4();
    let mut p = policy(PolicyEvent::DueSoon, 3);
    p.category_id = Some(groceries);
    let now = at(2024, 3, 10, 12, 0);
    let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

    let mut c = candidate(due);
    assert!(!is_eligible(&p, &c, now));
    c.category_id = Some(groceries);
    assert!(is_eligible(&p, &c, now));
  }

  #[test]
  fn wrapping_quiet_hours_suppress() {
    let mut p = policy(PolicyEvent::DueSoon, 3);
    p.quiet_hours_start = NaiveTime::from_hms_opt(22, 0, 0);
    p.quiet_hours_end = NaiveTime::from_hms_opt(6, 0, 0);
    let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

    // 23:00 local: inside the wrapped window.
    assert!(!is_eligible(&p, &candidate(due), at(2024, 3, 10, 23, 0)));
    // 05:59: still inside.
    assert!(!is_eligible(&p, &candidate(due), at(2024, 3, 10, 5, 59)));
    // 06:00: the end bound is exclusive.
    assert!(is_eligible(&p, &candidate(due), at(2024, 3, 10, 6, 0)));
    // Midday: outside.
    assert!(is_eligible(&p, &candidate(due), at(2024, 3, 10, 12, 0)));
  }

  #[test]
  fn quiet_hours_use_policy_local_time() {
    let mut p = policy(PolicyEvent::DueSoon, 3);
    p.utc_offset = "+03:00".parse().unwrap();
    p.quiet_hours_start = NaiveTime::from_hms_opt(22, 0, 0);
    p.quiet_hours_end = NaiveTime::from_hms_opt(6, 0, 0);
    let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

    // 20:00 UTC = 23:00 local: suppressed.
    assert!(!is_eligible(&p, &candidate(due), at(2024, 3, 9, 20, 0)));
    // 10:00 UTC = 13:00 local: allowed.
    assert!(is_eligible(&p, &candidate(due), at(2024, 3, 10, 10, 0)));
  }

  #[test]
  fn weekday_mask_suppresses_unset_days() {
    let mut p = policy(PolicyEvent::DueSoon, 3);
    // Weekdays only: clear Sunday and Saturday.
    p.weekdays_mask &=
      !(weekday_bit(chrono::Weekday::Sun) | weekday_bit(chrono::Weekday::Sat));
    let due = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();

    // 2024-03-10 is a Sunday, 2024-03-11 a Monday.
    assert!(!is_eligible(&p, &candidate(due), at(2024, 3, 10, 12, 0)));
    assert!(is_eligible(&p, &candidate(due), at(2024, 3, 11, 12, 0)));
  }
}
