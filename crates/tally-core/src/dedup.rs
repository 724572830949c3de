//! The dedup decision — at most one alert per eligible window.
//!
//! [`decide`] is pure: it looks at the policy's repeat settings and the prior
//! [`NotificationState`] row (if any) and says whether to send now and what
//! the ledger row should look like afterwards. Persisting the returned row is
//! the caller's job, via an atomic upsert keyed on (policy, resource).

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
  notification::{NotificationState, ResourceRef, StateStatus},
  policy::NotificationPolicy,
};

/// The outcome of consulting the dedup ledger for one eligible resource.
#[derive(Debug, Clone)]
pub struct Decision {
  /// Whether an alert should go out now.
  pub send:        bool,
  /// The ledger row to upsert, if anything changed. `None` means the ledger
  /// already reflects this window and no write is needed.
  pub state_after: Option<NotificationState>,
}

impl Decision {
  fn skip() -> Self {
    Self {
      send:        false,
      state_after: None,
    }
  }
}

/// Decide whether an *already eligible* resource should be alerted on now.
///
/// - No prior state: first eligible window — send, start the ledger at one
///   occurrence.
/// - Prior state, one-shot policy (`repeat_every_minutes` unset): never send
///   again.
/// - Prior state, repeating policy: send only once `next_eligible_at` has
///   arrived and the occurrence cap (if any) is not exhausted. Reaching the
///   cap marks the row `Capped`, which is terminal.
pub fn decide(
  policy: &NotificationPolicy,
  resource: ResourceRef,
  prior: Option<&NotificationState>,
  now: DateTime<Utc>,
) -> Decision {
  let Some(prior) = prior else {
    return Decision {
      send:        true,
      state_after: Some(NotificationState {
        state_id:         Uuid::new_v4(),
        policy_id:        policy.policy_id,
        resource,
        last_notified_at: now,
        occurrences:      1,
        next_eligible_at: next_eligible(policy, now),
        status:           cap_status(policy, 1),
      }),
    };
  };

  if prior.status == StateStatus::Capped {
    return Decision::skip();
  }

  // One-shot: a single alert per resource, ever.
  if policy.repeat_every_minutes.is_none() {
    return Decision::skip();
  }

  if let Some(cap) = policy.max_occurrences
    && prior.occurrences >= cap
  {
    // Older rows may predate the cap being lowered; close them out.
    return Decision {
      send:        false,
      state_after: Some(NotificationState {
        status: StateStatus::Capped,
        ..prior.clone()
      }),
    };
  }

  match prior.next_eligible_at {
    Some(next) if now < next => Decision::skip(),
    _ => {
      let occurrences = prior.occurrences + 1;
      Decision {
        send:        true,
        state_after: Some(NotificationState {
          last_notified_at: now,
          occurrences,
          next_eligible_at: next_eligible(policy, now),
          status: cap_status(policy, occurrences),
          ..prior.clone()
        }),
      }
    }
  }
}

fn next_eligible(
  policy: &NotificationPolicy,
  now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
  policy
    .repeat_every_minutes
    .map(|m| now + Duration::minutes(i64::from(m)))
}

fn cap_status(policy: &NotificationPolicy, occurrences: u32) -> StateStatus {
  match policy.max_occurrences {
    Some(cap) if occurrences >= cap => StateStatus::Capped,
    _ => StateStatus::Active,
  }
}
