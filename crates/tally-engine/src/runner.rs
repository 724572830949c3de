//! The alert cycle — evaluate policies, consult the dedup ledger, dispatch.
//!
//! One cycle serves one event (`due_soon` or `overdue`). For every active
//! policy of that event it loads the organization's candidates, filters them
//! through eligibility, asks the dedup ledger whether this window was already
//! handled, and only then dispatches. The ledger row is written BEFORE the
//! send goes out: a failed delivery is recorded in the audit log and retried
//! no earlier than the next scheduled window, never immediately.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tracing::{debug, info, warn};

use tally_core::{
  clock::Clock,
  dedup::decide,
  eligibility::{Candidate, is_eligible},
  notification::{NewNotificationRun, RunStatus},
  policy::{NotificationPolicy, PolicyEvent},
  store::LedgerStore,
};

use crate::{
  Error, Result,
  message::build_message,
  sender::{Sender, send_with_timeout},
};

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Report ──────────────────────────────────────────────────────────────────

/// Batch result of one alert cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertReport {
  /// Active policies of this event that were evaluated.
  pub policies:  usize,
  /// (policy, candidate) pairs that passed eligibility.
  pub evaluated: usize,
  /// Send attempts that succeeded.
  pub sent:      usize,
  /// Send attempts that failed; each also lands in the audit log.
  pub failed:    usize,
  pub errors:    Vec<String>,
}

// ─── AlertRunner ─────────────────────────────────────────────────────────────

pub struct AlertRunner<S, C, N> {
  store:        Arc<S>,
  clock:        Arc<C>,
  sender:       Arc<N>,
  send_timeout: Duration,
}

impl<S, C, N> AlertRunner<S, C, N>
where
  S: LedgerStore,
  C: Clock,
  N: Sender,
{
  pub fn new(
    store: Arc<S>,
    clock: Arc<C>,
    sender: Arc<N>,
    send_timeout: Duration,
  ) -> Self {
    Self {
      store,
      clock,
      sender,
      send_timeout,
    }
  }

  /// Run one full alert cycle for `event`.
  ///
  /// Never returns `Err`: per-policy and per-resource failures are collected
  /// into the report so one broken row cannot starve the rest of the cycle.
  pub async fn run(&self, event: PolicyEvent) -> AlertReport {
    let mut report = AlertReport::default();

    let policies = match self.store.list_active_policies(event).await {
      Ok(policies) => policies,
      Err(e) => {
        warn!(?event, error = %e, "alert cycle aborted: cannot list policies");
        report.errors.push(format!("list policies: {e}"));
        return report;
      }
    };

    for policy in policies {
      report.policies += 1;
      if let Err(e) = self.run_policy(&policy, &mut report).await {
        warn!(policy_id = %policy.policy_id, error = %e, "policy skipped");
        report.errors.push(format!("policy {}: {e}", policy.policy_id));
      }
    }

    info!(
      ?event,
      policies = report.policies,
      evaluated = report.evaluated,
      sent = report.sent,
      failed = report.failed,
      errors = report.errors.len(),
      "alert cycle complete"
    );
    report
  }

  async fn run_policy(
    &self,
    policy: &NotificationPolicy,
    report: &mut AlertReport,
  ) -> Result<()> {
    let candidates = self
      .store
      .list_candidates(policy.organization_id, policy.scope)
      .await
      .map_err(Error::store)?;

    let now = self.clock.now();
    for candidate in candidates {
      if !is_eligible(policy, &candidate, now) {
        continue;
      }
      report.evaluated += 1;

      if let Err(e) = self.process(policy, &candidate, report).await {
        warn!(
          policy_id = %policy.policy_id,
          resource_id = %candidate.resource.id,
          error = %e,
          "resource skipped"
        );
        report.errors.push(format!(
          "policy {} resource {}: {e}",
          policy.policy_id, candidate.resource.id
        ));
      }
    }

    Ok(())
  }

  /// Dedup, persist, dispatch — in that order. The state upsert happens
  /// before any send so a crashed or failed delivery cannot double-fire on
  /// the next cycle.
  async fn process(
    &self,
    policy: &NotificationPolicy,
    candidate: &Candidate,
    report: &mut AlertReport,
  ) -> Result<()> {
    let now = self.clock.now();
    let prior = self
      .store
      .get_notification_state(policy.policy_id, candidate.resource)
      .await
      .map_err(Error::store)?;

    let decision = decide(policy, candidate.resource, prior.as_ref(), now);
    if let Some(state) = decision.state_after {
      self
        .store
        .upsert_notification_state(state)
        .await
        .map_err(Error::store)?;
    }
    if !decision.send {
      debug!(
        policy_id = %policy.policy_id,
        resource_id = %candidate.resource.id,
        "suppressed by dedup ledger"
      );
      return Ok(());
    }

    let status = candidate.status_at(policy, now);
    let message = build_message(policy.event, candidate, status);

    for &channel in &policy.channels {
      let outcome = send_with_timeout(
        self.sender.as_ref(),
        channel,
        candidate.owner_id,
        &message,
        self.send_timeout,
      )
      .await;

      let run_status = match outcome {
        Ok(()) => {
          report.sent += 1;
          RunStatus::Sent
        }
        Err(e) => {
          warn!(
            policy_id = %policy.policy_id,
            resource_id = %candidate.resource.id,
            %channel,
            error = %e,
            "delivery failed"
          );
          report.failed += 1;
          RunStatus::Failed {
            error: e.to_string(),
          }
        }
      };

      self
        .store
        .append_run(NewNotificationRun {
          policy_id: policy.policy_id,
          resource:  candidate.resource,
          channel,
          sent_at:   now,
          status:    run_status,
        })
        .await
        .map_err(Error::store)?;
    }

    Ok(())
  }
}
