//! [`SqliteStore`] — the SQLite implementation of [`LedgerStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tally_core::{
  eligibility::Candidate,
  goal::{Goal, NewGoal},
  notification::{
    NewNotificationRun, NotificationRun, NotificationState, ResourceKind,
    ResourceRef, RunStatus,
  },
  occurrence::{NewOccurrence, TransactionOccurrence},
  policy::{NewPolicy, NotificationPolicy, PolicyEvent, PolicyScope},
  series::{NewSeries, TransactionSeries},
  store::LedgerStore,
};

use crate::{
  Error, Result,
  encode::{
    RawCandidate, RawGoal, RawOccurrence, RawPolicy, RawRun, RawSeries,
    RawState, encode_channels, encode_date, encode_dt, encode_time,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A tally ledger store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteStore {
  type Error = Error;

  // ── Series ────────────────────────────────────────────────────────────────

  async fn create_series(&self, input: NewSeries) -> Result<TransactionSeries> {
    input.validate().map_err(Error::Core)?;

    let series = TransactionSeries {
      series_id:          Uuid::new_v4(),
      organization_id:    input.organization_id,
      owner_id:           input.owner_id,
      pay_to_id:          input.pay_to_id,
      title:              input.title,
      amount_cents:       input.amount_cents,
      flow:               input.flow,
      category_id:        input.category_id,
      start_date:         input.start_date,
      recurrence:         input.recurrence,
      installments_total: input.installments_total,
      recurrence_until:   input.recurrence_until,
      active:             true,
      created_at:         Utc::now(),
    };

    let id_str       = encode_uuid(series.series_id);
    let org_str      = encode_uuid(series.organization_id);
    let owner_str    = encode_uuid(series.owner_id);
    let pay_to_str   = series.pay_to_id.map(encode_uuid);
    let title        = series.title.clone();
    let amount       = series.amount_cents;
    let flow_str     = series.flow.discriminant().to_owned();
    let category_str = series.category_id.map(encode_uuid);
    let start_str    = encode_date(series.start_date);
    let kind_str     = series.recurrence.kind.discriminant().to_owned();
    let interval     = series.recurrence.interval;
    let total        = series.installments_total;
    let until_str    = series.recurrence_until.map(encode_date);
    let created_str  = encode_dt(series.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO transaction_series (
             series_id, organization_id, owner_id, pay_to_id, title,
             amount_cents, flow, category_id, start_date,
             recurrence_kind, recurrence_interval,
             installments_total, recurrence_until, active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 1, ?14)",
          rusqlite::params![
            id_str, org_str, owner_str, pay_to_str, title,
            amount, flow_str, category_str, start_str,
            kind_str, interval, total, until_str, created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(series)
  }

  async fn list_active_series(&self) -> Result<Vec<TransactionSeries>> {
    let raws: Vec<RawSeries> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT series_id, organization_id, owner_id, pay_to_id, title,
                  amount_cents, flow, category_id, start_date,
                  recurrence_kind, recurrence_interval,
                  installments_total, recurrence_until, active, created_at
           FROM transaction_series
           WHERE active = 1",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSeries {
              series_id:           row.get(0)?,
              organization_id:     row.get(1)?,
              owner_id:            row.get(2)?,
              pay_to_id:           row.get(3)?,
              title:               row.get(4)?,
              amount_cents:        row.get(5)?,
              flow:                row.get(6)?,
              category_id:         row.get(7)?,
              start_date:          row.get(8)?,
              recurrence_kind:     row.get(9)?,
              recurrence_interval: row.get(10)?,
              installments_total:  row.get(11)?,
              recurrence_until:    row.get(12)?,
              active:              row.get(13)?,
              created_at:          row.get(14)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSeries::into_series).collect()
  }

  async fn set_series_active(&self, series_id: Uuid, active: bool) -> Result<()> {
    let id_str = encode_uuid(series_id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE transaction_series SET active = ?2 WHERE series_id = ?1",
          rusqlite::params![id_str, active],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::SeriesNotFound(series_id));
    }
    Ok(())
  }

  // ── Occurrences ───────────────────────────────────────────────────────────

  async fn insert_occurrence_if_absent(
    &self,
    input: NewOccurrence,
  ) -> Result<bool> {
    let id_str     = encode_uuid(Uuid::new_v4());
    let series_str = encode_uuid(input.series_id);
    let index      = input.installment_index;
    let due_str    = encode_date(input.due_date);
    let amount     = input.amount_cents;

    let inserted = self
      .conn
      .call(move |conn| {
        // The UNIQUE(series_id, installment_index) constraint makes this a
        // row-atomic "create exactly once" regardless of concurrent callers.
        let changed = conn.execute(
          "INSERT INTO transaction_occurrences (
             occurrence_id, series_id, installment_index,
             due_date, amount_cents, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, 'pending')
           ON CONFLICT (series_id, installment_index) DO NOTHING",
          rusqlite::params![id_str, series_str, index, due_str, amount],
        )?;
        Ok(changed > 0)
      })
      .await?;

    Ok(inserted)
  }

  async fn list_occurrences(
    &self,
    series_id: Uuid,
  ) -> Result<Vec<TransactionOccurrence>> {
    let series_str = encode_uuid(series_id);

    let raws: Vec<RawOccurrence> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT occurrence_id, series_id, installment_index, due_date,
                  amount_cents, status, paid_at, value_paid_cents
           FROM transaction_occurrences
           WHERE series_id = ?1
           ORDER BY installment_index",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![series_str], |row| {
            Ok(RawOccurrence {
              occurrence_id:     row.get(0)?,
              series_id:         row.get(1)?,
              installment_index: row.get(2)?,
              due_date:          row.get(3)?,
              amount_cents:      row.get(4)?,
              status:            row.get(5)?,
              paid_at:           row.get(6)?,
              value_paid_cents:  row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOccurrence::into_occurrence).collect()
  }

  async fn mark_occurrence_paid(
    &self,
    occurrence_id: Uuid,
    paid_at: DateTime<Utc>,
    value_paid_cents: i64,
  ) -> Result<()> {
    let id_str   = encode_uuid(occurrence_id);
    let paid_str = encode_dt(paid_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE transaction_occurrences
           SET status = 'paid', paid_at = ?2, value_paid_cents = ?3
           WHERE occurrence_id = ?1 AND status = 'pending'",
          rusqlite::params![id_str, paid_str, value_paid_cents],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::OccurrenceNotFound(occurrence_id));
    }
    Ok(())
  }

  async fn cancel_occurrence(&self, occurrence_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(occurrence_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE transaction_occurrences
           SET status = 'canceled'
           WHERE occurrence_id = ?1 AND status = 'pending'",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::OccurrenceNotFound(occurrence_id));
    }
    Ok(())
  }

  // ── Goals ─────────────────────────────────────────────────────────────────

  async fn create_goal(&self, input: NewGoal) -> Result<Goal> {
    let goal = Goal {
      goal_id:             Uuid::new_v4(),
      organization_id:     input.organization_id,
      owner_id:            input.owner_id,
      title:               input.title,
      target_amount_cents: input.target_amount_cents,
      saved_amount_cents:  0,
      deadline:            input.deadline,
      achieved:            false,
      active:              true,
      created_at:          Utc::now(),
    };

    let id_str       = encode_uuid(goal.goal_id);
    let org_str      = encode_uuid(goal.organization_id);
    let owner_str    = encode_uuid(goal.owner_id);
    let title        = goal.title.clone();
    let target       = goal.target_amount_cents;
    let deadline_str = encode_date(goal.deadline);
    let created_str  = encode_dt(goal.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO goals (
             goal_id, organization_id, owner_id, title,
             target_amount_cents, saved_amount_cents, deadline,
             achieved, active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, 0, 1, ?7)",
          rusqlite::params![
            id_str, org_str, owner_str, title, target, deadline_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(goal)
  }

  async fn list_open_goals(&self, organization_id: Uuid) -> Result<Vec<Goal>> {
    let org_str = encode_uuid(organization_id);

    let raws: Vec<RawGoal> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT goal_id, organization_id, owner_id, title,
                  target_amount_cents, saved_amount_cents, deadline,
                  achieved, active, created_at
           FROM goals
           WHERE organization_id = ?1 AND active = 1 AND achieved = 0
           ORDER BY deadline",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![org_str], |row| {
            Ok(RawGoal {
              goal_id:             row.get(0)?,
              organization_id:     row.get(1)?,
              owner_id:            row.get(2)?,
              title:               row.get(3)?,
              target_amount_cents: row.get(4)?,
              saved_amount_cents:  row.get(5)?,
              deadline:            row.get(6)?,
              achieved:            row.get(7)?,
              active:              row.get(8)?,
              created_at:          row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGoal::into_goal).collect()
  }

  // ── Alert reads ───────────────────────────────────────────────────────────

  async fn list_candidates(
    &self,
    organization_id: Uuid,
    scope: PolicyScope,
  ) -> Result<Vec<Candidate>> {
    let org_str = encode_uuid(organization_id);

    let raws: Vec<RawCandidate> = match scope {
      PolicyScope::Transaction => {
        self
          .conn
          .call(move |conn| {
            let mut stmt = conn.prepare(
              "SELECT o.occurrence_id, s.title, s.owner_id, o.due_date,
                      o.amount_cents, s.flow, s.category_id
               FROM transaction_occurrences o
               JOIN transaction_series s ON s.series_id = o.series_id
               WHERE s.organization_id = ?1 AND o.status = 'pending'
               ORDER BY o.due_date",
            )?;
            let rows = stmt
              .query_map(rusqlite::params![org_str], |row| {
                Ok(RawCandidate {
                  resource_kind: ResourceKind::Transaction,
                  resource_id:   row.get(0)?,
                  title:         row.get(1)?,
                  owner_id:      row.get(2)?,
                  due_date:      row.get(3)?,
                  amount_cents:  row.get(4)?,
                  flow:          Some(row.get(5)?),
                  category_id:   row.get(6)?,
                })
              })?
              .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
          })
          .await?
      }
      PolicyScope::Goal => {
        self
          .conn
          .call(move |conn| {
            let mut stmt = conn.prepare(
              "SELECT goal_id, title, owner_id, deadline, target_amount_cents
               FROM goals
               WHERE organization_id = ?1 AND active = 1 AND achieved = 0
               ORDER BY deadline",
            )?;
            let rows = stmt
              .query_map(rusqlite::params![org_str], |row| {
                Ok(RawCandidate {
                  resource_kind: ResourceKind::Goal,
                  resource_id:   row.get(0)?,
                  title:         row.get(1)?,
                  owner_id:      row.get(2)?,
                  due_date:      row.get(3)?,
                  amount_cents:  row.get(4)?,
                  flow:          None,
                  category_id:   None,
                })
              })?
              .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
          })
          .await?
      }
    };

    raws.into_iter().map(RawCandidate::into_candidate).collect()
  }

  // ── Policies ──────────────────────────────────────────────────────────────

  async fn create_policy(&self, input: NewPolicy) -> Result<NotificationPolicy> {
    input
      .validate()
      .map_err(tally_core::Error::from)
      .map_err(Error::Core)?;

    let policy = NotificationPolicy {
      policy_id:            Uuid::new_v4(),
      organization_id:      input.organization_id,
      scope:                input.scope,
      event:                input.event,
      days_before:          input.days_before,
      days_overdue:         input.days_overdue,
      repeat_every_minutes: input.repeat_every_minutes,
      max_occurrences:      input.max_occurrences,
      channels:             input.channels,
      flow_filter:          input.flow_filter,
      category_id:          input.category_id,
      amount_min_cents:     input.amount_min_cents,
      amount_max_cents:     input.amount_max_cents,
      quiet_hours_start:    input.quiet_hours_start,
      quiet_hours_end:      input.quiet_hours_end,
      utc_offset:           input.utc_offset,
      weekdays_mask:        input.weekdays_mask,
      active:               true,
      created_at:           Utc::now(),
    };

    let id_str       = encode_uuid(policy.policy_id);
    let org_str      = encode_uuid(policy.organization_id);
    let scope_str    = policy.scope.discriminant().to_owned();
    let event_str    = policy.event.discriminant().to_owned();
    let days_before  = policy.days_before;
    let days_overdue = policy.days_overdue;
    let repeat       = policy.repeat_every_minutes;
    let cap          = policy.max_occurrences;
    let channels_str = encode_channels(&policy.channels);
    let flow_str     = policy.flow_filter.map(|f| f.discriminant().to_owned());
    let category_str = policy.category_id.map(encode_uuid);
    let amount_min   = policy.amount_min_cents;
    let amount_max   = policy.amount_max_cents;
    let quiet_start  = policy.quiet_hours_start.map(encode_time);
    let quiet_end    = policy.quiet_hours_end.map(encode_time);
    let offset_str   = policy.utc_offset.to_string();
    let mask         = policy.weekdays_mask;
    let created_str  = encode_dt(policy.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notification_policies (
             policy_id, organization_id, scope, event,
             days_before, days_overdue, repeat_every_minutes, max_occurrences,
             channels, flow_filter, category_id,
             amount_min_cents, amount_max_cents,
             quiet_hours_start, quiet_hours_end,
             utc_offset, weekdays_mask, active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17, 1, ?18)",
          rusqlite::params![
            id_str, org_str, scope_str, event_str,
            days_before, days_overdue, repeat, cap,
            channels_str, flow_str, category_str,
            amount_min, amount_max,
            quiet_start, quiet_end,
            offset_str, mask, created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(policy)
  }

  async fn list_active_policies(
    &self,
    event: PolicyEvent,
  ) -> Result<Vec<NotificationPolicy>> {
    let event_str = event.discriminant().to_owned();

    let raws: Vec<RawPolicy> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT policy_id, organization_id, scope, event,
                  days_before, days_overdue, repeat_every_minutes,
                  max_occurrences, channels, flow_filter, category_id,
                  amount_min_cents, amount_max_cents,
                  quiet_hours_start, quiet_hours_end,
                  utc_offset, weekdays_mask, active, created_at
           FROM notification_policies
           WHERE event = ?1 AND active = 1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![event_str], |row| {
            Ok(RawPolicy {
              policy_id:            row.get(0)?,
              organization_id:      row.get(1)?,
              scope:                row.get(2)?,
              event:                row.get(3)?,
              days_before:          row.get(4)?,
              days_overdue:         row.get(5)?,
              repeat_every_minutes: row.get(6)?,
              max_occurrences:      row.get(7)?,
              channels:             row.get(8)?,
              flow_filter:          row.get(9)?,
              category_id:          row.get(10)?,
              amount_min_cents:     row.get(11)?,
              amount_max_cents:     row.get(12)?,
              quiet_hours_start:    row.get(13)?,
              quiet_hours_end:      row.get(14)?,
              utc_offset:           row.get(15)?,
              weekdays_mask:        row.get(16)?,
              active:               row.get(17)?,
              created_at:           row.get(18)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPolicy::into_policy).collect()
  }

  async fn set_policy_active(&self, policy_id: Uuid, active: bool) -> Result<()> {
    let id_str = encode_uuid(policy_id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notification_policies SET active = ?2 WHERE policy_id = ?1",
          rusqlite::params![id_str, active],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::PolicyNotFound(policy_id));
    }
    Ok(())
  }

  // ── Dedup ledger ──────────────────────────────────────────────────────────

  async fn get_notification_state(
    &self,
    policy_id: Uuid,
    resource: ResourceRef,
  ) -> Result<Option<NotificationState>> {
    let policy_str   = encode_uuid(policy_id);
    let kind_str     = resource.kind.discriminant().to_owned();
    let resource_str = encode_uuid(resource.id);

    let raw: Option<RawState> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT state_id, policy_id, resource_kind, resource_id,
                      last_notified_at, occurrences, next_eligible_at, status
               FROM notification_state
               WHERE policy_id = ?1 AND resource_kind = ?2 AND resource_id = ?3",
              rusqlite::params![policy_str, kind_str, resource_str],
              |row| {
                Ok(RawState {
                  state_id:         row.get(0)?,
                  policy_id:        row.get(1)?,
                  resource_kind:    row.get(2)?,
                  resource_id:      row.get(3)?,
                  last_notified_at: row.get(4)?,
                  occurrences:      row.get(5)?,
                  next_eligible_at: row.get(6)?,
                  status:           row.get(7)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawState::into_state).transpose()
  }

  async fn upsert_notification_state(
    &self,
    state: NotificationState,
  ) -> Result<()> {
    let id_str       = encode_uuid(state.state_id);
    let policy_str   = encode_uuid(state.policy_id);
    let kind_str     = state.resource.kind.discriminant().to_owned();
    let resource_str = encode_uuid(state.resource.id);
    let last_str     = encode_dt(state.last_notified_at);
    let occurrences  = state.occurrences;
    let next_str     = state.next_eligible_at.map(encode_dt);
    let status_str   = state.status.discriminant().to_owned();

    self
      .conn
      .call(move |conn| {
        // Row-atomic: two racing job keys can both run this and the ledger
        // still converges on a single row per (policy, resource).
        conn.execute(
          "INSERT INTO notification_state (
             state_id, policy_id, resource_kind, resource_id,
             last_notified_at, occurrences, next_eligible_at, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT (policy_id, resource_kind, resource_id) DO UPDATE SET
             last_notified_at = excluded.last_notified_at,
             occurrences      = excluded.occurrences,
             next_eligible_at = excluded.next_eligible_at,
             status           = excluded.status",
          rusqlite::params![
            id_str, policy_str, kind_str, resource_str,
            last_str, occurrences, next_str, status_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  // ── Audit log ─────────────────────────────────────────────────────────────

  async fn append_run(&self, input: NewNotificationRun) -> Result<NotificationRun> {
    let run = NotificationRun {
      run_id:    Uuid::new_v4(),
      policy_id: input.policy_id,
      resource:  input.resource,
      channel:   input.channel,
      sent_at:   input.sent_at,
      status:    input.status,
    };

    let id_str       = encode_uuid(run.run_id);
    let policy_str   = encode_uuid(run.policy_id);
    let kind_str     = run.resource.kind.discriminant().to_owned();
    let resource_str = encode_uuid(run.resource.id);
    let channel_str  = run.channel.discriminant().to_owned();
    let sent_str     = encode_dt(run.sent_at);
    let (status_str, error) = match &run.status {
      RunStatus::Sent => ("sent", None),
      RunStatus::Failed { error } => ("failed", Some(error.clone())),
    };
    let status_str = status_str.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notification_runs (
             run_id, policy_id, resource_kind, resource_id,
             channel, sent_at, status, error
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str, policy_str, kind_str, resource_str,
            channel_str, sent_str, status_str, error,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(run)
  }

  async fn list_recent_runs(&self, limit: usize) -> Result<Vec<NotificationRun>> {
    let limit = limit as i64;

    let raws: Vec<RawRun> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT run_id, policy_id, resource_kind, resource_id,
                  channel, sent_at, status, error
           FROM notification_runs
           ORDER BY sent_at DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(RawRun {
              run_id:        row.get(0)?,
              policy_id:     row.get(1)?,
              resource_kind: row.get(2)?,
              resource_id:   row.get(3)?,
              channel:       row.get(4)?,
              sent_at:       row.get(5)?,
              status:        row.get(6)?,
              error:         row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRun::into_run).collect()
  }
}
