//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, dates as `YYYY-MM-DD`,
//! times of day as `HH:MM`. Enums are stored by their `discriminant()`
//! strings. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tally_core::{
  eligibility::Candidate,
  goal::Goal,
  notification::{
    NotificationRun, NotificationState, ResourceKind, ResourceRef, RunStatus,
    StateStatus,
  },
  occurrence::{StoredStatus, TransactionOccurrence},
  policy::{
    Channel, NotificationPolicy, PolicyEvent, PolicyScope, UtcOffset,
  },
  series::{Flow, Recurrence, RecurrenceKind, TransactionSeries},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps, dates, times ────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M")
    .map_err(|e| Error::Decode(format!("time {s:?}: {e}")))
}

// ─── Enum discriminants ──────────────────────────────────────────────────────

pub fn decode_flow(s: &str) -> Result<Flow> {
  match s {
    "expense" => Ok(Flow::Expense),
    "income" => Ok(Flow::Income),
    other => Err(Error::Decode(format!("unknown flow: {other:?}"))),
  }
}

pub fn decode_recurrence_kind(s: &str) -> Result<RecurrenceKind> {
  match s {
    "weekly" => Ok(RecurrenceKind::Weekly),
    "monthly" => Ok(RecurrenceKind::Monthly),
    "yearly" => Ok(RecurrenceKind::Yearly),
    other => Err(Error::Decode(format!("unknown recurrence kind: {other:?}"))),
  }
}

pub fn decode_stored_status(s: &str) -> Result<StoredStatus> {
  match s {
    "pending" => Ok(StoredStatus::Pending),
    "paid" => Ok(StoredStatus::Paid),
    "canceled" => Ok(StoredStatus::Canceled),
    other => Err(Error::Decode(format!("unknown occurrence status: {other:?}"))),
  }
}

pub fn decode_scope(s: &str) -> Result<PolicyScope> {
  match s {
    "transaction" => Ok(PolicyScope::Transaction),
    "goal" => Ok(PolicyScope::Goal),
    other => Err(Error::Decode(format!("unknown policy scope: {other:?}"))),
  }
}

pub fn decode_event(s: &str) -> Result<PolicyEvent> {
  match s {
    "due_soon" => Ok(PolicyEvent::DueSoon),
    "overdue" => Ok(PolicyEvent::Overdue),
    other => Err(Error::Decode(format!("unknown policy event: {other:?}"))),
  }
}

pub fn decode_resource_kind(s: &str) -> Result<ResourceKind> {
  match s {
    "transaction" => Ok(ResourceKind::Transaction),
    "goal" => Ok(ResourceKind::Goal),
    other => Err(Error::Decode(format!("unknown resource kind: {other:?}"))),
  }
}

pub fn decode_state_status(s: &str) -> Result<StateStatus> {
  match s {
    "active" => Ok(StateStatus::Active),
    "capped" => Ok(StateStatus::Capped),
    other => Err(Error::Decode(format!("unknown state status: {other:?}"))),
  }
}

// ─── Channels ────────────────────────────────────────────────────────────────

/// `[Push, Sms]` ⇄ `"push,sms"`.
pub fn encode_channels(channels: &[Channel]) -> String {
  channels
    .iter()
    .map(|c| c.discriminant())
    .collect::<Vec<_>>()
    .join(",")
}

pub fn decode_channels(s: &str) -> Result<Vec<Channel>> {
  s.split(',')
    .filter(|part| !part.is_empty())
    .map(|part| {
      part
        .parse::<Channel>()
        .map_err(|e| Error::Decode(e.to_string()))
    })
    .collect()
}

// ─── UtcOffset ───────────────────────────────────────────────────────────────

pub fn decode_utc_offset(s: &str) -> Result<UtcOffset> {
  s.parse::<UtcOffset>()
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `transaction_series` row.
pub struct RawSeries {
  pub series_id:           String,
  pub organization_id:     String,
  pub owner_id:            String,
  pub pay_to_id:           Option<String>,
  pub title:               String,
  pub amount_cents:        i64,
  pub flow:                String,
  pub category_id:         Option<String>,
  pub start_date:          String,
  pub recurrence_kind:     String,
  pub recurrence_interval: u32,
  pub installments_total:  Option<u32>,
  pub recurrence_until:    Option<String>,
  pub active:              bool,
  pub created_at:          String,
}

impl RawSeries {
  pub fn into_series(self) -> Result<TransactionSeries> {
    Ok(TransactionSeries {
      series_id:          decode_uuid(&self.series_id)?,
      organization_id:    decode_uuid(&self.organization_id)?,
      owner_id:           decode_uuid(&self.owner_id)?,
      pay_to_id:          self.pay_to_id.as_deref().map(decode_uuid).transpose()?,
      title:              self.title,
      amount_cents:       self.amount_cents,
      flow:               decode_flow(&self.flow)?,
      category_id:        self
        .category_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      start_date:         decode_date(&self.start_date)?,
      recurrence:         Recurrence {
        kind:     decode_recurrence_kind(&self.recurrence_kind)?,
        interval: self.recurrence_interval,
      },
      installments_total: self.installments_total,
      recurrence_until:   self
        .recurrence_until
        .as_deref()
        .map(decode_date)
        .transpose()?,
      active:             self.active,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `transaction_occurrences` row.
pub struct RawOccurrence {
  pub occurrence_id:     String,
  pub series_id:         String,
  pub installment_index: u32,
  pub due_date:          String,
  pub amount_cents:      i64,
  pub status:            String,
  pub paid_at:           Option<String>,
  pub value_paid_cents:  Option<i64>,
}

impl RawOccurrence {
  pub fn into_occurrence(self) -> Result<TransactionOccurrence> {
    Ok(TransactionOccurrence {
      occurrence_id:     decode_uuid(&self.occurrence_id)?,
      series_id:         decode_uuid(&self.series_id)?,
      installment_index: self.installment_index,
      due_date:          decode_date(&self.due_date)?,
      amount_cents:      self.amount_cents,
      status:            decode_stored_status(&self.status)?,
      paid_at:           self.paid_at.as_deref().map(decode_dt).transpose()?,
      value_paid_cents:  self.value_paid_cents,
    })
  }
}

/// Raw strings read directly from a `goals` row.
pub struct RawGoal {
  pub goal_id:             String,
  pub organization_id:     String,
  pub owner_id:            String,
  pub title:               String,
  pub target_amount_cents: i64,
  pub saved_amount_cents:  i64,
  pub deadline:            String,
  pub achieved:            bool,
  pub active:              bool,
  pub created_at:          String,
}

impl RawGoal {
  pub fn into_goal(self) -> Result<Goal> {
    Ok(Goal {
      goal_id:             decode_uuid(&self.goal_id)?,
      organization_id:     decode_uuid(&self.organization_id)?,
      owner_id:            decode_uuid(&self.owner_id)?,
      title:               self.title,
      target_amount_cents: self.target_amount_cents,
      saved_amount_cents:  self.saved_amount_cents,
      deadline:            decode_date(&self.deadline)?,
      achieved:            self.achieved,
      active:              self.active,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `notification_policies` row.
pub struct RawPolicy {
  pub policy_id:            String,
  pub organization_id:      String,
  pub scope:                String,
  pub event:                String,
  pub days_before:          Option<u32>,
  pub days_overdue:         Option<u32>,
  pub repeat_every_minutes: Option<u32>,
  pub max_occurrences:      Option<u32>,
  pub channels:             String,
  pub flow_filter:          Option<String>,
  pub category_id:          Option<String>,
  pub amount_min_cents:     Option<i64>,
  pub amount_max_cents:     Option<i64>,
  pub quiet_hours_start:    Option<String>,
  pub quiet_hours_end:      Option<String>,
  pub utc_offset:           String,
  pub weekdays_mask:        u8,
  pub active:               bool,
  pub created_at:           String,
}

impl RawPolicy {
  pub fn into_policy(self) -> Result<NotificationPolicy> {
    Ok(NotificationPolicy {
      policy_id:            decode_uuid(&self.policy_id)?,
      organization_id:      decode_uuid(&self.organization_id)?,
      scope:                decode_scope(&self.scope)?,
      event:                decode_event(&self.event)?,
      days_before:          self.days_before,
      days_overdue:         self.days_overdue,
      repeat_every_minutes: self.repeat_every_minutes,
      max_occurrences:      self.max_occurrences,
      channels:             decode_channels(&self.channels)?,
      flow_filter:          self
        .flow_filter
        .as_deref()
        .map(decode_flow)
        .transpose()?,
      category_id:          self
        .category_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      amount_min_cents:     self.amount_min_cents,
      amount_max_cents:     self.amount_max_cents,
      quiet_hours_start:    self
        .quiet_hours_start
        .as_deref()
        .map(decode_time)
        .transpose()?,
      quiet_hours_end:      self
        .quiet_hours_end
        .as_deref()
        .map(decode_time)
        .transpose()?,
      utc_offset:           decode_utc_offset(&self.utc_offset)?,
      weekdays_mask:        self.weekdays_mask,
      active:               self.active,
      created_at:           decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `notification_state` row.
pub struct RawState {
  pub state_id:         String,
  pub policy_id:        String,
  pub resource_kind:    String,
  pub resource_id:      String,
  pub last_notified_at: String,
  pub occurrences:      u32,
  pub next_eligible_at: Option<String>,
  pub status:           String,
}

impl RawState {
  pub fn into_state(self) -> Result<NotificationState> {
    Ok(NotificationState {
      state_id:         decode_uuid(&self.state_id)?,
      policy_id:        decode_uuid(&self.policy_id)?,
      resource:         ResourceRef {
        kind: decode_resource_kind(&self.resource_kind)?,
        id:   decode_uuid(&self.resource_id)?,
      },
      last_notified_at: decode_dt(&self.last_notified_at)?,
      occurrences:      self.occurrences,
      next_eligible_at: self
        .next_eligible_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      status:           decode_state_status(&self.status)?,
    })
  }
}

/// Raw strings read directly from a `notification_runs` row.
pub struct RawRun {
  pub run_id:        String,
  pub policy_id:     String,
  pub resource_kind: String,
  pub resource_id:   String,
  pub channel:       String,
  pub sent_at:       String,
  pub status:        String,
  pub error:         Option<String>,
}

impl RawRun {
  pub fn into_run(self) -> Result<NotificationRun> {
    let status = match self.status.as_str() {
      "sent" => RunStatus::Sent,
      "failed" => RunStatus::Failed {
        error: self.error.unwrap_or_default(),
      },
      other => {
        return Err(Error::Decode(format!("unknown run status: {other:?}")));
      }
    };
    Ok(NotificationRun {
      run_id:    decode_uuid(&self.run_id)?,
      policy_id: decode_uuid(&self.policy_id)?,
      resource:  ResourceRef {
        kind: decode_resource_kind(&self.resource_kind)?,
        id:   decode_uuid(&self.resource_id)?,
      },
      channel:   self
        .channel
        .parse::<Channel>()
        .map_err(|e| Error::Decode(e.to_string()))?,
      sent_at:   decode_dt(&self.sent_at)?,
      status,
    })
  }
}

/// Raw strings for one alert candidate (occurrence-with-series or goal).
pub struct RawCandidate {
  pub resource_kind: ResourceKind,
  pub resource_id:   String,
  pub title:         String,
  pub owner_id:      String,
  pub due_date:      String,
  pub amount_cents:  i64,
  pub flow:          Option<String>,
  pub category_id:   Option<String>,
}

impl RawCandidate {
  pub fn into_candidate(self) -> Result<Candidate> {
    Ok(Candidate {
      resource:     ResourceRef {
        kind: self.resource_kind,
        id:   decode_uuid(&self.resource_id)?,
      },
      title:        self.title,
      owner_id:     decode_uuid(&self.owner_id)?,
      due_date:     decode_date(&self.due_date)?,
      amount_cents: self.amount_cents,
      flow:         self.flow.as_deref().map(decode_flow).transpose()?,
      category_id:  self
        .category_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
    })
  }
}
