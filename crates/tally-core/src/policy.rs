//! Notification policies — tenant-scoped alerting rules.
//!
//! A policy describes when an alert *may* fire for a resource: the event and
//! its day threshold, optional amount/flow/category filters, quiet hours in
//! the policy's local time, and a weekday mask. Whether an alert *does* fire
//! is then up to the dedup ledger (see [`crate::dedup`]).
//!
//! Policies are validated at creation time; evaluation never sees an invalid
//! policy.

use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::series::Flow;

// ─── Scope and event ─────────────────────────────────────────────────────────

/// The kind of resource a policy watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyScope {
  Transaction,
  Goal,
}

impl PolicyScope {
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Transaction => "transaction",
      Self::Goal => "goal",
    }
  }
}

/// The condition a policy alerts on. `DueSoon` requires `days_before`;
/// `Overdue` requires `days_overdue`. The two thresholds are mutually
/// exclusive by event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyEvent {
  DueSoon,
  Overdue,
}

impl PolicyEvent {
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::DueSoon => "due_soon",
      Self::Overdue => "overdue",
    }
  }
}

// ─── Channels ────────────────────────────────────────────────────────────────

/// A delivery channel. The transport behind each channel is an external
/// collaborator; the engine only routes to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
  Push,
  Sms,
  Chat,
}

impl Channel {
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Push => "push",
      Self::Sms => "sms",
      Self::Chat => "chat",
    }
  }
}

impl FromStr for Channel {
  type Err = PolicyConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "push" => Ok(Self::Push),
      "sms" => Ok(Self::Sms),
      "chat" => Ok(Self::Chat),
      other => Err(PolicyConfigError::UnknownChannel(other.to_owned())),
    }
  }
}

impl fmt::Display for Channel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.discriminant())
  }
}

// ─── Policy-local timezone ───────────────────────────────────────────────────

/// A policy's local timezone as a fixed UTC offset, serialised as `"+HH:MM"`.
///
/// Quiet hours and the weekday mask are interpreted in this offset. A fixed
/// offset (rather than an IANA zone) is deliberate: the windows only need a
/// stable local clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcOffset(FixedOffset);

impl UtcOffset {
  /// The zero offset.
  pub fn utc() -> Self {
    // Zero is always a representable offset.
    Self(FixedOffset::east_opt(0).unwrap())
  }

  /// Shift a UTC instant into this policy's local time.
  pub fn localize(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
    at.with_timezone(&self.0)
  }
}

impl Default for UtcOffset {
  fn default() -> Self { Self::utc() }
}

impl FromStr for UtcOffset {
  type Err = PolicyConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.parse::<FixedOffset>()
      .map(UtcOffset)
      .map_err(|_| PolicyConfigError::InvalidUtcOffset(s.to_owned()))
  }
}

impl fmt::Display for UtcOffset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // FixedOffset renders as "+HH:MM" / "-HH:MM".
    fmt::Display::fmt(&self.0, f)
  }
}

impl Serialize for UtcOffset {
  fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for UtcOffset {
  fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(d)?;
    raw.parse().map_err(serde::de::Error::custom)
  }
}

// ─── Weekday mask ────────────────────────────────────────────────────────────

/// All seven weekday bits set — the mask default.
pub const ALL_WEEKDAYS: u8 = 0b0111_1111;

/// The mask bit for a weekday. Bit 0 is Sunday through bit 6 Saturday.
pub fn weekday_bit(weekday: chrono::Weekday) -> u8 {
  1 << weekday.num_days_from_sunday()
}

// ─── NotificationPolicy ──────────────────────────────────────────────────────

/// A stored, validated alerting rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPolicy {
  pub policy_id:            Uuid,
  pub organization_id:      Uuid,
  pub scope:                PolicyScope,
  pub event:                PolicyEvent,
  /// Set iff `event == DueSoon`: alert when the resource falls due within
  /// this many days (0 = only on the due day itself).
  pub days_before:          Option<u32>,
  /// Set iff `event == Overdue`: the minimum lateness, in days, before the
  /// first overdue alert fires. The resource stays eligible thereafter.
  pub days_overdue:         Option<u32>,
  /// If set, the alert may repeat at this cadence; if unset the policy is
  /// one-shot per resource.
  pub repeat_every_minutes: Option<u32>,
  /// Cap on the total number of alerts per resource. Only meaningful on
  /// repeating policies.
  pub max_occurrences:      Option<u32>,
  pub channels:             Vec<Channel>,
  pub flow_filter:          Option<Flow>,
  pub category_id:          Option<Uuid>,
  /// Inclusive bounds on the resource amount, in cents.
  pub amount_min_cents:     Option<i64>,
  pub amount_max_cents:     Option<i64>,
  /// Local-time window during which alerts are suppressed. A window with
  /// `start > end` wraps midnight.
  pub quiet_hours_start:    Option<NaiveTime>,
  pub quiet_hours_end:      Option<NaiveTime>,
  pub utc_offset:           UtcOffset,
  pub weekdays_mask:        u8,
  pub active:               bool,
  pub created_at:           DateTime<Utc>,
}

impl NotificationPolicy {
  /// Whether the mask permits alerting on the given local weekday.
  pub fn allows_weekday(&self, weekday: chrono::Weekday) -> bool {
    self.weekdays_mask & weekday_bit(weekday) != 0
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Rejections surfaced at policy-creation time. None of these conditions can
/// reach evaluation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyConfigError {
  #[error("due_soon policies require days_before")]
  MissingDaysBefore,

  #[error("overdue policies require days_overdue")]
  MissingDaysOverdue,

  #[error("due_soon policies must not set days_overdue")]
  UnexpectedDaysOverdue,

  #[error("overdue policies must not set days_before")]
  UnexpectedDaysBefore,

  #[error("repeat_every_minutes must be at least 1 when set")]
  ZeroRepeatInterval,

  #[error("max_occurrences requires repeat_every_minutes")]
  CapWithoutRepeat,

  #[error("a policy needs at least one delivery channel")]
  NoChannels,

  #[error("unknown delivery channel: {0:?}")]
  UnknownChannel(String),

  #[error("a weekdays mask of 0 would suppress every alert")]
  EmptyWeekdayMask,

  #[error("quiet hours require both a start and an end time")]
  HalfOpenQuietHours,

  #[error("invalid UTC offset: {0:?} (expected \"+HH:MM\")")]
  InvalidUtcOffset(String),
}

// ─── NewPolicy ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::LedgerStore::create_policy`].
#[derive(Debug, Clone)]
pub struct NewPolicy {
  pub organization_id:      Uuid,
  pub scope:                PolicyScope,
  pub event:                PolicyEvent,
  pub days_before:          Option<u32>,
  pub days_overdue:         Option<u32>,
  pub repeat_every_minutes: Option<u32>,
  pub max_occurrences:      Option<u32>,
  pub channels:             Vec<Channel>,
  pub flow_filter:          Option<Flow>,
  pub category_id:          Option<Uuid>,
  pub amount_min_cents:     Option<i64>,
  pub amount_max_cents:     Option<i64>,
  pub quiet_hours_start:    Option<NaiveTime>,
  pub quiet_hours_end:      Option<NaiveTime>,
  pub utc_offset:           UtcOffset,
  pub weekdays_mask:        u8,
}

impl NewPolicy {
  /// A minimal valid policy; callers set filters and windows on the result.
  pub fn new(
    organization_id: Uuid,
    scope: PolicyScope,
    event: PolicyEvent,
    threshold_days: u32,
  ) -> Self {
    let (days_before, days_overdue) = match event {
      PolicyEvent::DueSoon => (Some(threshold_days), None),
      PolicyEvent::Overdue => (None, Some(threshold_days)),
    };
    Self {
      organization_id,
      scope,
      event,
      days_before,
      days_overdue,
      repeat_every_minutes: None,
      max_occurrences: None,
      channels: vec![Channel::Push],
      flow_filter: None,
      category_id: None,
      amount_min_cents: None,
      amount_max_cents: None,
      quiet_hours_start: None,
      quiet_hours_end: None,
      utc_offset: UtcOffset::utc(),
      weekdays_mask: ALL_WEEKDAYS,
    }
  }

  pub fn validate(&self) -> Result<(), PolicyConfigError> {
    match self.event {
      PolicyEvent::DueSoon => {
        if self.days_before.is_none() {
          return Err(PolicyConfigError::MissingDaysBefore);
        }
        if self.days_overdue.is_some() {
          return Err(PolicyConfigError::UnexpectedDaysOverdue);
        }
      }
      PolicyEvent::Overdue => {
        if self.days_overdue.is_none() {
          return Err(PolicyConfigError::MissingDaysOverdue);
        }
        if self.days_before.is_some() {
          return Err(PolicyConfigError::UnexpectedDaysBefore);
        }
      }
    }

    if self.repeat_every_minutes == Some(0) {
      return Err(PolicyConfigError::ZeroRepeatInterval);
    }
    if self.max_occurrences.is_some() && self.repeat_every_minutes.is_none() {
      return Err(PolicyConfigError::CapWithoutRepeat);
    }
    if self.channels.is_empty() {
      return Err(PolicyConfigError::NoChannels);
    }
    if self.weekdays_mask & ALL_WEEKDAYS == 0 {
      return Err(PolicyConfigError::EmptyWeekdayMask);
    }
    if self.quiet_hours_start.is_some() != self.quiet_hours_end.is_some() {
      return Err(PolicyConfigError::HalfOpenQuietHours);
    }

    Ok(())
  }
}
