//! Notification message rendering.

use tally_core::{
  eligibility::Candidate,
  policy::PolicyEvent,
  status::EffectiveStatus,
};

/// Render the human-readable body for one alert.
pub fn build_message(
  event: PolicyEvent,
  candidate: &Candidate,
  status: EffectiveStatus,
) -> String {
  let amount = format_cents(candidate.amount_cents);
  match (event, status) {
    (PolicyEvent::DueSoon, EffectiveStatus::Pending { days_until_due: 0 }) => {
      format!("{} ({amount}) is due today", candidate.title)
    }
    (PolicyEvent::DueSoon, EffectiveStatus::Pending { days_until_due }) => {
      format!(
        "{} ({amount}) is due in {days_until_due} {}",
        candidate.title,
        plural(days_until_due, "day", "days"),
      )
    }
    (PolicyEvent::Overdue, EffectiveStatus::Overdue { days_overdue }) => {
      format!(
        "{} ({amount}) is {days_overdue} {} overdue",
        candidate.title,
        plural(days_overdue, "day", "days"),
      )
    }
    // Eligibility filters out the remaining combinations; fall back to a
    // generic line rather than panic if one slips through.
    (PolicyEvent::DueSoon, _) => {
      format!("{} ({amount}) needs attention", candidate.title)
    }
    (PolicyEvent::Overdue, _) => {
      format!("{} ({amount}) needs attention", candidate.title)
    }
  }
}

/// Format a cent amount as dollars, e.g. `1250` -> `$12.50`.
pub fn format_cents(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

fn plural<'a>(n: u32, one: &'a str, many: &'a str) -> &'a str {
  if n == 1 { one } else { many }
}
