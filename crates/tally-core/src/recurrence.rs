//! Pure due-date arithmetic for recurrence patterns.
//!
//! All functions here are total over valid inputs and free of side effects.
//! Month and year steps use calendar arithmetic: the day-of-month is
//! preserved, clamping to the last day of shorter target months (so a series
//! starting Jan 31 falls due Feb 28/29, never Mar 3).

use chrono::{Days, Months, NaiveDate};

use crate::{
  Error, Result,
  series::{Recurrence, RecurrenceKind},
};

/// The due date of installment `index` (0-based) for a series starting at
/// `start` with the given recurrence.
///
/// Index 0 is always `start` itself. A zero interval is an input-validation
/// error; a date pushed past chrono's representable range is
/// [`Error::DateOutOfRange`].
pub fn next_due_date(
  start: NaiveDate,
  recurrence: Recurrence,
  index: u32,
) -> Result<NaiveDate> {
  if recurrence.interval < 1 {
    return Err(Error::InvalidInterval(recurrence.interval));
  }

  let steps = u64::from(index) * u64::from(recurrence.interval);

  match recurrence.kind {
    RecurrenceKind::Weekly => start
      .checked_add_days(Days::new(steps * 7))
      .ok_or(Error::DateOutOfRange),
    RecurrenceKind::Monthly => add_months(start, steps),
    RecurrenceKind::Yearly => add_months(start, steps * 12),
  }
}

/// Calendar-month addition with day-of-month clamping, via
/// [`NaiveDate::checked_add_months`].
fn add_months(start: NaiveDate, months: u64) -> Result<NaiveDate> {
  let months = u32::try_from(months).map_err(|_| Error::DateOutOfRange)?;
  start
    .checked_add_months(Months::new(months))
    .ok_or(Error::DateOutOfRange)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn rec(kind: RecurrenceKind, interval: u32) -> Recurrence {
    Recurrence { kind, interval }
  }

  #[test]
  fn index_zero_is_start() {
    let start = d(2024, 1, 15);
    for kind in [
      RecurrenceKind::Weekly,
      RecurrenceKind::Monthly,
      RecurrenceKind::Yearly,
    ] {
      assert_eq!(next_due_date(start, rec(kind, 1), 0).unwrap(), start);
    }
  }

  #[test]
  fn weekly_steps() {
    let start = d(2024, 1, 1);
    assert_eq!(
      next_due_date(start, rec(RecurrenceKind::Weekly, 1), 3).unwrap(),
      d(2024, 1, 22)
    );
    assert_eq!(
      next_due_date(start, rec(RecurrenceKind::Weekly, 2), 2).unwrap(),
      d(2024, 1, 29)
    );
  }

  #[test]
  fn monthly_preserves_day() {
    let start = d(2024, 1, 15);
    assert_eq!(
      next_due_date(start, rec(RecurrenceKind::Monthly, 1), 1).unwrap(),
      d(2024, 2, 15)
    );
    assert_eq!(
      next_due_date(start, rec(RecurrenceKind::Monthly, 1), 11).unwrap(),
      d(2024, 12, 15)
    );
  }

  #[test]
  fn monthly_clamps_to_short_month() {
    // Jan 31 + 1 month lands on the last day of February, not Mar 3.
    let start = d(2024, 1, 31);
    assert_eq!(
      next_due_date(start, rec(RecurrenceKind::Monthly, 1), 1).unwrap(),
      d(2024, 2, 29)
    );
    // Non-leap year.
    let start = d(2023, 1, 31);
    assert_eq!(
      next_due_date(start, rec(RecurrenceKind::Monthly, 1), 1).unwrap(),
      d(2023, 2, 28)
    );
    // Clamping does not stick: the next 31-day month gets its 31st back.
    let start = d(2024, 1, 31);
    assert_eq!(
      next_due_date(start, rec(RecurrenceKind::Monthly, 1), 2).unwrap(),
      d(2024, 3, 31)
    );
  }

  #[test]
  fn monthly_with_interval_crosses_years() {
    let start = d(2024, 11, 30);
    assert_eq!(
      next_due_date(start, rec(RecurrenceKind::Monthly, 3), 1).unwrap(),
      d(2025, 2, 28)
    );
  }

  #[test]
  fn yearly_leap_day_clamps() {
    let start = d(2024, 2, 29);
    assert_eq!(
      next_due_date(start, rec(RecurrenceKind::Yearly, 1), 1).unwrap(),
      d(2025, 2, 28)
    );
    // Back on a leap year the 29th returns.
    assert_eq!(
      next_due_date(start, rec(RecurrenceKind::Yearly, 1), 4).unwrap(),
      d(2028, 2, 29)
    );
  }

  #[test]
  fn zero_interval_is_an_error() {
    let start = d(2024, 1, 1);
    assert!(matches!(
      next_due_date(start, rec(RecurrenceKind::Weekly, 0), 1),
      Err(Error::InvalidInterval(0))
    ));
  }
}
