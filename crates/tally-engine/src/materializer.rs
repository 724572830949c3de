//! Series materialisation — expanding recurring definitions into concrete
//! occurrences up to a safety horizon.
//!
//! Materialisation is idempotent: occurrences are keyed by
//! (series_id, installment_index) and inserted with create-once semantics, so
//! re-running with the same clock produces no duplicates and never touches an
//! existing row, paid ones included. Per-series failures are collected into
//! the report; one bad series never blocks the batch.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use tally_core::{
  clock::Clock,
  occurrence::NewOccurrence,
  recurrence::next_due_date,
  series::TransactionSeries,
  store::LedgerStore,
};

use crate::{Error, Result};

/// How far past "today" materialisation reaches, so occurrences exist
/// comfortably before they fall due.
pub const DEFAULT_HORIZON_DAYS: u32 = 90;

// ─── Report ──────────────────────────────────────────────────────────────────

/// Batch result of one materialisation pass. Always returned, even on
/// partial failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterializeReport {
  /// Active series visited.
  pub series_seen: usize,
  /// Occurrences newly created in this pass.
  pub created:     usize,
  pub errors:      Vec<String>,
}

// ─── Materializer ────────────────────────────────────────────────────────────

pub struct Materializer<S, C> {
  store:        Arc<S>,
  clock:        Arc<C>,
  horizon_days: u32,
}

impl<S, C> Materializer<S, C>
where
  S: LedgerStore,
  C: Clock,
{
  pub fn new(store: Arc<S>, clock: Arc<C>, horizon_days: u32) -> Self {
    Self {
      store,
      clock,
      horizon_days,
    }
  }

  /// Materialise every active series up to `today + horizon_days`.
  ///
  /// Never returns `Err`: store-level failure aborts the pass and lands in
  /// the report's errors instead, so the scheduler loop stays alive.
  pub async fn run(&self) -> MaterializeReport {
    let mut report = MaterializeReport::default();

    let series = match self.store.list_active_series().await {
      Ok(series) => series,
      Err(e) => {
        warn!(error = %e, "materialization aborted: cannot list series");
        report.errors.push(format!("list series: {e}"));
        return report;
      }
    };

    let today = self.clock.now().date_naive();
    let horizon = today
      .checked_add_days(Days::new(u64::from(self.horizon_days)))
      .unwrap_or(NaiveDate::MAX);

    for series in series {
      report.series_seen += 1;
      match self.materialize_series(&series, horizon).await {
        Ok(created) => report.created += created,
        Err(e) => {
          warn!(
            series_id = %series.series_id,
            error = %e,
            "series skipped"
          );
          report.errors.push(format!("series {}: {e}", series.series_id));
        }
      }
    }

    info!(
      series_seen = report.series_seen,
      created = report.created,
      errors = report.errors.len(),
      "materialization pass complete"
    );
    report
  }

  /// Create every missing occurrence of one series with a due date inside
  /// the horizon, honouring the series' own bound.
  pub(crate) async fn materialize_series(
    &self,
    series: &TransactionSeries,
    horizon: NaiveDate,
  ) -> Result<usize> {
    let mut created = 0;
    let mut index: u32 = 0;

    loop {
      if let Some(total) = series.installments_total
        && index >= total
      {
        break;
      }

      // Due dates grow strictly with the index, so both exits terminate.
      let due = next_due_date(series.start_date, series.recurrence, index)?;
      if let Some(until) = series.recurrence_until
        && due > until
      {
        break;
      }
      if due > horizon {
        break;
      }

      let inserted = self
        .store
        .insert_occurrence_if_absent(NewOccurrence {
          series_id:         series.series_id,
          installment_index: index,
          due_date:          due,
          amount_cents:      series.amount_cents,
        })
        .await
        .map_err(Error::store)?;
      if inserted {
        created += 1;
      }

      index += 1;
    }

    Ok(created)
  }
}
