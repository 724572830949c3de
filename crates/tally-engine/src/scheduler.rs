//! Periodic job orchestration and the operator control surface.
//!
//! Three fixed jobs run on independent intervals: series materialisation,
//! the due-soon alert cycle, and the overdue alert cycle. Each job key is
//! single-flight: a manual trigger while the same key is already running is
//! skipped, not queued. Loops exit cooperatively on a shared shutdown signal
//! and can be restarted.

use std::{
  collections::HashMap,
  str::FromStr,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{sync::watch, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use tally_core::{clock::Clock, policy::PolicyEvent, store::LedgerStore};

use crate::{
  materializer::Materializer,
  runner::AlertRunner,
  sender::Sender,
};

// ─── JobKey ──────────────────────────────────────────────────────────────────

/// The three periodic jobs the engine runs.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum JobKey {
  Materialize,
  DueSoonAlerts,
  OverdueAlerts,
}

impl JobKey {
  pub const ALL: [JobKey; 3] =
    [Self::Materialize, Self::DueSoonAlerts, Self::OverdueAlerts];

  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Materialize => "materialize",
      Self::DueSoonAlerts => "due_soon_alerts",
      Self::OverdueAlerts => "overdue_alerts",
    }
  }
}

impl FromStr for JobKey {
  type Err = UnknownJobKey;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "materialize" => Ok(Self::Materialize),
      "due_soon_alerts" => Ok(Self::DueSoonAlerts),
      "overdue_alerts" => Ok(Self::OverdueAlerts),
      other => Err(UnknownJobKey(other.to_owned())),
    }
  }
}

impl std::fmt::Display for JobKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.discriminant())
  }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown job key: {0:?}")]
pub struct UnknownJobKey(pub String);

// ─── Outcomes and status ─────────────────────────────────────────────────────

/// The condensed result of one job run, kept for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
  /// Items the run acted on: occurrences created for materialisation,
  /// alerts sent for the alert cycles.
  pub processed: usize,
  pub errors:    Vec<String>,
}

/// One job's entry in the status report.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
  pub key:          JobKey,
  pub running:      bool,
  pub last_run:     Option<DateTime<Utc>>,
  pub last_outcome: Option<JobOutcome>,
}

struct JobEntry {
  running: AtomicBool,
  last:    Mutex<Option<(DateTime<Utc>, JobOutcome)>>,
}

impl JobEntry {
  fn new() -> Self {
    Self {
      running: AtomicBool::new(false),
      last:    Mutex::new(None),
    }
  }
}

/// Per-job intervals for the background loops.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerIntervals {
  pub materialize: Duration,
  pub alerts:      Duration,
}

impl Default for SchedulerIntervals {
  fn default() -> Self {
    Self {
      materialize: Duration::from_secs(6 * 60 * 60),
      alerts:      Duration::from_secs(15 * 60),
    }
  }
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

pub struct Scheduler<S, C, N> {
  materializer: Materializer<S, C>,
  runner:       AlertRunner<S, C, N>,
  clock:        Arc<C>,
  intervals:    SchedulerIntervals,
  entries:      HashMap<JobKey, JobEntry>,
  shutdown:     watch::Sender<bool>,
  started:      AtomicBool,
}

impl<S, C, N> Scheduler<S, C, N>
where
  S: LedgerStore + 'static,
  C: Clock + 'static,
  N: Sender + 'static,
{
  pub fn new(
    materializer: Materializer<S, C>,
    runner: AlertRunner<S, C, N>,
    clock: Arc<C>,
    intervals: SchedulerIntervals,
  ) -> Self {
    let entries = JobKey::ALL
      .into_iter()
      .map(|key| (key, JobEntry::new()))
      .collect();
    let (shutdown, _) = watch::channel(false);
    Self {
      materializer,
      runner,
      clock,
      intervals,
      entries,
      shutdown,
      started: AtomicBool::new(false),
    }
  }

  /// Run one job immediately. Returns `None` if the same key is already
  /// running; manual triggers never queue behind a live run.
  pub async fn run_now(&self, key: JobKey) -> Option<JobOutcome> {
    let entry = &self.entries[&key];
    if entry
      .running
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      debug!(%key, "run skipped: already in flight");
      return None;
    }

    let outcome = self.execute(key).await;

    {
      let mut last = entry.last.lock().unwrap_or_else(|e| e.into_inner());
      *last = Some((self.clock.now(), outcome.clone()));
    }
    entry.running.store(false, Ordering::Release);

    Some(outcome)
  }

  async fn execute(&self, key: JobKey) -> JobOutcome {
    match key {
      JobKey::Materialize => {
        let report = self.materializer.run().await;
        JobOutcome {
          processed: report.created,
          errors:    report.errors,
        }
      }
      JobKey::DueSoonAlerts => {
        let report = self.runner.run(PolicyEvent::DueSoon).await;
        JobOutcome {
          processed: report.sent,
          errors:    report.errors,
        }
      }
      JobKey::OverdueAlerts => {
        let report = self.runner.run(PolicyEvent::Overdue).await;
        JobOutcome {
          processed: report.sent,
          errors:    report.errors,
        }
      }
    }
  }

  /// Spawn one background loop per job key. Idempotent while running;
  /// callable again after [`stop_all`](Self::stop_all).
  pub fn start_all(self: &Arc<Self>) {
    if self
      .started
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      warn!("scheduler already started");
      return;
    }
    self.shutdown.send_replace(false);

    for key in JobKey::ALL {
      let interval = match key {
        JobKey::Materialize => self.intervals.materialize,
        JobKey::DueSoonAlerts | JobKey::OverdueAlerts => self.intervals.alerts,
      };
      let scheduler = Arc::clone(self);
      tokio::spawn(async move {
        scheduler.job_loop(key, interval).await;
      });
    }
    info!("scheduler started");
  }

  /// Signal every loop to exit after its current tick. Running jobs finish;
  /// nothing is interrupted mid-write.
  pub fn stop_all(&self) {
    if self
      .started
      .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      return;
    }
    self.shutdown.send_replace(true);
    info!("scheduler stopping");
  }

  pub fn status(&self) -> Vec<JobStatus> {
    JobKey::ALL
      .into_iter()
      .map(|key| {
        let entry = &self.entries[&key];
        let last = entry
          .last
          .lock()
          .unwrap_or_else(|e| e.into_inner())
          .clone();
        let (last_run, last_outcome) = match last {
          Some((at, outcome)) => (Some(at), Some(outcome)),
          None => (None, None),
        };
        JobStatus {
          key,
          running: entry.running.load(Ordering::Acquire),
          last_run,
          last_outcome,
        }
      })
      .collect()
  }

  async fn job_loop(self: Arc<Self>, key: JobKey, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick of `interval` fires immediately, which gives every job
    // an initial run on startup.
    let mut shutdown = self.shutdown.subscribe();

    loop {
      tokio::select! {
        _ = ticker.tick() => {
          self.run_now(key).await;
        }
        _ = shutdown.changed() => {
          if *shutdown.borrow() {
            debug!(%key, "job loop exiting");
            return;
          }
        }
      }
    }
  }
}
