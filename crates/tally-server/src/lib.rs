//! HTTP layer for Tally.
//!
//! Wires the materialisation engine, the alert runner, and the scheduler
//! into an axum [`Router`] exposing the admin API under `/admin`.

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::Router;
use serde::Deserialize;
use tally_core::{clock::Clock, store::LedgerStore};
use tally_engine::{
  materializer::Materializer,
  runner::AlertRunner,
  scheduler::{Scheduler, SchedulerIntervals},
  sender::Sender,
};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                      String,
  #[serde(default = "default_port")]
  pub port:                      u16,
  #[serde(default = "default_store_path")]
  pub store_path:                PathBuf,
  /// How many days past today materialisation reaches.
  #[serde(default = "default_horizon_days")]
  pub horizon_days:              u32,
  #[serde(default = "default_materialize_interval")]
  pub materialize_interval_secs: u64,
  #[serde(default = "default_alert_interval")]
  pub alert_interval_secs:       u64,
  #[serde(default = "default_send_timeout")]
  pub send_timeout_secs:         u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 7420 }
fn default_store_path() -> PathBuf { PathBuf::from("tally.db") }
fn default_horizon_days() -> u32 {
  tally_engine::materializer::DEFAULT_HORIZON_DAYS
}
fn default_materialize_interval() -> u64 { 6 * 60 * 60 }
fn default_alert_interval() -> u64 { 15 * 60 }
fn default_send_timeout() -> u64 { 10 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                      default_host(),
      port:                      default_port(),
      store_path:                default_store_path(),
      horizon_days:              default_horizon_days(),
      materialize_interval_secs: default_materialize_interval(),
      alert_interval_secs:       default_alert_interval(),
      send_timeout_secs:         default_send_timeout(),
    }
  }
}

// ─── Wiring ──────────────────────────────────────────────────────────────────

/// Assemble the engine stack behind a single scheduler.
pub fn build_scheduler<S, C, N>(
  store: Arc<S>,
  clock: Arc<C>,
  sender: Arc<N>,
  config: &ServerConfig,
) -> Arc<Scheduler<S, C, N>>
where
  S: LedgerStore + 'static,
  C: Clock + 'static,
  N: Sender + 'static,
{
  let materializer = Materializer::new(
    Arc::clone(&store),
    Arc::clone(&clock),
    config.horizon_days,
  );
  let runner = AlertRunner::new(
    store,
    Arc::clone(&clock),
    sender,
    Duration::from_secs(config.send_timeout_secs),
  );
  Arc::new(Scheduler::new(
    materializer,
    runner,
    clock,
    SchedulerIntervals {
      materialize: Duration::from_secs(config.materialize_interval_secs),
      alerts:      Duration::from_secs(config.alert_interval_secs),
    },
  ))
}

/// Build the axum [`Router`] serving the admin API under `/admin`.
pub fn router<S, C, N>(
  scheduler: Arc<Scheduler<S, C, N>>,
  store: Arc<S>,
) -> Router
where
  S: LedgerStore + 'static,
  C: Clock + 'static,
  N: Sender + 'static,
{
  Router::new()
    .nest("/admin", tally_api::admin_router(scheduler, store))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use chrono::{NaiveDate, TimeZone, Utc};
  use tally_core::{
    clock::FixedClock,
    series::{Flow, NewSeries, Recurrence, RecurrenceKind},
    store::LedgerStore,
  };
  use tally_engine::sender::TracingSender;
  use tally_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn make_app() -> (Router, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let clock = Arc::new(FixedClock::at(
      Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    ));
    let sender = Arc::new(TracingSender);
    let scheduler = build_scheduler(
      Arc::clone(&store),
      clock,
      sender,
      &ServerConfig::default(),
    );
    (router(scheduler, Arc::clone(&store)), store)
  }

  async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn jobs_endpoint_lists_all_three_keys() {
    let (app, _store) = make_app().await;
    let resp = app
      .oneshot(
        Request::builder()
          .uri("/admin/jobs")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    let keys: Vec<&str> = json
      .as_array()
      .unwrap()
      .iter()
      .map(|s| s["key"].as_str().unwrap())
      .collect();
    assert_eq!(keys, vec!["materialize", "due_soon_alerts", "overdue_alerts"]);
  }

  #[tokio::test]
  async fn manual_materialize_run_reports_created_occurrences() {
    let (app, store) = make_app().await;
    store
      .create_series(NewSeries {
        organization_id:    Uuid::new_v4(),
        owner_id:           Uuid::new_v4(),
        pay_to_id:          None,
        title:              "Rent".into(),
        amount_cents:       120_000,
        flow:               Flow::Expense,
        category_id:        None,
        start_date:         NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        recurrence:         Recurrence {
          kind:     RecurrenceKind::Monthly,
          interval: 1,
        },
        installments_total: Some(2),
        recurrence_until:   None,
      })
      .await
      .unwrap();

    let resp = app
      .oneshot(
        Request::builder()
          .method("POST")
          .uri("/admin/jobs/materialize/run")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["processed"], 2);
  }

  #[tokio::test]
  async fn unknown_job_key_is_a_bad_request() {
    let (app, _store) = make_app().await;
    let resp = app
      .oneshot(
        Request::builder()
          .method("POST")
          .uri("/admin/jobs/defragment/run")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn runs_endpoint_starts_empty() {
    let (app, _store) = make_app().await;
    let resp = app
      .oneshot(
        Request::builder()
          .uri("/admin/runs?limit=10")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, serde_json::json!([]));
  }
}
