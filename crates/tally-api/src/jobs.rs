//! Handlers for `/jobs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/jobs` | Status of every job key |
//! | `POST` | `/jobs/start` | Spawn the background loops |
//! | `POST` | `/jobs/stop` | Signal the loops to exit |
//! | `POST` | `/jobs/:key/run` | Trigger one job now; 409 if already running |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde_json::{Value, json};
use tally_core::{clock::Clock, store::LedgerStore};
use tally_engine::{
  scheduler::{JobKey, JobOutcome, JobStatus},
  sender::Sender,
};

use crate::{AdminState, error::ApiError};

/// `GET /jobs`
pub async fn status<S, C, N>(
  State(state): State<AdminState<S, C, N>>,
) -> Json<Vec<JobStatus>>
where
  S: LedgerStore + 'static,
  C: Clock + 'static,
  N: Sender + 'static,
{
  Json(state.scheduler.status())
}

/// `POST /jobs/start`
pub async fn start<S, C, N>(
  State(state): State<AdminState<S, C, N>>,
) -> Json<Value>
where
  S: LedgerStore + 'static,
  C: Clock + 'static,
  N: Sender + 'static,
{
  state.scheduler.start_all();
  Json(json!({ "status": "started" }))
}

/// `POST /jobs/stop`
pub async fn stop<S, C, N>(
  State(state): State<AdminState<S, C, N>>,
) -> Json<Value>
where
  S: LedgerStore + 'static,
  C: Clock + 'static,
  N: Sender + 'static,
{
  state.scheduler.stop_all();
  Json(json!({ "status": "stopping" }))
}

/// `POST /jobs/:key/run` — returns the outcome, or 409 if the key is
/// already in flight.
pub async fn run_one<S, C, N>(
  State(state): State<AdminState<S, C, N>>,
  Path(key): Path<String>,
) -> Result<(StatusCode, Json<JobOutcome>), ApiError>
where
  S: LedgerStore + 'static,
  C: Clock + 'static,
  N: Sender + 'static,
{
  let key: JobKey = key
    .parse()
    .map_err(|e: tally_engine::scheduler::UnknownJobKey| {
      ApiError::BadRequest(e.to_string())
    })?;

  match state.scheduler.run_now(key).await {
    Some(outcome) => Ok((StatusCode::OK, Json(outcome))),
    None => Err(ApiError::Conflict(format!("job {key} is already running"))),
  }
}
