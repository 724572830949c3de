//! Handler for the `/runs` audit-log endpoint.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use tally_core::{clock::Clock, notification::NotificationRun, store::LedgerStore};
use tally_engine::sender::Sender;

use crate::{AdminState, error::ApiError};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Maximum entries to return, newest first. Capped at 500.
  pub limit: Option<usize>,
}

/// `GET /runs[?limit=50]`
pub async fn list<S, C, N>(
  State(state): State<AdminState<S, C, N>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<NotificationRun>>, ApiError>
where
  S: LedgerStore + 'static,
  C: Clock + 'static,
  N: Sender + 'static,
{
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
  let runs = state
    .store
    .list_recent_runs(limit)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(runs))
}
