//! JSON admin API for Tally.
//!
//! Exposes an axum [`Router`] over the scheduler control surface and the
//! notification audit log, backed by any
//! [`tally_core::store::LedgerStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/admin", tally_api::admin_router(scheduler, store))
//! ```

pub mod error;
pub mod jobs;
pub mod runs;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tally_core::{clock::Clock, store::LedgerStore};
use tally_engine::{scheduler::Scheduler, sender::Sender};

pub use error::ApiError;

/// Shared state behind every admin handler.
pub struct AdminState<S, C, N> {
  pub scheduler: Arc<Scheduler<S, C, N>>,
  pub store:     Arc<S>,
}

// A derived Clone would demand Clone of S, C, and N; only the Arcs are
// cloned.
impl<S, C, N> Clone for AdminState<S, C, N> {
  fn clone(&self) -> Self {
    Self {
      scheduler: Arc::clone(&self.scheduler),
      store:     Arc::clone(&self.store),
    }
  }
}

/// Build a fully-materialised admin router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn admin_router<S, C, N>(
  scheduler: Arc<Scheduler<S, C, N>>,
  store: Arc<S>,
) -> Router<()>
where
  S: LedgerStore + 'static,
  C: Clock + 'static,
  N: Sender + 'static,
{
  Router::new()
    // Jobs
    .route("/jobs", get(jobs::status::<S, C, N>))
    .route("/jobs/start", post(jobs::start::<S, C, N>))
    .route("/jobs/stop", post(jobs::stop::<S, C, N>))
    .route("/jobs/{key}/run", post(jobs::run_one::<S, C, N>))
    // Audit log
    .route("/runs", get(runs::list::<S, C, N>))
    .with_state(AdminState { scheduler, store })
}
