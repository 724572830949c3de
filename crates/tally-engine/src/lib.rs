//! The tally background engine: series materialisation, alert evaluation,
//! and the job scheduler that drives both.
//!
//! Everything here is constructed with injected dependencies — a
//! [`tally_core::store::LedgerStore`], a [`tally_core::clock::Clock`], and a
//! [`sender::Sender`] — so each component can be tested in isolation against
//! an in-memory store and a fixed clock.

pub mod error;
pub mod materializer;
pub mod message;
pub mod runner;
pub mod scheduler;
pub mod sender;

pub use error::{Error, Result};
