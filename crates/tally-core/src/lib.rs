//! Core types and trait definitions for the tally recurring-finance engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod clock;
pub mod dedup;
pub mod eligibility;
pub mod error;
pub mod goal;
pub mod notification;
pub mod occurrence;
pub mod policy;
pub mod recurrence;
pub mod series;
pub mod status;
pub mod store;

pub use error::{Error, Result};
