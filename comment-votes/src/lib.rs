//! Comment Votes Library
//!
//! This library wires the vote subsystem for a deployment: settings read from
//! the environment, the PostgreSQL-backed stores and service, and the
//! reconciliation job that repairs counters left stale by failed updates.

pub mod config;
pub mod errors;
pub mod reconciler;

pub use config::{Dependencies, LogFormat, Settings};
pub use errors::{AppError, ConfigError, ReconcileError};
pub use reconciler::{DriftReport, ReconcileSummary, Reconciler};
