//! Error types for the comment votes application.
//! Consolidates the failures of configuration, start-up and the
//! reconciliation job.
use comment_votes_repository::{CounterStoreError, ReconciliationLogError, VoteStoreError};
use thiserror::Error;

/// Invalid or missing environment configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Failures of a reconciliation pass or an audit.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Reconciliation log error: {0}")]
    Log(#[from] ReconciliationLogError),

    #[error("Vote store error: {0}")]
    Votes(#[from] VoteStoreError),

    #[error("Counter store error: {0}")]
    Counters(#[from] CounterStoreError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Reconciliation error: {0}")]
    Reconciliation(#[from] ReconcileError),

    #[error("Tracing initialization error: {0}")]
    Tracing(String),
}
