//! Error types for the target counters.
use std::time::Duration;
use comment_votes_shared::types::TargetId;
use thiserror::Error;
use crate::errors::{classify_sqlx_error, AttemptTimeout, SqlxErrorClass, TransientError};

/// Represents errors raised while reading or applying a target's counters.
#[derive(Debug, Error)]
pub enum CounterStoreError {
    #[error("Target not found: {0}")]
    TargetNotFound(TargetId),

    #[error("Store busy: {0}")]
    Busy(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The write may or may not have landed.
    #[error("Counter write timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for CounterStoreError {
    fn from(error: sqlx::Error) -> Self {
        match classify_sqlx_error(&error) {
            SqlxErrorClass::Busy => CounterStoreError::Busy(error.to_string()),
            SqlxErrorClass::Unavailable => CounterStoreError::Unavailable(error.to_string()),
            SqlxErrorClass::UniqueViolation | SqlxErrorClass::Other => CounterStoreError::Database(error),
        }
    }
}

impl TransientError for CounterStoreError {
    fn is_transient(&self) -> bool {
        matches!(self, CounterStoreError::Busy(_))
    }
}

impl AttemptTimeout for CounterStoreError {
    fn timed_out(after: Duration) -> Self {
        CounterStoreError::TimedOut(after)
    }
}
