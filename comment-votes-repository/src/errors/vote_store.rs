//! Error types for the vote store.
use std::time::Duration;
use comment_votes_shared::types::{InvalidVoteValue, TargetId, VoterId};
use thiserror::Error;
use crate::errors::{classify_sqlx_error, SqlxErrorClass, TransientError};

/// Represents errors that can occur within the vote store.
#[derive(Debug, Error)]
pub enum VoteStoreError {
    /// A live vote already exists for the pair, or a concurrent create won the race.
    #[error("Vote already exists for voter {voter_id} on target {target_id}")]
    Conflict { target_id: TargetId, voter_id: VoterId },

    #[error("No vote from voter {voter_id} on target {target_id}")]
    NotFound { target_id: TargetId, voter_id: VoterId },

    /// A stored row holds a value outside `{+1, -1}`.
    #[error("Corrupt vote row: {0}")]
    InvalidVoteValue(#[from] InvalidVoteValue),

    /// The transaction was rolled back by the database and may be retried.
    #[error("Store busy: {0}")]
    Busy(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The write did not reach its commit in time and was rolled back.
    #[error("Store write timed out before commit after {0:?}")]
    TimedOut(Duration),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for VoteStoreError {
    fn from(error: sqlx::Error) -> Self {
        match classify_sqlx_error(&error) {
            // Unique violations outside the guarded insert carry no pair; surface them raw.
            SqlxErrorClass::UniqueViolation | SqlxErrorClass::Other => VoteStoreError::Database(error),
            SqlxErrorClass::Busy => VoteStoreError::Busy(error.to_string()),
            SqlxErrorClass::Unavailable => VoteStoreError::Unavailable(error.to_string()),
        }
    }
}

impl TransientError for VoteStoreError {
    fn is_transient(&self) -> bool {
        matches!(self, VoteStoreError::Busy(_) | VoteStoreError::TimedOut(_))
    }
}
