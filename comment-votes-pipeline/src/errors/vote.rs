//! Error types returned by the vote operations.
//! Maps store failures onto the taxonomy callers act upon.
use comment_votes_repository::VoteStoreError;
use comment_votes_shared::types::{InvalidVoteValue, TargetId, VoterId};
use thiserror::Error;

/// Represents errors returned by `VoteService`.
///
/// `InvalidValue` and `Forbidden` are raised before any write. `Conflict`
/// means a vote already exists for the pair: the caller re-reads and retries
/// as an update.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Invalid vote value: {0}")]
    InvalidValue(i16),

    #[error("Actor {actor_id} may not act on votes of voter {voter_id}")]
    Forbidden { actor_id: VoterId, voter_id: VoterId },

    #[error("Voter {voter_id} already has a vote on target {target_id}")]
    Conflict { target_id: TargetId, voter_id: VoterId },

    #[error("No vote from voter {voter_id} on target {target_id}")]
    NotFound { target_id: TargetId, voter_id: VoterId },

    #[error("Vote store unavailable: {0}")]
    Unavailable(String),

    #[error("Vote store error: {0}")]
    Store(#[source] VoteStoreError),
}

impl From<InvalidVoteValue> for VoteError {
    fn from(error: InvalidVoteValue) -> Self {
        VoteError::InvalidValue(error.0)
    }
}

impl From<VoteStoreError> for VoteError {
    fn from(error: VoteStoreError) -> Self {
        match error {
            VoteStoreError::Conflict { target_id, voter_id } => VoteError::Conflict { target_id, voter_id },
            VoteStoreError::NotFound { target_id, voter_id } => VoteError::NotFound { target_id, voter_id },
            // Retries are exhausted by the time a busy or timed out store reaches the caller.
            VoteStoreError::Busy(_) | VoteStoreError::Unavailable(_) | VoteStoreError::TimedOut(_) => {
                VoteError::Unavailable(error.to_string())
            }
            other => VoteError::Store(other),
        }
    }
}
