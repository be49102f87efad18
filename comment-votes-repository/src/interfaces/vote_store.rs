//! This module defines the `VoteStore` trait, the authoritative record of live votes.
//! It owns the one-vote-per-(target, voter) invariant and no derived data.
use comment_votes_shared::types::{CastVote, TargetId, Vote, VoteTally, VoteTransition, VoterId};
use crate::errors::VoteStoreError;

/// A trait that defines the interface for the vote store.
///
/// Every mutating method runs as a single logical transaction and returns the
/// committed `VoteTransition`. Implementors must enforce uniqueness of
/// `(target_id, voter_id)` with a unique constraint, a serializable
/// transaction or an equivalent compare-and-swap; a plain read followed by a
/// conditional insert is not enough.
///
/// Callers do not put a timer around these methods. Implementations bound
/// the work that precedes the commit themselves and report
/// `VoteStoreError::TimedOut` only for a transaction that was rolled back;
/// the commit is always awaited, so a committed mutation is never reported
/// as a failure because its acknowledgement was slow.
#[async_trait::async_trait]
pub trait VoteStore: Send + Sync {
    /// Fetches the live vote of `voter_id` on `target_id`, if any.
    async fn get_vote(
        &self,
        target_id: TargetId,
        voter_id: VoterId,
    ) -> Result<Option<Vote>, VoteStoreError>;

    /// Persists a vote.
    ///
    /// # Arguments
    ///
    /// * `request` - The validated vote and the cast mode
    ///
    /// # Returns
    ///
    /// * `Ok(VoteTransition::Created)` - No live vote existed for the pair
    /// * `Ok(VoteTransition::Updated)` - The existing vote was changed in place
    ///   (`CastMode::CreateOrUpdate` only), including no-op updates
    /// * `Err(VoteStoreError::Conflict)` - A vote exists and the mode is
    ///   `CastMode::CreateOnly`, or a concurrent create won the race
    async fn cast_vote(&self, request: &CastVote) -> Result<VoteTransition, VoteStoreError>;

    /// Deletes the live vote of `voter_id` on `target_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(VoteTransition::Deleted)` - Carries the deleted value
    /// * `Err(VoteStoreError::NotFound)` - No live vote exists
    async fn retract_vote(
        &self,
        target_id: TargetId,
        voter_id: VoterId,
    ) -> Result<VoteTransition, VoteStoreError>;

    /// Counts the live votes on a target.
    ///
    /// Used for audits and tests only; counters are never rebuilt from it.
    async fn tally(&self, target_id: TargetId) -> Result<VoteTally, VoteStoreError>;
}
