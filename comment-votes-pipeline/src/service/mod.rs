//! Vote operations exposed to the content system.
//!
//! Each operation runs in two explicit phases:
//!
//! 1. The vote store commits the mutation in one transaction and returns a
//!    `VoteTransition`.
//! 2. The aggregate maintainer applies the transition's delta to the target.
//!
//! Phase 1 is retried on transient errors but never timed here: the store
//! bounds its own work up to the commit, and the commit itself is awaited, so
//! a reported failure means the vote was not written. Phase 2 runs on its own
//! task, so once the vote is committed the counter update completes (or is
//! recorded for reconciliation) even if the caller goes away.
use std::sync::Arc;
use comment_votes_repository::VoteStore;
use comment_votes_shared::types::{
    Actor, Authority, CastMode, CastVote, TargetId, VoteTransition, VoteValue, VoterId,
};
use tracing::{error, info, instrument};
use uuid::Uuid;
use crate::errors::VoteError;
use crate::maintainer::{compute_vote_delta, AggregateMaintainer, ApplyOutcome};
use crate::retry::RetryPolicy;

/// Whether a cast created a vote or changed an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastKind {
    Created,
    Updated,
}

/// Result of `VoteService::cast_or_update_vote`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastReceipt {
    pub kind: CastKind,
    /// `None` for `CastKind::Created`. Equal to `new_value` for a no-op update.
    pub prior_value: Option<VoteValue>,
    pub new_value: VoteValue,
    /// `ApplyOutcome::Deferred` means the vote was recorded but the tally may be
    /// briefly stale.
    pub tally: ApplyOutcome,
}

/// Result of `VoteService::retract_vote`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetractReceipt {
    pub deleted_value: VoteValue,
    pub tally: ApplyOutcome,
}

/// Entry point for casting, changing and retracting votes.
pub struct VoteService {
    votes: Arc<dyn VoteStore>,
    maintainer: Arc<AggregateMaintainer>,
    retry: RetryPolicy,
}

impl VoteService {
    pub fn new(votes: Arc<dyn VoteStore>, maintainer: Arc<AggregateMaintainer>, retry: RetryPolicy) -> Self {
        Self { votes, maintainer, retry }
    }

    /// Casts a vote of `value` (`1` or `-1`) by `voter_id` on `target_id`.
    ///
    /// When `actor` is the voter, an existing vote is changed in place. An
    /// administrator acting for another voter may only create: an existing
    /// vote is a `Conflict`, as is losing a race against a concurrent create.
    ///
    /// # Errors
    ///
    /// * `VoteError::InvalidValue` - `value` is not `1` or `-1`
    /// * `VoteError::Forbidden` - `actor` has no authority over `voter_id`'s vote
    /// * `VoteError::Conflict` - see above; retry as an update
    /// * `VoteError::Unavailable` - the vote store failed after retries
    #[instrument(skip_all, fields(target_id = %target_id, voter_id = %voter_id, actor_id = %actor.id))]
    pub async fn cast_or_update_vote(
        &self,
        target_id: TargetId,
        voter_id: VoterId,
        value: i16,
        actor: &Actor,
    ) -> Result<CastReceipt, VoteError> {
        let value = VoteValue::try_from(value)?;
        let authority = Self::authorize(actor, voter_id)?;
        let request = CastVote {
            target_id,
            voter_id,
            value,
            mode: match authority {
                Authority::Owner => CastMode::CreateOrUpdate,
                Authority::Override => CastMode::CreateOnly,
            },
        };

        let transition = self.retry.retry(|| self.votes.cast_vote(&request)).await?;
        let tally = self.maintain(target_id, voter_id, transition).await;

        let prior_value = transition.prior_value();
        let kind = if prior_value.is_some() { CastKind::Updated } else { CastKind::Created };
        info!(?kind, ?prior_value, new_value = ?value, degraded = tally.is_degraded(), "Vote cast");

        Ok(CastReceipt { kind, prior_value, new_value: value, tally })
    }

    /// Retracts `voter_id`'s vote on `target_id` and returns the deleted value.
    ///
    /// # Errors
    ///
    /// * `VoteError::Forbidden` - `actor` has no authority over `voter_id`'s vote
    /// * `VoteError::NotFound` - there is no live vote to retract
    /// * `VoteError::Unavailable` - the vote store failed after retries
    #[instrument(skip_all, fields(target_id = %target_id, voter_id = %voter_id, actor_id = %actor.id))]
    pub async fn retract_vote(
        &self,
        target_id: TargetId,
        voter_id: VoterId,
        actor: &Actor,
    ) -> Result<RetractReceipt, VoteError> {
        Self::authorize(actor, voter_id)?;

        let transition = self
            .retry
            .retry(|| self.votes.retract_vote(target_id, voter_id))
            .await?;
        let deleted_value = transition
            .prior_value()
            .ok_or_else(|| VoteError::Unavailable(format!("unexpected retract outcome {transition:?}")))?;
        let tally = self.maintain(target_id, voter_id, transition).await;
        info!(?deleted_value, degraded = tally.is_degraded(), "Vote retracted");

        Ok(RetractReceipt { deleted_value, tally })
    }

    fn authorize(actor: &Actor, voter_id: VoterId) -> Result<Authority, VoteError> {
        actor
            .authority_over(voter_id)
            .ok_or(VoteError::Forbidden { actor_id: actor.id, voter_id })
    }

    /// Phase 2: hands the committed transition to the maintainer on a detached task.
    ///
    /// The delta id is fixed here, so a fallback record for a task that died
    /// after its write landed replays as a no-op.
    async fn maintain(&self, target_id: TargetId, voter_id: VoterId, transition: VoteTransition) -> ApplyOutcome {
        let delta_id = Uuid::new_v4();
        let maintainer = Arc::clone(&self.maintainer);
        let task = tokio::spawn(async move { maintainer.apply(delta_id, target_id, voter_id, transition).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(delta_id = %delta_id, error = %e, "Counter maintenance task failed");
                let delta = compute_vote_delta(&transition);
                let record = self.maintainer.defer(delta_id, target_id, voter_id, delta, e.to_string()).await;
                ApplyOutcome::Deferred(record)
            }
        }
    }
}
