use std::collections::HashMap;
use async_trait::async_trait;
use chrono::Utc;
use comment_votes_shared::types::{
    CastMode, CastVote, TargetId, Vote, VoteTally, VoteTransition, VoteValue, VoterId,
};
use tokio::sync::Mutex;
use crate::{VoteStore, VoteStoreError};

/// In-memory vote store keyed by `(target_id, voter_id)`.
#[derive(Default)]
pub struct InMemoryVoteStore {
    votes: Mutex<HashMap<(TargetId, VoterId), Vote>>,
}

impl InMemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live votes across all targets.
    pub async fn len(&self) -> usize {
        self.votes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.votes.lock().await.is_empty()
    }
}

#[async_trait]
impl VoteStore for InMemoryVoteStore {
    async fn get_vote(
        &self,
        target_id: TargetId,
        voter_id: VoterId,
    ) -> Result<Option<Vote>, VoteStoreError> {
        Ok(self.votes.lock().await.get(&(target_id, voter_id)).cloned())
    }

    async fn cast_vote(&self, request: &CastVote) -> Result<VoteTransition, VoteStoreError> {
        let now = Utc::now();
        let mut votes = self.votes.lock().await;

        match votes.get_mut(&(request.target_id, request.voter_id)) {
            None => {
                votes.insert(
                    (request.target_id, request.voter_id),
                    Vote {
                        target_id: request.target_id,
                        voter_id: request.voter_id,
                        value: request.value,
                        created_at: now,
                        updated_at: now,
                    },
                );
                Ok(VoteTransition::Created { value: request.value })
            }
            Some(_) if request.mode == CastMode::CreateOnly => Err(VoteStoreError::Conflict {
                target_id: request.target_id,
                voter_id: request.voter_id,
            }),
            Some(existing) => {
                let prior = existing.value;
                existing.value = request.value;
                existing.updated_at = now;
                Ok(VoteTransition::Updated { prior, value: request.value })
            }
        }
    }

    async fn retract_vote(
        &self,
        target_id: TargetId,
        voter_id: VoterId,
    ) -> Result<VoteTransition, VoteStoreError> {
        self.votes
            .lock()
            .await
            .remove(&(target_id, voter_id))
            .map(|vote| VoteTransition::Deleted { prior: vote.value })
            .ok_or(VoteStoreError::NotFound { target_id, voter_id })
    }

    async fn tally(&self, target_id: TargetId) -> Result<VoteTally, VoteStoreError> {
        let votes = self.votes.lock().await;
        let mut tally = VoteTally::default();
        for vote in votes.values().filter(|vote| vote.target_id == target_id) {
            match vote.value {
                VoteValue::Up => tally.upvotes += 1,
                VoteValue::Down => tally.downvotes += 1,
            }
        }
        Ok(tally)
    }
}
