use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::types::{TargetId, VoterId, VotesDelta};

/// A delta that could not be applied to its target after the originating vote
/// mutation had already committed.
///
/// The record is the intent to re-apply `delta` out of band. `id` is the
/// delta's own id: counter stores apply a given id at most once, so replaying
/// a record whose first attempt did land is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconciliationRecord {
    pub id: Uuid,
    pub target_id: TargetId,
    pub voter_id: VoterId,
    pub delta: VotesDelta,
    pub attempted_at: DateTime<Utc>,
    pub reason: String,
}

impl ReconciliationRecord {
    pub fn new(target_id: TargetId, voter_id: VoterId, delta: VotesDelta, reason: impl Into<String>) -> Self {
        Self::for_delta(Uuid::new_v4(), target_id, voter_id, delta, reason)
    }

    /// A record for the delta whose apply attempts used `delta_id`.
    pub fn for_delta(
        delta_id: Uuid,
        target_id: TargetId,
        voter_id: VoterId,
        delta: VotesDelta,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: delta_id,
            target_id,
            voter_id,
            delta,
            attempted_at: Utc::now(),
            reason: reason.into(),
        }
    }
}

/// Where a reconciliation record is in its repair lifecycle.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReconciliationStatus {
    /// Waiting for the reconciliation job.
    Pending,
    /// The delta was re-applied to the target.
    Applied,
    /// The target no longer exists; nothing left to repair.
    Abandoned,
}

impl ReconciliationStatus {
    pub fn as_i16(self) -> i16 {
        match self {
            ReconciliationStatus::Pending => 0,
            ReconciliationStatus::Applied => 1,
            ReconciliationStatus::Abandoned => 2,
        }
    }
}
