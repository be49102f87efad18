use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::{TargetId, VoteValue, VoterId};

/// A live vote.
///
/// `(target_id, voter_id)` is the identity of a vote: a store holds at most
/// one live `Vote` per pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub target_id: TargetId,
    pub voter_id: VoterId,
    pub value: VoteValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
