use serde::{Deserialize, Serialize};
use crate::types::{TargetId, VoteValue, VoterId};

/// How a store must treat an existing vote when casting.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CastMode {
    /// Optimistic create: an existing vote for the pair is a conflict.
    CreateOnly,
    /// Create the vote, or change the value of the existing one in place.
    CreateOrUpdate,
}

/// A request to persist a vote, already validated and authorized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastVote {
    pub target_id: TargetId,
    pub voter_id: VoterId,
    pub value: VoteValue,
    pub mode: CastMode,
}

/// The lifecycle outcome of a committed vote mutation.
///
/// Returned by the vote store once its transaction has committed. It carries
/// the prior value so the counter delta never has to be re-derived from the
/// counters themselves.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoteTransition {
    Created { value: VoteValue },
    Updated { prior: VoteValue, value: VoteValue },
    Deleted { prior: VoteValue },
}

impl VoteTransition {
    /// The value held before the mutation, if any.
    pub fn prior_value(&self) -> Option<VoteValue> {
        match self {
            VoteTransition::Created { .. } => None,
            VoteTransition::Updated { prior, .. } | VoteTransition::Deleted { prior } => Some(*prior),
        }
    }
}
