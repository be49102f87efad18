use serde::{Deserialize, Serialize};
use crate::types::VotesDelta;

/// Denormalized vote counters stored on a target.
///
/// `score` is stored explicitly and always written together with the other two.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counters {
    pub upvotes: i64,
    pub downvotes: i64,
    pub score: i64,
}

impl Counters {
    pub fn new(upvotes: i64, downvotes: i64) -> Self {
        Self { upvotes, downvotes, score: upvotes - downvotes }
    }

    /// Returns the counters with `delta` added and the score recomputed from the result.
    pub fn with_delta(&self, delta: VotesDelta) -> Self {
        Self::new(
            self.upvotes + i64::from(delta.upvotes),
            self.downvotes + i64::from(delta.downvotes),
        )
    }

    /// True when the counters agree with a tally of live votes.
    pub fn matches(&self, tally: &VoteTally) -> bool {
        self.upvotes == tally.upvotes
            && self.downvotes == tally.downvotes
            && self.score == tally.upvotes - tally.downvotes
    }
}

/// Counts of live votes on a target, taken directly from the vote store.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}
