use serde::{Deserialize, Serialize};

/// The change to apply to a target's counters for one vote transition.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VotesDelta {
    pub upvotes: i32,
    pub downvotes: i32,
}

impl VotesDelta {
    pub const ZERO: VotesDelta = VotesDelta { upvotes: 0, downvotes: 0 };

    pub fn new(upvotes: i32, downvotes: i32) -> Self {
        Self { upvotes, downvotes }
    }

    /// A zero delta never produces a counter write.
    pub fn is_zero(&self) -> bool {
        self.upvotes == 0 && self.downvotes == 0
    }
}
