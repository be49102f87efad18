use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The value of a single vote.
///
/// Stored as `+1` / `-1`. Any other raw value is rejected before it reaches a store.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "i16", into = "i16")]
pub enum VoteValue {
    /// An upvote, stored as `+1`.
    Up,
    /// A downvote, stored as `-1`.
    Down,
}

/// Raised when a raw value is neither `+1` nor `-1`.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("Invalid vote value: {0} (expected 1 or -1)")]
pub struct InvalidVoteValue(pub i16);

impl VoteValue {
    pub fn as_i16(self) -> i16 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl TryFrom<i16> for VoteValue {
    type Error = InvalidVoteValue;

    fn try_from(raw: i16) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            other => Err(InvalidVoteValue(other)),
        }
    }
}

impl From<VoteValue> for i16 {
    fn from(value: VoteValue) -> Self {
        value.as_i16()
    }
}
