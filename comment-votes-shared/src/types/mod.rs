mod actor;
mod counters;
mod reconciliation;
mod transition;
mod vote;
mod vote_value;
mod votes_delta;

pub use actor::{Actor, Authority, Capability};
pub use counters::{Counters, VoteTally};
pub use reconciliation::{ReconciliationRecord, ReconciliationStatus};
pub use transition::{CastMode, CastVote, VoteTransition};
pub use vote::Vote;
pub use vote_value::{InvalidVoteValue, VoteValue};
pub use votes_delta::VotesDelta;

use uuid::Uuid;

/// Identifier of the entity whose counters are maintained (a comment).
pub type TargetId = Uuid;
/// Identifier of the authenticated identity casting a vote.
pub type VoterId = Uuid;
