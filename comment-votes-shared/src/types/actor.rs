use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use crate::types::VoterId;

/// A capability granted to an authenticated identity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// May cast, change and retract its own votes.
    Own,
    /// May act on votes belonging to other voters. Does not bypass uniqueness.
    AdminOverride,
}

/// The identity performing a vote operation and its capabilities.
///
/// Resolved once per request by the caller and passed explicitly into every
/// operation; nothing in this subsystem reads roles from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: VoterId,
    pub capabilities: BTreeSet<Capability>,
}

/// The authority under which an actor is allowed to touch a voter's vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Authority {
    /// The actor is the voter.
    Owner,
    /// The actor acts on someone else's vote through `AdminOverride`.
    Override,
}

impl Actor {
    pub fn new(id: VoterId, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self { id, capabilities: capabilities.into_iter().collect() }
    }

    /// A regular authenticated voter.
    pub fn voter(id: VoterId) -> Self {
        Self::new(id, [Capability::Own])
    }

    /// An administrator, who may also vote as themselves.
    pub fn admin(id: VoterId) -> Self {
        Self::new(id, [Capability::Own, Capability::AdminOverride])
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Resolves the authority this actor holds over `voter_id`'s vote, if any.
    pub fn authority_over(&self, voter_id: VoterId) -> Option<Authority> {
        if self.id == voter_id && self.has(Capability::Own) {
            Some(Authority::Owner)
        } else if self.has(Capability::AdminOverride) {
            Some(Authority::Override)
        } else {
            None
        }
    }
}
