use comment_votes_shared::types::{VoteTransition, VoteValue, VotesDelta};

/// Computes the counter delta of a committed vote transition.
///
/// The result depends only on the transition, never on the current counters.
/// Updates that keep the same value yield `VotesDelta::ZERO`.
pub fn compute_vote_delta(transition: &VoteTransition) -> VotesDelta {
    match *transition {
        VoteTransition::Created { value: VoteValue::Up } => VotesDelta::new(1, 0),
        VoteTransition::Created { value: VoteValue::Down } => VotesDelta::new(0, 1),
        VoteTransition::Updated { prior: VoteValue::Up, value: VoteValue::Down } => VotesDelta::new(-1, 1),
        VoteTransition::Updated { prior: VoteValue::Down, value: VoteValue::Up } => VotesDelta::new(1, -1),
        VoteTransition::Updated { .. } => VotesDelta::ZERO,
        VoteTransition::Deleted { prior: VoteValue::Up } => VotesDelta::new(-1, 0),
        VoteTransition::Deleted { prior: VoteValue::Down } => VotesDelta::new(0, -1),
    }
}
