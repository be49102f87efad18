//! This module defines the `AggregateMaintainer`, the only writer of a target's
//! `upvotes`, `downvotes` and `score`.
//!
//! Counters are an accumulator of deltas: every committed vote transition adds
//! its delta to the stored values, and nothing here ever rebuilds them from the
//! set of votes.
//!
//! Each delta carries an id that the counter store applies at most once. A
//! write that times out may still have landed, so the deferred record keeps
//! the same id and its replay cannot count the vote twice.
mod delta;

pub use delta::compute_vote_delta;

use std::sync::Arc;
use comment_votes_repository::{CounterStoreError, ReconciliationLog, TargetCounters};
use comment_votes_shared::types::{
    Counters, ReconciliationRecord, TargetId, VoteTransition, VoterId, VotesDelta,
};
use tracing::{debug, error, warn};
use uuid::Uuid;
use crate::retry::RetryPolicy;

/// What happened to the counters after a vote transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The transition had a zero delta; no counter write was issued.
    Skipped,
    /// The delta was applied; carries the counters after the write.
    Applied(Counters),
    /// The delta could not be applied and was recorded for reconciliation.
    /// The vote itself is committed; the tally is stale until repaired.
    Deferred(ReconciliationRecord),
}

impl ApplyOutcome {
    /// True when the vote was recorded but the target's counters lag behind it.
    pub fn is_degraded(&self) -> bool {
        matches!(self, ApplyOutcome::Deferred(_))
    }
}

/// Applies vote transitions to target counters.
pub struct AggregateMaintainer {
    counters: Arc<dyn TargetCounters>,
    reconciliation: Arc<dyn ReconciliationLog>,
    retry: RetryPolicy,
}

impl AggregateMaintainer {
    pub fn new(
        counters: Arc<dyn TargetCounters>,
        reconciliation: Arc<dyn ReconciliationLog>,
        retry: RetryPolicy,
    ) -> Self {
        Self { counters, reconciliation, retry }
    }

    /// Applies the delta of a committed `transition` to `target_id`'s counters
    /// under `delta_id`.
    ///
    /// A zero delta is skipped without touching the store. A failed write is
    /// not retried beyond the standard write policy: the delta is written to
    /// the reconciliation log and `ApplyOutcome::Deferred` is returned, since
    /// the vote mutation it belongs to has already committed.
    pub async fn apply(
        &self,
        delta_id: Uuid,
        target_id: TargetId,
        voter_id: VoterId,
        transition: VoteTransition,
    ) -> ApplyOutcome {
        let delta = compute_vote_delta(&transition);
        if delta.is_zero() {
            debug!(target_id = %target_id, voter_id = %voter_id, "Zero delta, skipping counter write");
            return ApplyOutcome::Skipped;
        }

        match self
            .retry
            .run(|| self.counters.apply_counter_delta(target_id, delta_id, delta))
            .await
        {
            Ok(counters) => {
                debug!(
                    target_id = %target_id,
                    delta_id = %delta_id,
                    upvotes = counters.upvotes,
                    downvotes = counters.downvotes,
                    score = counters.score,
                    "Applied vote delta"
                );
                ApplyOutcome::Applied(counters)
            }
            Err(e) => {
                let reason = e.to_string();
                ApplyOutcome::Deferred(self.defer(delta_id, target_id, voter_id, delta, reason).await)
            }
        }
    }

    /// Records `delta` for out-of-band repair and returns the record, whose id
    /// is `delta_id`.
    ///
    /// The record is always emitted as a `warn!` event, so it survives in the
    /// logs even when the reconciliation log itself cannot be written.
    pub async fn defer(
        &self,
        delta_id: Uuid,
        target_id: TargetId,
        voter_id: VoterId,
        delta: VotesDelta,
        reason: String,
    ) -> ReconciliationRecord {
        let record = ReconciliationRecord::for_delta(delta_id, target_id, voter_id, delta, reason);
        warn!(
            reconciliation_id = %record.id,
            target_id = %record.target_id,
            voter_id = %record.voter_id,
            delta_up = record.delta.upvotes,
            delta_down = record.delta.downvotes,
            attempted_at = %record.attempted_at,
            reason = %record.reason,
            "Counter update failed after vote commit, recording for reconciliation"
        );

        if let Err(e) = self.reconciliation.record(&record).await {
            error!(
                reconciliation_id = %record.id,
                error = %e,
                "Failed to persist reconciliation record"
            );
        }
        record
    }

    /// Re-applies the delta of a reconciliation record.
    ///
    /// The record id is the delta id, so a delta that already landed is not
    /// applied again. Used by the reconciliation job only; the record is not
    /// resolved here.
    pub async fn replay(&self, record: &ReconciliationRecord) -> Result<Counters, CounterStoreError> {
        if record.delta.is_zero() {
            return self.counters.get_counters(record.target_id).await;
        }
        self.retry
            .run(|| self.counters.apply_counter_delta(record.target_id, record.id, record.delta))
            .await
    }

    /// Reads the current counters of a target.
    pub async fn counters(&self, target_id: TargetId) -> Result<Counters, CounterStoreError> {
        self.counters.get_counters(target_id).await
    }
}
