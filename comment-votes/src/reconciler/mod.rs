//! Reconciliation job.
//!
//! Replays the counter deltas that failed after their vote had committed, and
//! audits a target's counters against its live votes.

use std::sync::Arc;
use std::time::Duration;

use comment_votes_pipeline::AggregateMaintainer;
use comment_votes_repository::{CounterStoreError, ReconciliationLog, VoteStore};
use comment_votes_shared::types::{Counters, ReconciliationStatus, TargetId, VoteTally};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::ReconcileError;

/// Counts of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub applied: usize,
    pub abandoned: usize,
    /// Records left pending for the next pass.
    pub failed: usize,
}

impl ReconcileSummary {
    pub fn total(&self) -> usize {
        self.applied + self.abandoned + self.failed
    }
}

/// Stored counters of a target next to a fresh tally of its live votes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftReport {
    pub target_id: TargetId,
    pub counters: Counters,
    pub tally: VoteTally,
}

impl DriftReport {
    pub fn is_drifted(&self) -> bool {
        !self.counters.matches(&self.tally)
    }
}

pub struct Reconciler {
    log: Arc<dyn ReconciliationLog>,
    maintainer: Arc<AggregateMaintainer>,
    votes: Arc<dyn VoteStore>,
    batch_size: usize,
    claim_lease: Duration,
}

impl Reconciler {
    pub fn new(
        log: Arc<dyn ReconciliationLog>,
        maintainer: Arc<AggregateMaintainer>,
        votes: Arc<dyn VoteStore>,
        batch_size: usize,
        claim_lease: Duration,
    ) -> Self {
        Self { log, maintainer, votes, batch_size, claim_lease }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Claims up to `batch_size` pending records for `claim_lease` and replays
    /// them, oldest first. Passes running at the same time claim disjoint
    /// batches; a record left unresolved becomes claimable again once its
    /// lease expires.
    ///
    /// A record whose delta lands is marked applied. A record whose target no
    /// longer exists is marked abandoned. Any other failure leaves the record
    /// pending for the next pass.
    ///
    /// Replaying a record twice is harmless: its id is the delta id, which the
    /// counter store applies at most once.
    ///
    /// # Errors
    ///
    /// * `ReconcileError::Log` - the pending records cannot be claimed
    #[instrument(skip_all, fields(batch_size = self.batch_size))]
    pub async fn run_once(&self) -> Result<ReconcileSummary, ReconcileError> {
        let records = self.log.claim(self.batch_size, self.claim_lease).await?;
        let mut summary = ReconcileSummary::default();

        for record in records {
            let status = match self.maintainer.replay(&record).await {
                Ok(counters) => {
                    debug!(
                        reconciliation_id = %record.id,
                        target_id = %record.target_id,
                        upvotes = counters.upvotes,
                        downvotes = counters.downvotes,
                        score = counters.score,
                        "Replayed vote delta"
                    );
                    ReconciliationStatus::Applied
                }
                Err(CounterStoreError::TargetNotFound(target_id)) => {
                    warn!(
                        reconciliation_id = %record.id,
                        target_id = %target_id,
                        "Target no longer exists, abandoning reconciliation record"
                    );
                    ReconciliationStatus::Abandoned
                }
                Err(e) => {
                    warn!(
                        reconciliation_id = %record.id,
                        target_id = %record.target_id,
                        error = %e,
                        "Replay failed, record stays pending"
                    );
                    summary.failed += 1;
                    continue;
                }
            };

            if let Err(e) = self.log.resolve(record.id, status).await {
                error!(
                    reconciliation_id = %record.id,
                    status = ?status,
                    error = %e,
                    "Failed to resolve reconciliation record"
                );
                summary.failed += 1;
                continue;
            }

            match status {
                ReconciliationStatus::Applied => summary.applied += 1,
                _ => summary.abandoned += 1,
            }
        }

        if summary.total() > 0 {
            info!(
                applied = summary.applied,
                abandoned = summary.abandoned,
                failed = summary.failed,
                "Reconciliation pass complete"
            );
        }
        Ok(summary)
    }

    /// Runs a pass every `interval` until `shutdown` fires.
    ///
    /// A failed pass is logged and retried on the next tick.
    pub async fn run(&self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(interval_secs = interval.as_secs(), "Reconciler started");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Reconciler received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!(error = %e, "Reconciliation pass failed");
                    }
                }
            }
        }
    }

    /// Compares `target_id`'s counters with a fresh tally of its live votes.
    ///
    /// Never writes; drift is reported, not repaired.
    pub async fn audit_target(&self, target_id: TargetId) -> Result<DriftReport, ReconcileError> {
        let tally = self.votes.tally(target_id).await?;
        let counters = self.maintainer.counters(target_id).await?;
        let report = DriftReport { target_id, counters, tally };

        if report.is_drifted() {
            warn!(
                target_id = %target_id,
                upvotes = counters.upvotes,
                downvotes = counters.downvotes,
                live_upvotes = tally.upvotes,
                live_downvotes = tally.downvotes,
                "Counter drift detected"
            );
        }
        Ok(report)
    }
}
