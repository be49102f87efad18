use std::time::Duration;
use comment_votes_shared::types::{ReconciliationRecord, ReconciliationStatus};
use uuid::Uuid;
use crate::errors::ReconciliationLogError;

/// Trait for interacting with the reconciliation log.
///
/// The log keeps the deltas that failed to reach their target after the vote
/// mutation committed, until the reconciliation job resolves them.
#[async_trait::async_trait]
pub trait ReconciliationLog: Send + Sync {
    async fn record(&self, record: &ReconciliationRecord) -> Result<(), ReconciliationLogError>;

    /// Lists up to `limit` pending records, oldest first, whether claimed or not.
    async fn pending(&self, limit: usize) -> Result<Vec<ReconciliationRecord>, ReconciliationLogError>;

    /// Atomically reserves up to `limit` pending records for one pass, oldest first.
    ///
    /// A claimed record is invisible to other claims until it is resolved or
    /// `lease` runs out, so overlapping passes never receive the same record.
    async fn claim(
        &self,
        limit: usize,
        lease: Duration,
    ) -> Result<Vec<ReconciliationRecord>, ReconciliationLogError>;

    async fn resolve(&self, id: Uuid, status: ReconciliationStatus) -> Result<(), ReconciliationLogError>;
}
