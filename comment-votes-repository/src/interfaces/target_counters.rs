//! This module defines the `TargetCounters` trait, the narrow view this subsystem
//! has of the content system's targets.
use comment_votes_shared::types::{Counters, TargetId, VotesDelta};
use uuid::Uuid;
use crate::errors::CounterStoreError;

/// Access to the vote counters of a target owned by the content system.
///
/// Only the aggregate maintainer may call `apply_counter_delta`.
#[async_trait::async_trait]
pub trait TargetCounters: Send + Sync {
    /// Reads the current counters of a target.
    async fn get_counters(&self, target_id: TargetId) -> Result<Counters, CounterStoreError>;

    /// Adds `delta` to the stored counters and rewrites `score` in the same write.
    ///
    /// Implementations must increment relative to the stored values in one
    /// atomic statement, never read, compute in memory and write back.
    ///
    /// A delta is applied at most once per `delta_id`, recorded atomically
    /// with the increment. An attempt whose outcome was lost to a timeout can
    /// therefore be repeated with the same id.
    ///
    /// # Returns
    ///
    /// * `Ok(Counters)` - The counters after the write, or the current
    ///   counters when `delta_id` was already applied
    /// * `Err(CounterStoreError::TargetNotFound)` - The target does not exist
    async fn apply_counter_delta(
        &self,
        target_id: TargetId,
        delta_id: Uuid,
        delta: VotesDelta,
    ) -> Result<Counters, CounterStoreError>;
}
