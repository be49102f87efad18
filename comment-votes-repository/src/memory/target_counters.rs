use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use comment_votes_shared::types::{Counters, TargetId, VotesDelta};
use tokio::sync::Mutex;
use uuid::Uuid;
use crate::{CounterStoreError, TargetCounters};

#[derive(Default)]
struct CountersState {
    targets: HashMap<TargetId, Counters>,
    applied: HashSet<Uuid>,
}

/// In-memory stand-in for the content system's counters.
///
/// Targets must be registered before votes are applied to them, mirroring
/// targets that are created and destroyed by the content system.
#[derive(Default)]
pub struct InMemoryTargetCounters {
    state: Mutex<CountersState>,
    writes: AtomicUsize,
}

impl InMemoryTargetCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_target(&self, target_id: TargetId) {
        self.state.lock().await.targets.entry(target_id).or_default();
    }

    pub async fn remove_target(&self, target_id: TargetId) {
        self.state.lock().await.targets.remove(&target_id);
    }

    /// Number of counter writes since creation; repeated delta ids are not counted.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TargetCounters for InMemoryTargetCounters {
    async fn get_counters(&self, target_id: TargetId) -> Result<Counters, CounterStoreError> {
        self.state
            .lock()
            .await
            .targets
            .get(&target_id)
            .copied()
            .ok_or(CounterStoreError::TargetNotFound(target_id))
    }

    async fn apply_counter_delta(
        &self,
        target_id: TargetId,
        delta_id: Uuid,
        delta: VotesDelta,
    ) -> Result<Counters, CounterStoreError> {
        let mut state = self.state.lock().await;
        let CountersState { targets, applied } = &mut *state;
        let counters = targets
            .get_mut(&target_id)
            .ok_or(CounterStoreError::TargetNotFound(target_id))?;

        if applied.insert(delta_id) {
            *counters = counters.with_delta(delta);
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(*counters)
    }
}
