use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use comment_votes_shared::types::{ReconciliationRecord, ReconciliationStatus};
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;
use crate::{ReconciliationLog, ReconciliationLogError};

struct Entry {
    record: ReconciliationRecord,
    status: ReconciliationStatus,
    claimed_until: Option<Instant>,
}

impl Entry {
    fn is_pending(&self) -> bool {
        self.status == ReconciliationStatus::Pending
    }

    fn is_claimable(&self, now: Instant) -> bool {
        self.is_pending() && self.claimed_until.is_none_or(|until| until <= now)
    }
}

/// In-memory reconciliation log.
#[derive(Default)]
pub struct InMemoryReconciliationLog {
    records: Mutex<HashMap<Uuid, Entry>>,
}

impl InMemoryReconciliationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn status(&self, id: Uuid) -> Option<ReconciliationStatus> {
        self.records.lock().await.get(&id).map(|entry| entry.status)
    }
}

fn oldest_first(mut records: Vec<ReconciliationRecord>, limit: usize) -> Vec<ReconciliationRecord> {
    records.sort_by_key(|record| record.attempted_at);
    records.truncate(limit);
    records
}

#[async_trait]
impl ReconciliationLog for InMemoryReconciliationLog {
    async fn record(&self, record: &ReconciliationRecord) -> Result<(), ReconciliationLogError> {
        self.records.lock().await.entry(record.id).or_insert_with(|| Entry {
            record: record.clone(),
            status: ReconciliationStatus::Pending,
            claimed_until: None,
        });
        Ok(())
    }

    async fn pending(&self, limit: usize) -> Result<Vec<ReconciliationRecord>, ReconciliationLogError> {
        let records = self.records.lock().await;
        let pending = records
            .values()
            .filter(|entry| entry.is_pending())
            .map(|entry| entry.record.clone())
            .collect();
        Ok(oldest_first(pending, limit))
    }

    async fn claim(
        &self,
        limit: usize,
        lease: Duration,
    ) -> Result<Vec<ReconciliationRecord>, ReconciliationLogError> {
        let now = Instant::now();
        let mut records = self.records.lock().await;
        let claimable = oldest_first(
            records
                .values()
                .filter(|entry| entry.is_claimable(now))
                .map(|entry| entry.record.clone())
                .collect(),
            limit,
        );

        for record in &claimable {
            if let Some(entry) = records.get_mut(&record.id) {
                entry.claimed_until = Some(now + lease);
            }
        }
        Ok(claimable)
    }

    async fn resolve(&self, id: Uuid, status: ReconciliationStatus) -> Result<(), ReconciliationLogError> {
        let mut records = self.records.lock().await;
        let entry = records.get_mut(&id).ok_or(ReconciliationLogError::RecordNotFound(id))?;
        entry.status = status;
        entry.claimed_until = None;
        Ok(())
    }
}
