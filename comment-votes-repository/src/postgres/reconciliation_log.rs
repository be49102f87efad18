use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use comment_votes_shared::types::{ReconciliationRecord, ReconciliationStatus, TargetId, VoterId, VotesDelta};
use uuid::Uuid;
use crate::{ReconciliationLog, ReconciliationLogError};

/// PostgreSQL implementation of the reconciliation log, backed by `vote_reconciliation`.
///
/// Claims set `claimed_until` on rows picked with `FOR UPDATE SKIP LOCKED`,
/// so concurrent passes on different connections get disjoint batches.
pub struct PostgresReconciliationLog {
    pool: sqlx::PgPool,
}

#[derive(sqlx::FromRow)]
struct ReconciliationRow {
    id: Uuid,
    target_id: TargetId,
    voter_id: VoterId,
    delta_up: i32,
    delta_down: i32,
    reason: String,
    attempted_at: DateTime<Utc>,
}

impl From<ReconciliationRow> for ReconciliationRecord {
    fn from(row: ReconciliationRow) -> Self {
        ReconciliationRecord {
            id: row.id,
            target_id: row.target_id,
            voter_id: row.voter_id,
            delta: VotesDelta::new(row.delta_up, row.delta_down),
            attempted_at: row.attempted_at,
            reason: row.reason,
        }
    }
}

impl PostgresReconciliationLog {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReconciliationLog for PostgresReconciliationLog {
    async fn record(&self, record: &ReconciliationRecord) -> Result<(), ReconciliationLogError> {
        sqlx::query(
            r#"
            INSERT INTO vote_reconciliation
                (id, target_id, voter_id, delta_up, delta_down, reason, attempted_at, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(record.id)
        .bind(record.target_id)
        .bind(record.voter_id)
        .bind(record.delta.upvotes)
        .bind(record.delta.downvotes)
        .bind(&record.reason)
        .bind(record.attempted_at)
        .bind(ReconciliationStatus::Pending.as_i16())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn pending(&self, limit: usize) -> Result<Vec<ReconciliationRecord>, ReconciliationLogError> {
        let rows = sqlx::query_as::<_, ReconciliationRow>(
            r#"
            SELECT id, target_id, voter_id, delta_up, delta_down, reason, attempted_at
            FROM vote_reconciliation
            WHERE status = $1
            ORDER BY attempted_at
            LIMIT $2
            "#,
        )
        .bind(ReconciliationStatus::Pending.as_i16())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReconciliationRecord::from).collect())
    }

    async fn claim(
        &self,
        limit: usize,
        lease: Duration,
    ) -> Result<Vec<ReconciliationRecord>, ReconciliationLogError> {
        let mut rows = sqlx::query_as::<_, ReconciliationRow>(
            r#"
            UPDATE vote_reconciliation
            SET claimed_until = now() + make_interval(secs => $3)
            WHERE id IN (
                SELECT id
                FROM vote_reconciliation
                WHERE status = $1 AND (claimed_until IS NULL OR claimed_until <= now())
                ORDER BY attempted_at
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, target_id, voter_id, delta_up, delta_down, reason, attempted_at
            "#,
        )
        .bind(ReconciliationStatus::Pending.as_i16())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(lease.as_secs_f64())
        .fetch_all(&self.pool)
        .await?;

        // RETURNING does not keep the subquery's order.
        rows.sort_by_key(|row| row.attempted_at);
        Ok(rows.into_iter().map(ReconciliationRecord::from).collect())
    }

    async fn resolve(&self, id: Uuid, status: ReconciliationStatus) -> Result<(), ReconciliationLogError> {
        let updated = sqlx::query(
            r#"
            UPDATE vote_reconciliation
            SET status = $2, resolved_at = $3, claimed_until = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_i16())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(ReconciliationLogError::RecordNotFound(id));
        }
        Ok(())
    }
}
