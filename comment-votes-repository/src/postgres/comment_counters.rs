use async_trait::async_trait;
use chrono::Utc;
use comment_votes_shared::types::{Counters, TargetId, VotesDelta};
use tracing::debug;
use uuid::Uuid;
use crate::{CounterStoreError, TargetCounters};

/// Counters of the `comments` table.
///
/// Deltas are applied with a single relative `UPDATE`; the score expression
/// reads the pre-update column values, so it always equals the new
/// `upvotes - downvotes`. The delta id goes into `applied_vote_deltas` in the
/// same transaction, so a delta whose first commit went unacknowledged is not
/// applied a second time.
pub struct PostgresCommentCounters {
    pool: sqlx::PgPool,
}

impl PostgresCommentCounters {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TargetCounters for PostgresCommentCounters {
    async fn get_counters(&self, target_id: TargetId) -> Result<Counters, CounterStoreError> {
        let row: Option<(i64, i64, i64)> = sqlx::query_as(
            "SELECT upvotes, downvotes, score FROM comments WHERE id = $1",
        )
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(upvotes, downvotes, score)| Counters { upvotes, downvotes, score })
            .ok_or(CounterStoreError::TargetNotFound(target_id))
    }

    async fn apply_counter_delta(
        &self,
        target_id: TargetId,
        delta_id: Uuid,
        delta: VotesDelta,
    ) -> Result<Counters, CounterStoreError> {
        let mut tx = self.pool.begin().await?;

        let marked = sqlx::query(
            r#"
            INSERT INTO applied_vote_deltas (id, target_id, applied_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(delta_id)
        .bind(target_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let row: Option<(i64, i64, i64)> = if marked.rows_affected() == 0 {
            debug!(target_id = %target_id, delta_id = %delta_id, "Delta already applied, skipping");
            sqlx::query_as("SELECT upvotes, downvotes, score FROM comments WHERE id = $1")
                .bind(target_id)
                .fetch_optional(&mut *tx)
                .await?
        } else {
            sqlx::query_as(
                r#"
                UPDATE comments
                SET upvotes = upvotes + $2,
                    downvotes = downvotes + $3,
                    score = (upvotes + $2) - (downvotes + $3)
                WHERE id = $1
                RETURNING upvotes, downvotes, score
                "#,
            )
            .bind(target_id)
            .bind(i64::from(delta.upvotes))
            .bind(i64::from(delta.downvotes))
            .fetch_optional(&mut *tx)
            .await?
        };

        // A missing target rolls back the marker with the transaction.
        let (upvotes, downvotes, score) = row.ok_or(CounterStoreError::TargetNotFound(target_id))?;
        tx.commit().await?;
        Ok(Counters { upvotes, downvotes, score })
    }
}
