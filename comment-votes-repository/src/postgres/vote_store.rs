//! PostgreSQL implementation of the vote store.
//!
//! Uniqueness of `(target_id, voter_id)` is enforced by the primary key of
//! `comment_votes`. Casting runs in one transaction: the existing row is locked
//! with `SELECT ... FOR UPDATE`, and a missing row is created with
//! `INSERT ... ON CONFLICT DO NOTHING`. When two first votes race, the loser's
//! insert waits for the winner to commit and then affects zero rows, which is
//! reported as `VoteStoreError::Conflict`.
//!
//! Only the work before `COMMIT` runs under `write_timeout`. Hitting the
//! deadline drops the open transaction, which rolls it back, so
//! `VoteStoreError::TimedOut` always means nothing was written. The commit
//! itself is awaited without a deadline.
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use comment_votes_shared::types::{
    CastMode, CastVote, TargetId, Vote, VoteTally, VoteTransition, VoteValue, VoterId,
};
use sqlx::{Postgres, Transaction};
use tracing::debug;
use crate::{VoteStore, VoteStoreError};

/// PostgreSQL implementation of the vote store.
pub struct PostgresVoteStore {
    pool: sqlx::PgPool,
    write_timeout: Duration,
}

type Staged = (Transaction<'static, Postgres>, VoteTransition);

#[derive(sqlx::FromRow)]
struct VoteRow {
    target_id: TargetId,
    voter_id: VoterId,
    value: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = VoteStoreError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(Vote {
            target_id: row.target_id,
            voter_id: row.voter_id,
            value: VoteValue::try_from(row.value)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PostgresVoteStore {
    /// Creates a new vote store on a pool whose schema has been migrated.
    ///
    /// `write_timeout` bounds each write up to, but not including, its commit.
    pub fn new(pool: sqlx::PgPool, write_timeout: Duration) -> Self {
        Self { pool, write_timeout }
    }

    async fn before_deadline<F>(&self, stage: F) -> Result<Staged, VoteStoreError>
    where
        F: Future<Output = Result<Staged, VoteStoreError>>,
    {
        match tokio::time::timeout(self.write_timeout, stage).await {
            Ok(staged) => staged,
            Err(_) => {
                debug!(timeout_ms = self.write_timeout.as_millis() as u64, "Vote write rolled back at deadline");
                Err(VoteStoreError::TimedOut(self.write_timeout))
            }
        }
    }

    /// Runs a cast up to its commit and hands back the open transaction.
    async fn stage_cast(&self, request: &CastVote) -> Result<Staged, VoteStoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let existing: Option<i16> = sqlx::query_scalar(
            r#"
            SELECT value
            FROM comment_votes
            WHERE target_id = $1 AND voter_id = $2
            FOR UPDATE
            "#,
        )
        .bind(request.target_id)
        .bind(request.voter_id)
        .fetch_optional(&mut *tx)
        .await?;

        let transition = match existing {
            None => {
                let inserted = sqlx::query(
                    r#"
                    INSERT INTO comment_votes (target_id, voter_id, value, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $4)
                    ON CONFLICT (target_id, voter_id) DO NOTHING
                    "#,
                )
                .bind(request.target_id)
                .bind(request.voter_id)
                .bind(request.value.as_i16())
                .bind(now)
                .execute(&mut *tx)
                .await?;

                if inserted.rows_affected() == 0 {
                    debug!(
                        target_id = %request.target_id,
                        voter_id = %request.voter_id,
                        "Concurrent create won the insert race"
                    );
                    return Err(VoteStoreError::Conflict {
                        target_id: request.target_id,
                        voter_id: request.voter_id,
                    });
                }
                VoteTransition::Created { value: request.value }
            }
            Some(_) if request.mode == CastMode::CreateOnly => {
                return Err(VoteStoreError::Conflict {
                    target_id: request.target_id,
                    voter_id: request.voter_id,
                });
            }
            Some(raw) => {
                let prior = VoteValue::try_from(raw)?;
                sqlx::query(
                    r#"
                    UPDATE comment_votes
                    SET value = $3, updated_at = $4
                    WHERE target_id = $1 AND voter_id = $2
                    "#,
                )
                .bind(request.target_id)
                .bind(request.voter_id)
                .bind(request.value.as_i16())
                .bind(now)
                .execute(&mut *tx)
                .await?;
                VoteTransition::Updated { prior, value: request.value }
            }
        };

        Ok((tx, transition))
    }

    async fn stage_retract(&self, target_id: TargetId, voter_id: VoterId) -> Result<Staged, VoteStoreError> {
        let mut tx = self.pool.begin().await?;
        let deleted: Option<i16> = sqlx::query_scalar(
            r#"
            DELETE FROM comment_votes
            WHERE target_id = $1 AND voter_id = $2
            RETURNING value
            "#,
        )
        .bind(target_id)
        .bind(voter_id)
        .fetch_optional(&mut *tx)
        .await?;

        match deleted {
            Some(raw) => Ok((tx, VoteTransition::Deleted { prior: VoteValue::try_from(raw)? })),
            None => Err(VoteStoreError::NotFound { target_id, voter_id }),
        }
    }
}

#[async_trait]
impl VoteStore for PostgresVoteStore {
    async fn get_vote(
        &self,
        target_id: TargetId,
        voter_id: VoterId,
    ) -> Result<Option<Vote>, VoteStoreError> {
        let row = sqlx::query_as::<_, VoteRow>(
            r#"
            SELECT target_id, voter_id, value, created_at, updated_at
            FROM comment_votes
            WHERE target_id = $1 AND voter_id = $2
            "#,
        )
        .bind(target_id)
        .bind(voter_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vote::try_from).transpose()
    }

    async fn cast_vote(&self, request: &CastVote) -> Result<VoteTransition, VoteStoreError> {
        let (tx, transition) = self.before_deadline(self.stage_cast(request)).await?;
        tx.commit().await?;
        Ok(transition)
    }

    async fn retract_vote(
        &self,
        target_id: TargetId,
        voter_id: VoterId,
    ) -> Result<VoteTransition, VoteStoreError> {
        let (tx, transition) = self.before_deadline(self.stage_retract(target_id, voter_id)).await?;
        tx.commit().await?;
        Ok(transition)
    }

    async fn tally(&self, target_id: TargetId) -> Result<VoteTally, VoteStoreError> {
        let (upvotes, downvotes): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE value = 1),
                COUNT(*) FILTER (WHERE value = -1)
            FROM comment_votes
            WHERE target_id = $1
            "#,
        )
        .bind(target_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(VoteTally { upvotes, downvotes })
    }
}
