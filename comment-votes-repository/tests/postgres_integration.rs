//! Integration tests for the PostgreSQL stores.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup. They are ignored by default.
//!
//! Run with: `DATABASE_URL=... cargo test --test postgres_integration -- --ignored`

use comment_votes_repository::{
    CounterStoreError, PostgresCommentCounters, PostgresReconciliationLog, PostgresVoteStore,
    ReconciliationLog, TargetCounters, VoteStore, VoteStoreError,
};
use comment_votes_shared::types::{
    CastMode, CastVote, Counters, ReconciliationRecord, ReconciliationStatus, VoteTally,
    VoteTransition, VoteValue, VotesDelta,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Inserts a target row with zeroed counters.
async fn make_comment(pool: &sqlx::PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO comments (id) VALUES ($1)")
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
    id
}

fn make_cast(target_id: Uuid, voter_id: Uuid, value: VoteValue, mode: CastMode) -> CastVote {
    CastVote { target_id, voter_id, value, mode }
}

// ============================================================================
// Vote Store Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_cast_creates_then_updates(pool: sqlx::PgPool) {
    let store = PostgresVoteStore::new(pool.clone(), WRITE_TIMEOUT);
    let (target, voter) = (Uuid::new_v4(), Uuid::new_v4());

    let created = store
        .cast_vote(&make_cast(target, voter, VoteValue::Up, CastMode::CreateOrUpdate))
        .await
        .unwrap();
    let updated = store
        .cast_vote(&make_cast(target, voter, VoteValue::Down, CastMode::CreateOrUpdate))
        .await
        .unwrap();

    assert_eq!(created, VoteTransition::Created { value: VoteValue::Up });
    assert_eq!(updated, VoteTransition::Updated { prior: VoteValue::Up, value: VoteValue::Down });

    let vote = store.get_vote(target, voter).await.unwrap().unwrap();
    assert_eq!(vote.value, VoteValue::Down);
    assert!(vote.updated_at >= vote.created_at);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comment_votes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_create_only_conflicts_with_existing_vote(pool: sqlx::PgPool) {
    let store = PostgresVoteStore::new(pool, WRITE_TIMEOUT);
    let (target, voter) = (Uuid::new_v4(), Uuid::new_v4());
    store
        .cast_vote(&make_cast(target, voter, VoteValue::Up, CastMode::CreateOnly))
        .await
        .unwrap();

    let second = store
        .cast_vote(&make_cast(target, voter, VoteValue::Up, CastMode::CreateOnly))
        .await;

    assert!(matches!(second, Err(VoteStoreError::Conflict { .. })));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_concurrent_first_votes_from_same_voter(pool: sqlx::PgPool) {
    let store = Arc::new(PostgresVoteStore::new(pool.clone(), WRITE_TIMEOUT));
    let (target, voter) = (Uuid::new_v4(), Uuid::new_v4());

    let attempts = (0..8).map(|_| {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .cast_vote(&make_cast(target, voter, VoteValue::Up, CastMode::CreateOnly))
                .await
        })
    });
    let results = futures::future::join_all(attempts).await;

    let created = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
    assert_eq!(created, 1);
    assert!(results
        .iter()
        .all(|r| matches!(r, Ok(Ok(_)) | Ok(Err(VoteStoreError::Conflict { .. })))));

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comment_votes WHERE target_id = $1")
        .bind(target)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_retract_and_tally(pool: sqlx::PgPool) {
    let store = PostgresVoteStore::new(pool, WRITE_TIMEOUT);
    let target = Uuid::new_v4();
    let voters: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    for (voter, value) in voters.iter().zip([VoteValue::Up, VoteValue::Up, VoteValue::Down]) {
        store
            .cast_vote(&make_cast(target, *voter, value, CastMode::CreateOrUpdate))
            .await
            .unwrap();
    }

    let deleted = store.retract_vote(target, voters[0]).await.unwrap();

    assert_eq!(deleted, VoteTransition::Deleted { prior: VoteValue::Up });
    assert_eq!(store.tally(target).await.unwrap(), VoteTally { upvotes: 1, downvotes: 1 });
    assert!(matches!(
        store.retract_vote(target, voters[0]).await,
        Err(VoteStoreError::NotFound { .. })
    ));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_write_blocked_past_deadline_is_rolled_back(pool: sqlx::PgPool) {
    let store = PostgresVoteStore::new(pool.clone(), Duration::from_millis(200));
    let (target, voter) = (Uuid::new_v4(), Uuid::new_v4());
    store
        .cast_vote(&make_cast(target, voter, VoteValue::Up, CastMode::CreateOrUpdate))
        .await
        .unwrap();

    // Hold the row lock so the recast cannot reach its commit.
    let mut locker = pool.begin().await.unwrap();
    sqlx::query("SELECT value FROM comment_votes WHERE target_id = $1 AND voter_id = $2 FOR UPDATE")
        .bind(target)
        .bind(voter)
        .execute(&mut *locker)
        .await
        .unwrap();

    let blocked = store
        .cast_vote(&make_cast(target, voter, VoteValue::Down, CastMode::CreateOrUpdate))
        .await;
    locker.rollback().await.unwrap();

    assert!(matches!(blocked, Err(VoteStoreError::TimedOut(_))));
    assert_eq!(store.get_vote(target, voter).await.unwrap().unwrap().value, VoteValue::Up);
}

// ============================================================================
// Comment Counters Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_apply_delta_rewrites_score(pool: sqlx::PgPool) {
    let counters = PostgresCommentCounters::new(pool.clone());
    let target = make_comment(&pool).await;

    counters.apply_counter_delta(target, Uuid::new_v4(), VotesDelta::new(1, 0)).await.unwrap();
    counters.apply_counter_delta(target, Uuid::new_v4(), VotesDelta::new(0, 1)).await.unwrap();
    let after = counters.apply_counter_delta(target, Uuid::new_v4(), VotesDelta::new(-1, 1)).await.unwrap();

    assert_eq!(after, Counters { upvotes: 0, downvotes: 2, score: -2 });
    assert_eq!(counters.get_counters(target).await.unwrap(), after);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_concurrent_deltas_are_not_lost(pool: sqlx::PgPool) {
    let counters = Arc::new(PostgresCommentCounters::new(pool.clone()));
    let target = make_comment(&pool).await;

    let writes = (0..40).map(|i| {
        let counters = counters.clone();
        let delta = if i % 2 == 0 { VotesDelta::new(1, 0) } else { VotesDelta::new(0, 1) };
        tokio::spawn(async move { counters.apply_counter_delta(target, Uuid::new_v4(), delta).await })
    });
    for result in futures::future::join_all(writes).await {
        result.unwrap().unwrap();
    }

    assert_eq!(
        counters.get_counters(target).await.unwrap(),
        Counters { upvotes: 20, downvotes: 20, score: 0 }
    );
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_missing_comment_is_not_found(pool: sqlx::PgPool) {
    let counters = PostgresCommentCounters::new(pool);
    let target = Uuid::new_v4();

    let result = counters.apply_counter_delta(target, Uuid::new_v4(), VotesDelta::new(1, 0)).await;

    assert!(matches!(result, Err(CounterStoreError::TargetNotFound(id)) if id == target));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_repeated_delta_id_applies_once(pool: sqlx::PgPool) {
    let counters = PostgresCommentCounters::new(pool.clone());
    let target = make_comment(&pool).await;
    let delta_id = Uuid::new_v4();

    counters.apply_counter_delta(target, delta_id, VotesDelta::new(1, 0)).await.unwrap();
    let again = counters.apply_counter_delta(target, delta_id, VotesDelta::new(1, 0)).await.unwrap();

    assert_eq!(again, Counters::new(1, 0));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_missing_comment_leaves_no_applied_marker(pool: sqlx::PgPool) {
    let counters = PostgresCommentCounters::new(pool.clone());
    let delta_id = Uuid::new_v4();

    let result = counters.apply_counter_delta(Uuid::new_v4(), delta_id, VotesDelta::new(1, 0)).await;

    assert!(matches!(result, Err(CounterStoreError::TargetNotFound(_))));
    let markers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applied_vote_deltas WHERE id = $1")
        .bind(delta_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(markers, 0);
}

// ============================================================================
// Reconciliation Log Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_reconciliation_record_lifecycle(pool: sqlx::PgPool) {
    let log = PostgresReconciliationLog::new(pool.clone());
    let record = ReconciliationRecord::new(Uuid::new_v4(), Uuid::new_v4(), VotesDelta::new(-1, 1), "store unavailable");

    log.record(&record).await.unwrap();
    let pending = log.pending(10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].delta, record.delta);
    assert_eq!(pending[0].target_id, record.target_id);

    log.resolve(record.id, ReconciliationStatus::Applied).await.unwrap();
    assert!(log.pending(10).await.unwrap().is_empty());

    let status: i16 = sqlx::query_scalar("SELECT status FROM vote_reconciliation WHERE id = $1")
        .bind(record.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, ReconciliationStatus::Applied.as_i16());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_concurrent_claims_are_disjoint(pool: sqlx::PgPool) {
    let log = Arc::new(PostgresReconciliationLog::new(pool.clone()));
    for _ in 0..20 {
        let record = ReconciliationRecord::new(Uuid::new_v4(), Uuid::new_v4(), VotesDelta::new(1, 0), "store busy");
        log.record(&record).await.unwrap();
    }
    let lease = Duration::from_secs(60);

    let (first, second) = tokio::join!(log.claim(15, lease), log.claim(15, lease));
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first.len() + second.len(), 20);
    assert!(first.iter().all(|a| second.iter().all(|b| a.id != b.id)));
    assert!(first.windows(2).all(|w| w[0].attempted_at <= w[1].attempted_at));
    assert!(log.claim(15, lease).await.unwrap().is_empty());
    assert_eq!(log.pending(50).await.unwrap().len(), 20);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_expired_claim_can_be_taken_again(pool: sqlx::PgPool) {
    let log = PostgresReconciliationLog::new(pool);
    let record = ReconciliationRecord::new(Uuid::new_v4(), Uuid::new_v4(), VotesDelta::new(0, 1), "store busy");
    log.record(&record).await.unwrap();

    assert_eq!(log.claim(10, Duration::ZERO).await.unwrap().len(), 1);
    let reclaimed = log.claim(10, Duration::from_secs(60)).await.unwrap();
    assert_eq!(reclaimed.len(), 1);

    log.resolve(record.id, ReconciliationStatus::Applied).await.unwrap();
    assert!(log.claim(10, Duration::ZERO).await.unwrap().is_empty());
}
