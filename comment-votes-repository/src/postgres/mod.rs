//! PostgreSQL implementations of the vote subsystem's stores.
//!
//! ## Database Tables
//!
//! - `comment_votes`: live votes, primary key `(target_id, voter_id)`
//! - `comments`: the targets' `upvotes`, `downvotes` and `score` counters
//! - `vote_reconciliation`: deltas waiting to be re-applied
mod comment_counters;
mod reconciliation_log;
mod vote_store;

pub use comment_counters::PostgresCommentCounters;
pub use reconciliation_log::PostgresReconciliationLog;
pub use vote_store::PostgresVoteStore;

/// Applies the embedded migrations to `pool`.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("src/postgres/migrations").run(pool).await
}
