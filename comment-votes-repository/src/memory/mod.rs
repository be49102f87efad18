//! In-memory implementations of the vote subsystem's stores.
//!
//! Used for tests and local development without a database. Each store guards
//! its state with a single `tokio::sync::Mutex`, so every operation is one
//! critical section and behaves like a serializable transaction.
mod reconciliation_log;
mod target_counters;
mod vote_store;

pub use reconciliation_log::InMemoryReconciliationLog;
pub use target_counters::InMemoryTargetCounters;
pub use vote_store::InMemoryVoteStore;
