//! # Comment Votes Repository
//! This crate provides the storage traits of the vote subsystem and their
//! implementations. It includes the error types, the interfaces for the vote
//! store, the target counters and the reconciliation log, and concrete
//! implementations for PostgreSQL and for process memory.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::{AttemptTimeout, CounterStoreError, ReconciliationLogError, TransientError, VoteStoreError};
pub use interfaces::{ReconciliationLog, TargetCounters, VoteStore};
pub use memory::{InMemoryReconciliationLog, InMemoryTargetCounters, InMemoryVoteStore};
pub use postgres::{PostgresCommentCounters, PostgresReconciliationLog, PostgresVoteStore};
