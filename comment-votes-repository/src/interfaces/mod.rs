//! This module defines and re-exports the interfaces of the vote subsystem's stores.
//! It serves as a central point for accessing the traits that abstract data access.
mod reconciliation_log;
mod target_counters;
mod vote_store;

pub use reconciliation_log::ReconciliationLog;
pub use target_counters::TargetCounters;
pub use vote_store::VoteStore;
