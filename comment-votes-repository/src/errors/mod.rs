//! Error types for the comment votes repository.
//! Consolidates the errors of each store and the classification of database
//! failures into the subsystem's error taxonomy.
mod counter_store;
mod reconciliation_log;
mod vote_store;

pub use counter_store::CounterStoreError;
pub use reconciliation_log::ReconciliationLogError;
pub use vote_store::VoteStoreError;

use std::time::Duration;

/// Errors a bounded retry policy may safely retry.
///
/// An error is transient only when the failed attempt is known not to have
/// committed anything (rolled back serialization failures, deadlocks, no
/// connection acquired, a transaction abandoned before its commit).
pub trait TransientError {
    fn is_transient(&self) -> bool;
}

/// Errors that can report an attempt abandoned by the caller's timer.
///
/// Such an attempt may or may not have committed, so the error built by
/// `timed_out` is never transient. Stores whose writes must not end in that
/// state do not implement this trait and bound their own pre-commit work.
pub trait AttemptTimeout: TransientError {
    fn timed_out(after: Duration) -> Self;
}

/// How a `sqlx::Error` maps onto the store error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SqlxErrorClass {
    /// SQLSTATE 23505.
    UniqueViolation,
    /// Serialization failure, deadlock or pool acquisition timeout.
    Busy,
    /// The database cannot be reached.
    Unavailable,
    Other,
}

pub(crate) fn classify_sqlx_error(error: &sqlx::Error) -> SqlxErrorClass {
    match error {
        sqlx::Error::PoolTimedOut => SqlxErrorClass::Busy,
        sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => SqlxErrorClass::Unavailable,
        sqlx::Error::Database(db_error) => match db_error.code().as_deref() {
            Some("23505") => SqlxErrorClass::UniqueViolation,
            Some("40001") | Some("40P01") => SqlxErrorClass::Busy,
            _ => SqlxErrorClass::Other,
        },
        _ => SqlxErrorClass::Other,
    }
}
