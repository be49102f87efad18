use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
/// Represents errors that can occur within the reconciliation log.
///
/// This enum consolidates the database failures of the log and the records it
/// cannot decode.
pub enum ReconciliationLogError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Reconciliation record not found: {0}")]
    RecordNotFound(Uuid),
}
