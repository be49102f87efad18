//! # Comment Votes Pipeline
//! This crate implements the vote operations exposed to the content system.
//! A vote request is validated, committed by the vote store as a typed
//! transition, and then turned into a counter delta by the aggregate
//! maintainer, which applies it to the target or records it for
//! reconciliation.
pub mod errors;
pub mod maintainer;
pub mod retry;
pub mod service;

pub use errors::VoteError;
pub use maintainer::{compute_vote_delta, AggregateMaintainer, ApplyOutcome};
pub use retry::RetryPolicy;
pub use service::{CastKind, CastReceipt, RetractReceipt, VoteService};
