//! Error types for the comment votes pipeline.
mod vote;

pub use vote::VoteError;
