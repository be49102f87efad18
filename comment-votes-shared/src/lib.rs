//! # Comment Votes Shared
//! This crate defines the domain types shared across the comment votes subsystem.
//! It includes votes and their values, the acting identity, vote lifecycle
//! transitions, counter deltas, target counters and reconciliation records.
pub mod types;
