//! Configuration module for the vote subsystem.
//! Defines the environment settings and the wiring of the stores, the service
//! and the reconciliation job.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{LogFormat, Settings};
