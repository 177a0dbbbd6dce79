//! Structured logging subsystem.
//!
//! # Responsibilities
//! - Buffer correlated log entries for the operator snapshot
//! - Forward every entry to the base `tracing` sink unchanged
//! - Map ambient task ids to correlation ids (advisory only)

pub mod logger;

pub use logger::{LogEntry, LogLevel, StructuredLogger};
