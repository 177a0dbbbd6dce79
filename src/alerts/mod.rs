//! Threshold alerting subsystem.
//!
//! # State Machine (per rule/metric key)
//! ```text
//! no-alert → active:   breach observed, sustained for rule.sustain_secs
//! active → active:     still breaching, no-op (idempotent)
//! active → no-alert:   breach cleared; alert resolved, kept in history
//! ```
//!
//! # Design Decisions
//! - Level-triggered: only the current metric value matters, never edges
//! - Unresolvable metric names skip the rule, never raise
//! - Transitions emit warning-level structured log lines; anything beyond
//!   that (paging, email) is a collaborator's job

pub mod engine;
pub mod rule;

pub use engine::{Alert, AlertEngine, AlertStatus};
pub use rule::{AlertOperator, AlertRule, Severity};
