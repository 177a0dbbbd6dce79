//! In-process tracing subsystem.
//!
//! # Data Flow
//! ```text
//! begin_span()
//!     → active-span table (mutable, tag/log writes land here)
//!     → SpanGuard drop (every exit path, including panic)
//!         → end_time + duration stamped
//!         → span archived into its trace, immutable from then on
//! ```
//!
//! # Design Decisions
//! - Archival is structural (guard Drop), never caller discipline
//! - Mutating an unknown span id is a silent no-op
//! - Trace storage is bounded; oldest whole trace evicted first

pub mod engine;
pub mod span;

pub use engine::{SpanGuard, TraceEngine};
pub use span::{Span, SpanEvent};
