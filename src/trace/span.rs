//! Span data model.

use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::logging::LogLevel;
use crate::metrics::unix_timestamp;

/// A timestamped log line attached to a span.
#[derive(Debug, Clone, Serialize)]
pub struct SpanEvent {
    pub timestamp: f64,
    pub level: LogLevel,
    pub message: String,
}

/// A timed unit of work belonging to exactly one trace.
///
/// Active spans live in the engine's active table and are mutable through
/// it; once archived into their trace they are never touched again.
#[derive(Debug, Clone, Serialize)]
pub struct Span {
    pub span_id: Uuid,
    pub trace_id: Uuid,
    pub parent_span_id: Option<Uuid>,
    pub operation_name: String,
    pub start_time: f64,
    pub end_time: Option<f64>,
    pub duration: Option<f64>,
    pub tags: BTreeMap<String, String>,
    pub logs: Vec<SpanEvent>,
}

impl Span {
    pub(crate) fn begin(
        operation_name: &str,
        trace_id: Option<Uuid>,
        parent_span_id: Option<Uuid>,
    ) -> Self {
        Self {
            span_id: Uuid::new_v4(),
            trace_id: trace_id.unwrap_or_else(Uuid::new_v4),
            parent_span_id,
            operation_name: operation_name.to_string(),
            start_time: unix_timestamp(),
            end_time: None,
            duration: None,
            tags: BTreeMap::new(),
            logs: Vec::new(),
        }
    }

    pub(crate) fn finish(&mut self) {
        // Clamp against clock adjustments so duration is never negative.
        let end = unix_timestamp().max(self.start_time);
        self.end_time = Some(end);
        self.duration = Some(end - self.start_time);
    }
}
