//! Span registry and trace archive.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::logging::LogLevel;
use crate::trace::span::{Span, SpanEvent};

#[derive(Default)]
struct TraceStore {
    /// Spans currently in flight, mutable through the engine.
    active: HashMap<Uuid, Span>,
    /// Archived spans grouped by trace id.
    traces: HashMap<Uuid, Vec<Span>>,
    /// Trace ids in creation order, for oldest-first eviction.
    order: VecDeque<Uuid>,
}

/// Manages scoped spans and completed traces.
pub struct TraceEngine {
    store: Arc<Mutex<TraceStore>>,
    max_traces: usize,
}

impl TraceEngine {
    pub fn new(max_traces: usize) -> Self {
        Self {
            store: Arc::new(Mutex::new(TraceStore::default())),
            max_traces: max_traces.max(1),
        }
    }

    /// Start a span and return its archival guard.
    ///
    /// Dropping the guard archives the span, on normal completion, early
    /// return, panic or task cancellation alike. Span and trace ids are
    /// generated when not supplied.
    pub fn begin_span(
        &self,
        operation_name: &str,
        trace_id: Option<Uuid>,
        parent_span_id: Option<Uuid>,
    ) -> SpanGuard {
        let span = Span::begin(operation_name, trace_id, parent_span_id);
        let span_id = span.span_id;
        let trace_id = span.trace_id;

        lock(&self.store).active.insert(span_id, span);

        SpanGuard {
            store: Arc::clone(&self.store),
            max_traces: self.max_traces,
            span_id,
            trace_id,
        }
    }

    /// Tag an active span. Unknown or already-archived ids are no-ops.
    pub fn add_span_tag(&self, span_id: Uuid, key: &str, value: &str) {
        if let Some(span) = lock(&self.store).active.get_mut(&span_id) {
            span.tags.insert(key.to_string(), value.to_string());
        }
    }

    /// Attach a log line to an active span. Unknown ids are no-ops.
    pub fn add_span_log(&self, span_id: Uuid, message: &str, level: LogLevel) {
        if let Some(span) = lock(&self.store).active.get_mut(&span_id) {
            span.logs.push(SpanEvent {
                timestamp: crate::metrics::unix_timestamp(),
                level,
                message: message.to_string(),
            });
        }
    }

    /// Archived spans for a trace, empty if none have completed yet.
    pub fn trace(&self, trace_id: Uuid) -> Vec<Span> {
        lock(&self.store)
            .traces
            .get(&trace_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of every span currently in flight.
    pub fn active_spans(&self) -> Vec<Span> {
        lock(&self.store).active.values().cloned().collect()
    }
}

fn lock(store: &Mutex<TraceStore>) -> MutexGuard<'_, TraceStore> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scoped handle for one span. Archival happens in `Drop`, so the span is
/// archived exactly once on every exit path of the enclosing operation.
pub struct SpanGuard {
    store: Arc<Mutex<TraceStore>>,
    max_traces: usize,
    span_id: Uuid,
    trace_id: Uuid,
}

impl SpanGuard {
    pub fn span_id(&self) -> Uuid {
        self.span_id
    }

    pub fn trace_id(&self) -> Uuid {
        self.trace_id
    }

    pub fn add_tag(&self, key: &str, value: &str) {
        if let Some(span) = lock(&self.store).active.get_mut(&self.span_id) {
            span.tags.insert(key.to_string(), value.to_string());
        }
    }

    pub fn add_log(&self, message: &str, level: LogLevel) {
        if let Some(span) = lock(&self.store).active.get_mut(&self.span_id) {
            span.logs.push(SpanEvent {
                timestamp: crate::metrics::unix_timestamp(),
                level,
                message: message.to_string(),
            });
        }
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        let mut store = lock(&self.store);
        let Some(mut span) = store.active.remove(&self.span_id) else {
            return;
        };
        span.finish();

        if !store.traces.contains_key(&self.trace_id) {
            store.order.push_back(self.trace_id);
            while store.traces.len() >= self.max_traces {
                if let Some(oldest) = store.order.pop_front() {
                    store.traces.remove(&oldest);
                } else {
                    break;
                }
            }
        }
        store.traces.entry(self.trace_id).or_default().push(span);
    }
}
