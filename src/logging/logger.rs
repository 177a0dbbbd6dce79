//! Ring-buffered structured logger over the base `tracing` sink.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::metrics::unix_timestamp;

/// Log severity, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// One buffered log record.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: f64,
    pub level: LogLevel,
    pub message: String,
    pub correlation_id: Option<String>,
    pub trace_id: Option<Uuid>,
    pub extra: serde_json::Value,
}

/// Logger with a fixed-capacity ring buffer and a correlation-id table.
///
/// Entries are buffered for `recent_logs` and simultaneously forwarded to
/// the process's `tracing` subscriber, so existing log tooling keeps
/// working unchanged.
pub struct StructuredLogger {
    buffer: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    correlation_ids: DashMap<String, String>,
}

impl StructuredLogger {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            correlation_ids: DashMap::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append an entry, evicting the oldest once the buffer is full, and
    /// forward it to the base sink.
    pub fn log(
        &self,
        level: LogLevel,
        message: &str,
        correlation_id: Option<&str>,
        extra: Option<serde_json::Value>,
        trace_id: Option<Uuid>,
    ) {
        let entry = LogEntry {
            timestamp: unix_timestamp(),
            level,
            message: message.to_string(),
            correlation_id: correlation_id.map(str::to_string),
            trace_id,
            extra: extra.unwrap_or_else(|| serde_json::Value::Object(Default::default())),
        };

        {
            let mut buffer = self.lock();
            while buffer.len() >= self.capacity {
                buffer.pop_front();
            }
            buffer.push_back(entry.clone());
        }

        let correlation = entry.correlation_id.as_deref().unwrap_or("-");
        match level {
            LogLevel::Error => tracing::error!(
                correlation_id = %correlation,
                trace_id = ?entry.trace_id,
                extra = %entry.extra,
                "{}",
                message
            ),
            LogLevel::Warning => tracing::warn!(
                correlation_id = %correlation,
                trace_id = ?entry.trace_id,
                extra = %entry.extra,
                "{}",
                message
            ),
            LogLevel::Info => tracing::info!(
                correlation_id = %correlation,
                trace_id = ?entry.trace_id,
                extra = %entry.extra,
                "{}",
                message
            ),
            LogLevel::Debug => tracing::debug!(
                correlation_id = %correlation,
                trace_id = ?entry.trace_id,
                extra = %entry.extra,
                "{}",
                message
            ),
        }
    }

    /// Remember the correlation id for an ambient task id. Best effort:
    /// call sites that miss the mapping simply log without one.
    pub fn set_correlation_id(&self, task_id: &str, correlation_id: &str) {
        self.correlation_ids
            .insert(task_id.to_string(), correlation_id.to_string());
    }

    pub fn correlation_id(&self, task_id: &str) -> Option<String> {
        self.correlation_ids.get(task_id).map(|r| r.value().clone())
    }

    /// The last `limit` entries, oldest first.
    pub fn recent_logs(&self, limit: usize) -> Vec<LogEntry> {
        let buffer = self.lock();
        let skip = buffer.len().saturating_sub(limit);
        buffer.iter().skip(skip).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ring_buffer_drops_oldest() {
        let logger = StructuredLogger::new(1000);
        for i in 0..1200 {
            logger.log(LogLevel::Info, &format!("entry {}", i), None, None, None);
        }

        let recent = logger.recent_logs(1000);
        assert_eq!(recent.len(), 1000);
        assert_eq!(recent.first().unwrap().message, "entry 200");
        assert_eq!(recent.last().unwrap().message, "entry 1199");
    }

    #[test]
    fn recent_logs_limit_smaller_than_buffer() {
        let logger = StructuredLogger::new(100);
        for i in 0..10 {
            logger.log(LogLevel::Debug, &format!("m{}", i), None, None, None);
        }
        let recent = logger.recent_logs(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].message, "m7");
    }

    #[test]
    fn entries_keep_correlation_and_extra() {
        let logger = StructuredLogger::new(10);
        logger.log(
            LogLevel::Warning,
            "slow query",
            Some("req-42"),
            Some(json!({"elapsed_ms": 950})),
            None,
        );

        let entry = &logger.recent_logs(1)[0];
        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.correlation_id.as_deref(), Some("req-42"));
        assert_eq!(entry.extra["elapsed_ms"], 950);
    }

    #[test]
    fn correlation_table_round_trips() {
        let logger = StructuredLogger::new(10);
        logger.set_correlation_id("task-1", "req-abc");
        assert_eq!(logger.correlation_id("task-1").as_deref(), Some("req-abc"));
        assert_eq!(logger.correlation_id("task-2"), None);
    }
}
