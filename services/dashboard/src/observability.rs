//! Logging setup and the in-memory execution log behind `/api/logs`

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Only events from our own crates reach the dashboard feed
const CAPTURED_TARGET_PREFIX: &str = "forex_";

/// One captured log event
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub ts: DateTime<Utc>,
    pub level: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Bounded ring buffer of recent log entries
#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Newest first
    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        let entries = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `tracing` layer copying INFO and above into a `LogBuffer`
pub struct LogCaptureLayer {
    buffer: LogBuffer,
}

impl LogCaptureLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S: Subscriber> Layer<S> for LogCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > Level::INFO || !meta.target().starts_with(CAPTURED_TARGET_PREFIX) {
            return;
        }

        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);

        self.buffer.push(LogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            ts: Utc::now(),
            level: meta.level().as_str().to_lowercase(),
            message: visitor.message,
            context: (!visitor.fields.is_empty()).then_some(visitor.fields),
        });
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: serde_json::Map<String, serde_json::Value>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        if field.name() == "message" {
            self.message = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{:?}", value).into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }
}

/// Install the global subscriber: env filter, stdout formatter, log capture
pub fn init_tracing(buffer: LogBuffer) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(LogCaptureLayer::new(buffer))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::Registry;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            id: message.to_string(),
            ts: Utc::now(),
            level: "info".to_string(),
            message: message.to_string(),
            context: None,
        }
    }

    #[test]
    fn test_buffer_drops_oldest_at_capacity() {
        let buffer = LogBuffer::new(2);
        buffer.push(entry("one"));
        buffer.push(entry("two"));
        buffer.push(entry("three"));

        let messages: Vec<String> = buffer.recent(10).into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["three", "two"]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_layer_captures_message_and_fields() {
        let buffer = LogBuffer::new(10);
        let subscriber = Registry::default().with(LogCaptureLayer::new(buffer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(symbol = "EURUSD", open = 3u64, "Cycle synced");
            tracing::error!(error = %"bridge down", "Cycle execution failed");
            tracing::debug!("not captured");
        });

        let entries = buffer.recent(10);
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].level, "error");
        assert_eq!(entries[0].message, "Cycle execution failed");
        let context = entries[0].context.as_ref().unwrap();
        assert_eq!(context["error"], "bridge down");

        assert_eq!(entries[1].message, "Cycle synced");
        let context = entries[1].context.as_ref().unwrap();
        assert_eq!(context["symbol"], "EURUSD");
        assert_eq!(context["open"], 3);
    }

    #[test]
    fn test_foreign_targets_are_ignored() {
        let buffer = LogBuffer::new(10);
        let subscriber = Registry::default().with(LogCaptureLayer::new(buffer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "tower_http::trace", "request finished");
        });

        assert!(buffer.is_empty());
    }
}
