use parking_lot::Mutex;
use serde_json::{Map, Value};

use gatehouse_types::prelude::utc_rfc3339;

use crate::model::{LogEvent, LogLevel, ObserveCtx};

/// Sink for structured completion records. One record per request or
/// outbound call; diagnostics go through `tracing` instead.
pub trait Logger: Send + Sync {
    fn log(&self, ctx: &ObserveCtx, event: LogEvent);
}

pub struct LogBuilder {
    level: LogLevel,
    msg: String,
    tags: Map<String, Value>,
}

impl LogBuilder {
    pub fn new(level: LogLevel, msg: impl Into<String>) -> Self {
        Self {
            level,
            msg: msg.into(),
            tags: Map::new(),
        }
    }

    pub fn tag(mut self, key: &str, value: Value) -> Self {
        self.tags.insert(key.to_string(), value);
        self
    }

    pub fn tags(mut self, tags: Map<String, Value>) -> Self {
        self.tags.extend(tags);
        self
    }

    pub fn finish(self) -> LogEvent {
        LogEvent {
            level: self.level,
            msg: self.msg,
            tags: self.tags,
        }
    }
}

/// Record shape: `service`, `ts`, `level`, `msg`, trace ids, optional
/// `client`, then the event tags. Tags are merged last and may override the
/// base fields.
pub fn render(ctx: &ObserveCtx, event: &LogEvent) -> Value {
    let mut out = Map::new();
    out.insert("service".to_string(), Value::String(ctx.service.clone()));
    out.insert("ts".to_string(), Value::String(utc_rfc3339()));
    out.insert(
        "level".to_string(),
        Value::String(event.level.as_str().to_string()),
    );
    out.insert("msg".to_string(), Value::String(event.msg.clone()));

    if let Some(trace) = &ctx.trace {
        out.insert(
            "trace_id".to_string(),
            Value::String(trace.trace_id.clone()),
        );
        out.insert("span_id".to_string(), Value::String(trace.span_id.clone()));
        if let Some(parent_id) = &trace.parent_id {
            out.insert("parent_id".to_string(), Value::String(parent_id.clone()));
        }
    }

    if let Some(client) = &ctx.client {
        out.insert("client".to_string(), Value::String(client.clone()));
    }

    for (key, value) in &event.tags {
        out.insert(key.clone(), value.clone());
    }

    Value::Object(out)
}

/// Writes one compact JSON object per line to stdout.
pub struct StdoutLogger;

impl Logger for StdoutLogger {
    fn log(&self, ctx: &ObserveCtx, event: LogEvent) {
        let record = render(ctx, &event);
        match serde_json::to_string(&record) {
            Ok(line) => println!("{line}"),
            Err(err) => tracing::warn!(error = %err, "could not serialize log record"),
        }
    }
}

pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _ctx: &ObserveCtx, _event: LogEvent) {}
}

/// Captures rendered records for assertions.
#[derive(Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<Value>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Value> {
        self.records.lock().clone()
    }

    /// Records whose `msg` field equals `msg`.
    pub fn with_msg(&self, msg: &str) -> Vec<Value> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.get("msg").and_then(Value::as_str) == Some(msg))
            .cloned()
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, ctx: &ObserveCtx, event: LogEvent) {
        self.records.lock().push(render(ctx, &event));
    }
}
