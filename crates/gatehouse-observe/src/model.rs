use gatehouse_types::prelude::TraceContext;
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }
}

/// One completion event: level, message and free-form tags.
#[derive(Clone, Debug)]
pub struct LogEvent {
    pub level: LogLevel,
    pub msg: String,
    pub tags: Map<String, Value>,
}

/// Request-scoped enrichment applied to every record emitted while the
/// request is in flight.
#[derive(Clone, Debug)]
pub struct ObserveCtx {
    pub service: String,
    pub trace: Option<TraceContext>,
    pub client: Option<String>,
}

impl ObserveCtx {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            trace: None,
            client: None,
        }
    }

    pub fn with_trace(mut self, trace: TraceContext) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn with_client(mut self, client: Option<String>) -> Self {
        self.client = client;
        self
    }
}
