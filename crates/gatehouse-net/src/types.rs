use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;

/// An outbound call as a handler describes it. The scope that submits it
/// attaches trace, client and deadline headers on top.
#[derive(Clone, Debug)]
pub struct CallRequest {
    pub method: String,
    pub host: String,
    pub port: u16,
    pub path_segms: Vec<String>,
    pub use_tls: bool,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub timeout: Duration,
}

impl Default for CallRequest {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            host: String::new(),
            port: 80,
            path_segms: Vec::new(),
            use_tls: false,
            params: Vec::new(),
            headers: Vec::new(),
            body: Vec::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl CallRequest {
    pub fn get(host: impl Into<String>, path_segms: Vec<String>) -> Self {
        Self {
            host: host.into(),
            path_segms,
            ..Self::default()
        }
    }

    /// Path portion of the call, used for log tags.
    pub fn path(&self) -> String {
        self.path_segms.join("/")
    }
}

#[derive(Clone, Debug)]
pub struct CallResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl CallResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connect,
    Protocol,
}

/// A transport-level failure captured as a value; it reaches the handler
/// through the future rather than as an early error.
#[derive(Clone, Debug)]
pub struct CallFailure {
    pub action: &'static str,
    pub kind: FailureKind,
    pub detail: String,
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.action, self.detail)
    }
}

pub type CallResult = Result<CallResponse, CallFailure>;

/// A completed call, keyed by the opaque reference the submitter holds.
#[derive(Clone, Debug)]
pub struct CallRecv {
    pub id: i64,
    pub result: CallResult,
}

/// How a call resolved, with the completion transform accounted for
/// explicitly: `Raw` when no transform was attached, `Transformed` when it
/// ran, `Fallback` when it failed and the raw result was kept.
#[derive(Clone, Debug)]
pub enum CallOutcome {
    Raw(CallResult),
    Transformed(Value),
    Fallback {
        raw: CallResult,
        transform_error: String,
    },
}

impl CallOutcome {
    pub fn response(&self) -> Option<&CallResponse> {
        match self {
            CallOutcome::Raw(Ok(response)) => Some(response),
            CallOutcome::Fallback { raw: Ok(response), .. } => Some(response),
            _ => None,
        }
    }

    pub fn transformed(&self) -> Option<&Value> {
        match self {
            CallOutcome::Transformed(value) => Some(value),
            _ => None,
        }
    }
}
