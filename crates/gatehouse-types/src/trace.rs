use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::{new_span_id, new_trace_id};

/// Fixed length of a well-formed `traceparent` header:
/// `version(2) - trace_id(32) - parent_id(16) - flags(2)` plus hyphens.
pub const TRACEPARENT_LEN: usize = 55;

/// Identifies a request's position in a distributed call tree.
///
/// Built once per inbound request and immutable afterwards. The span id is
/// always freshly generated; trace and parent ids come from the inbound
/// `traceparent` header when it is well formed, otherwise a fresh trace id
/// is generated and no parent is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub span_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TraceParseError {
    #[error("traceparent header not of length 55")]
    Length,
    #[error("expected 4 parts in traceparent header")]
    Parts,
    #[error("unsupported traceparent version {0}")]
    Version(String),
    #[error("invalid trace_id")]
    TraceId,
    #[error("invalid parent_id")]
    ParentId,
    #[error("invalid flags")]
    Flags,
}

impl TraceContext {
    /// Derive a context from an optional inbound `traceparent` value.
    ///
    /// A malformed header is treated the same as an absent one; it never
    /// fails the request.
    pub fn from_header(raw: Option<&str>) -> Self {
        let parsed = raw.and_then(|value| match parse_traceparent(value) {
            Ok(ids) => Some(ids),
            Err(err) => {
                tracing::warn!(error = %err, "invalid traceparent header");
                None
            }
        });

        match parsed {
            Some((trace_id, parent_id)) => Self {
                trace_id,
                parent_id: Some(parent_id),
                span_id: new_span_id(),
            },
            None => Self {
                trace_id: new_trace_id(),
                parent_id: None,
                span_id: new_span_id(),
            },
        }
    }

    /// Header value propagated on outbound calls. The current span becomes
    /// the callee's parent.
    pub fn traceparent(&self) -> String {
        format!("00-{}-{}-00", self.trace_id, self.span_id)
    }
}

/// Parse a `traceparent` header into `(trace_id, parent_id)`.
///
/// Only version `00` is accepted. Ids are lowercased before validation, so
/// uppercase hex input is tolerated. Flags are length-checked but otherwise
/// ignored.
pub fn parse_traceparent(raw: &str) -> Result<(String, String), TraceParseError> {
    if raw.len() != TRACEPARENT_LEN {
        return Err(TraceParseError::Length);
    }

    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() != 4 {
        return Err(TraceParseError::Parts);
    }

    if parts[0] != "00" {
        return Err(TraceParseError::Version(parts[0].to_string()));
    }

    let trace_id = parts[1].to_ascii_lowercase();
    if trace_id.len() != 32 || !is_hex_string(&trace_id) {
        return Err(TraceParseError::TraceId);
    }

    let parent_id = parts[2].to_ascii_lowercase();
    if parent_id.len() != 16 || !is_hex_string(&parent_id) {
        return Err(TraceParseError::ParentId);
    }

    if parts[3].len() != 2 {
        return Err(TraceParseError::Flags);
    }

    Ok((trace_id, parent_id))
}

/// Even-length lowercase hex.
pub fn is_hex_string(s: &str) -> bool {
    s.len() % 2 == 0 && s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
