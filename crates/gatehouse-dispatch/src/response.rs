use bytes::Bytes;
use serde_json::{json, Map, Value};

use gatehouse_types::prelude::Status;

use crate::errors::DispatchError;

/// The response under construction. Only the dispatcher and the handler's
/// restricted head capability mutate it. Terminal short-circuit setters
/// clear everything accumulated so far - a half-built handler response
/// never leaks into an error reply.
#[derive(Debug)]
pub struct Response {
    trace_id: String,
    status: Option<Status>,
    headers: Vec<(String, String)>,
    body: Bytes,
    log_tags: Map<String, Value>,
}

impl Response {
    pub fn new(trace_id: impl Into<String>) -> Self {
        let mut response = Self {
            trace_id: trace_id.into(),
            status: None,
            headers: Vec::new(),
            body: Bytes::new(),
            log_tags: Map::new(),
        };
        response.clear();
        response
    }

    /// Reset to the initial state: no status, no body, no tags, and only
    /// the trace id header.
    pub fn clear(&mut self) {
        self.log_tags = Map::new();
        self.headers = vec![("X-TraceId".to_string(), self.trace_id.clone())];
        self.status = None;
        self.body = Bytes::new();
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    /// The handler-facing "set head" operation: append headers, set status.
    pub fn resp_head(&mut self, status: Status, headers: Vec<(String, String)>) {
        self.headers.extend(headers);
        self.set_status(status);
    }

    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.push((key.into(), value.into()));
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn add_log_tag(&mut self, key: &str, value: Value) {
        self.log_tags.insert(key.to_string(), value);
    }

    /// Accumulated tags plus `http.status` once a status is set.
    pub fn log_tags(&self) -> Map<String, Value> {
        let mut tags = self.log_tags.clone();
        if let Some(status) = self.status {
            tags.insert("http.status".to_string(), json!(status.code()));
        }
        tags
    }

    pub fn set_body(&mut self, content_type: &str, body: Bytes) {
        self.add_header("Content-Type", content_type);
        self.body = body;
    }

    /// Adapter output: some adapters serve bytes without a content type.
    pub fn set_payload(&mut self, content_type: Option<&str>, body: Bytes) {
        if let Some(content_type) = content_type {
            self.add_header("Content-Type", content_type);
        }
        self.body = body;
    }

    pub fn set_json(&mut self, value: &Value) -> Result<(), DispatchError> {
        let body = serde_json::to_vec(value)
            .map_err(|err| DispatchError::internal(&format!("couldn't serialize json: {err}")))?;
        self.set_body("application/json", Bytes::from(body));
        Ok(())
    }

    pub fn set_not_found(&mut self) {
        self.status = Some(Status::NotFound);
    }

    pub fn set_bad_request(&mut self, reason: &str) {
        self.clear();
        self.add_header("Error", reason);
        self.set_status(Status::BadRequest);
    }

    pub fn set_internal_server_error(&mut self, reason: &str) {
        self.clear();
        self.add_header("Error", reason);
        self.set_status(Status::InternalServerError);
    }

    pub fn set_timeout(&mut self) {
        self.clear();
        self.add_header("Error", "application timeout");
        self.set_status(Status::GatewayTimeout);
    }

    /// Seal the response: `Content-Length` is always computed here.
    pub fn finish(self) -> FinishedResponse {
        let status = self.status.unwrap_or(Status::InternalServerError);
        let mut headers = self.headers;
        headers.push(("Content-Length".to_string(), self.body.len().to_string()));
        FinishedResponse {
            status,
            headers,
            body: self.body,
        }
    }
}

/// What the transport adapter serves.
#[derive(Clone, Debug)]
pub struct FinishedResponse {
    pub status: Status,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl FinishedResponse {
    pub fn status_line(&self) -> String {
        self.status.status_line()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_setters_discard_partial_state() {
        let mut response = Response::new("4bf92f3577b34da6a3ce929d0e0e4736");
        response.add_header("X-Partial", "yes");
        response.add_log_tag("partial", json!(true));
        response.set_status(Status::Ok);

        response.set_internal_server_error("handler crashed");

        let headers = response.headers();
        assert!(headers.iter().any(|(k, _)| k == "X-TraceId"));
        assert!(!headers.iter().any(|(k, _)| k == "X-Partial"));
        assert!(headers.iter().any(|(k, v)| k == "Error" && v == "handler crashed"));
        assert_eq!(response.status(), Some(Status::InternalServerError));
        assert_eq!(response.log_tags().get("partial"), None);
    }

    #[test]
    fn finish_computes_content_length() {
        let mut response = Response::new("4bf92f3577b34da6a3ce929d0e0e4736");
        response.set_status(Status::Ok);
        response.set_body("application/json", Bytes::from_static(b"{\"a\":1}"));
        let finished = response.finish();
        assert_eq!(finished.header("Content-Length"), Some("7"));
        assert_eq!(finished.status_line(), "200 Ok");
    }

    #[test]
    fn log_tags_include_status_code() {
        let mut response = Response::new("4bf92f3577b34da6a3ce929d0e0e4736");
        response.add_log_tag("url.id", json!("42"));
        response.set_status(Status::NotFound);
        let tags = response.log_tags();
        assert_eq!(tags["http.status"], json!(404));
        assert_eq!(tags["url.id"], json!("42"));
    }
}
