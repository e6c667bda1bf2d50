//! Test transport with scripted responses and hold points.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::transport::CallTransport;
use crate::types::{CallRequest, CallResponse, CallResult};

/// Responses are keyed by the slash-joined path segments. A gated path
/// does not respond until its gate is released, which lets tests force
/// completions out of submission order.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, CallResult>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    seen: Mutex<Vec<CallRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, result: CallResult) {
        self.responses.lock().insert(path.to_string(), result);
    }

    /// The returned gate must be notified before `send` for `path` will
    /// answer.
    pub fn gate(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(path.to_string(), Arc::clone(&gate));
        gate
    }

    /// Requests observed so far, submission order.
    pub fn seen(&self) -> Vec<CallRequest> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl CallTransport for MockTransport {
    async fn send(&self, request: CallRequest) -> CallResult {
        let key = request.path();
        self.seen.lock().push(request);

        let gate = self.gates.lock().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.responses
            .lock()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| {
                Ok(CallResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: Bytes::new(),
                })
            })
    }
}
