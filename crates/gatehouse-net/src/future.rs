use std::sync::Arc;

use serde_json::{json, Map, Value};

use gatehouse_observe::prelude::{LogBuilder, LogLevel, Logger, ObserveCtx};

use crate::caller::OutboundCaller;
use crate::errors::NetError;
use crate::types::{CallOutcome, CallRecv, CallRequest};

/// Completion transform attached at submission. Receives the successful
/// raw response; its output replaces the raw result as the call's value.
pub type OnComplete = Box<dyn FnOnce(&crate::types::CallResponse) -> anyhow::Result<Value> + Send>;

/// Handle to one in-flight outbound call. Owned by the submitting request;
/// once the request completes the handle (and anything the registry still
/// tracks for it) becomes garbage.
pub struct CallFuture {
    id: i64,
    caller: Arc<OutboundCaller>,
    submit_tags: Map<String, Value>,
    on_complete: Option<OnComplete>,
    outcome: Option<CallOutcome>,
    logger: Arc<dyn Logger>,
    octx: ObserveCtx,
}

impl CallFuture {
    pub(crate) fn new(
        id: i64,
        caller: Arc<OutboundCaller>,
        submit_tags: Map<String, Value>,
        on_complete: Option<OnComplete>,
        logger: Arc<dyn Logger>,
        octx: ObserveCtx,
    ) -> Self {
        Self {
            id,
            caller,
            submit_tags,
            on_complete,
            outcome: None,
            logger,
            octx,
        }
    }

    /// The opaque reference this handle resolves through.
    pub fn ref_id(&self) -> i64 {
        self.id
    }

    /// Non-blocking readiness check. The first call that observes the
    /// completion caches the outcome and emits the `call complete` record.
    pub fn is_ready(&mut self) -> bool {
        if self.outcome.is_some() {
            return true;
        }
        if let Some(recv) = self.caller.poll_ready(self.id) {
            self.resolve(recv);
            return true;
        }
        false
    }

    /// Wait for this call only. Other calls resolving in the meantime wake
    /// the wait but do not satisfy it. Waiting on a call the registry no
    /// longer tracks is a contract violation.
    pub async fn wait(&mut self) -> Result<CallOutcome, NetError> {
        loop {
            if let Some(outcome) = &self.outcome {
                return Ok(outcome.clone());
            }

            let caller = Arc::clone(&self.caller);
            let notified = caller.notified();
            tokio::pin!(notified);
            // register before the re-check; a completion landing in
            // between would otherwise never wake this wait
            notified.as_mut().enable();

            if let Some(recv) = self.caller.poll_ready(self.id) {
                self.resolve(recv);
                continue;
            }
            if !self.caller.is_tracked(self.id) {
                return Err(NetError::contract("wait returned without a ready call"));
            }

            notified.await;
        }
    }

    /// As `wait`, but a captured transport failure propagates as an error
    /// instead of being returned as a value.
    pub async fn wait_or_raise(&mut self) -> Result<CallOutcome, NetError> {
        let outcome = self.wait().await?;
        if let CallOutcome::Raw(Err(failure)) = &outcome {
            return Err(NetError::from_failure(failure));
        }
        Ok(outcome)
    }

    fn resolve(&mut self, recv: CallRecv) {
        let mut tags = self.submit_tags.clone();
        match &recv.result {
            Ok(response) => {
                tags.insert("http.code".to_string(), json!(response.status));
                tags.insert(
                    "http.resp_content_length".to_string(),
                    json!(response.body.len()),
                );
            }
            Err(failure) => {
                tags.insert("error".to_string(), json!(failure.to_string()));
            }
        }
        self.logger.log(
            &self.octx,
            LogBuilder::new(LogLevel::Info, "call complete")
                .tags(tags)
                .finish(),
        );

        let outcome = match (recv.result, self.on_complete.take()) {
            (Ok(response), Some(transform)) => match transform(&response) {
                Ok(value) => CallOutcome::Transformed(value),
                Err(err) => CallOutcome::Fallback {
                    raw: Ok(response),
                    transform_error: err.to_string(),
                },
            },
            (result, _) => CallOutcome::Raw(result),
        };
        self.outcome = Some(outcome);
    }
}

/// Convenience for submitting a JSON call: serializes the body and sets the
/// content type.
pub fn json_call(mut request: CallRequest, body: &Value) -> Result<CallRequest, NetError> {
    request.body = serde_json::to_vec(body).map_err(|err| {
        NetError::contract(&format!("couldn't serialize call body: {err}"))
    })?;
    request
        .headers
        .push(("Content-Type".to_string(), "application/json".to_string()));
    Ok(request)
}
