use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{json, Map, Value};

use gatehouse_net::prelude::{CallScope, OutboundCaller};
use gatehouse_observe::prelude::{LogBuilder, LogLevel, Logger, ObserveCtx};
use gatehouse_types::prelude::{unix_now, Status, TraceContext};

use crate::deadline::{Deadline, DEFAULT_GATEWAY_TIMEOUT_SECS};
use crate::dispatcher::dispatch;
use crate::docs::DocResponder;
use crate::request::InboundRequest;
use crate::response::{FinishedResponse, Response};
use crate::router::Router;
use crate::scope::RequestScope;

/// The per-request pipeline: caller reset, trace construction, deadline
/// enforcement, dispatch, completion logging, crash containment.
pub struct GateService {
    service: String,
    router: Router,
    logger: Arc<dyn Logger>,
    caller: Arc<OutboundCaller>,
    default_budget_secs: u64,
    docs: Option<Arc<dyn DocResponder>>,
}

impl GateService {
    pub fn new(
        service: impl Into<String>,
        router: Router,
        logger: Arc<dyn Logger>,
        caller: Arc<OutboundCaller>,
    ) -> Self {
        Self {
            service: service.into(),
            router,
            logger,
            caller,
            default_budget_secs: DEFAULT_GATEWAY_TIMEOUT_SECS,
            docs: None,
        }
    }

    pub fn with_default_budget_secs(mut self, secs: u64) -> Self {
        self.default_budget_secs = secs;
        self
    }

    pub fn with_docs(mut self, docs: Arc<dyn DocResponder>) -> Self {
        self.docs = Some(docs);
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handle one inbound request end to end. Never returns an error and
    /// never panics past this boundary: a pipeline crash becomes a
    /// best-effort 500 plus a stderr record in case the structured logger
    /// itself is the problem.
    pub async fn handle(&self, request: InboundRequest) -> FinishedResponse {
        // The caller table is shared across requests; reset it before
        // anything else so no earlier call can resolve into this request.
        self.caller.clear();

        match AssertUnwindSafe(self.run(&request)).catch_unwind().await {
            Ok(finished) => finished,
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                eprintln!("application crashed - {detail}");
                let logged = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    self.logger.log(
                        &ObserveCtx::new(&self.service),
                        LogBuilder::new(LogLevel::Error, "application crashed")
                            .tag("error", json!(detail))
                            .finish(),
                    );
                }));
                if logged.is_err() {
                    eprintln!("application crashed - structured logger failed");
                }
                crash_response(&detail)
            }
        }
    }

    async fn run(&self, request: &InboundRequest) -> FinishedResponse {
        let trace = TraceContext::from_header(request.header("traceparent"));
        let client = request
            .header("x-client")
            .or_else(|| request.header("user-agent"))
            .map(str::to_string);
        let octx = ObserveCtx::new(&self.service)
            .with_trace(trace.clone())
            .with_client(client);
        let req_info = request_tags(request);
        let mut response = Response::new(&trace.trace_id);

        let now = unix_now();
        match Deadline::resolve(now, request.header("x-timeout"), self.default_budget_secs) {
            Err(err) => {
                response.set_bad_request(&err.0.message_user);
            }
            Ok(deadline) => {
                let scope = RequestScope::new(
                    trace,
                    deadline,
                    octx.clone(),
                    Arc::clone(&self.logger),
                    CallScope::new(
                        Arc::clone(&self.caller),
                        octx.clone(),
                        Arc::clone(&self.logger),
                    ),
                );
                let dispatched = deadline
                    .enforce(
                        now,
                        dispatch(
                            &self.router,
                            self.docs.as_deref(),
                            &scope,
                            request,
                            &mut response,
                        ),
                    )
                    .await;
                if dispatched.is_err() {
                    // outstanding outbound calls are abandoned here; their
                    // own per-call timeouts bound the callee side
                    response.set_timeout();
                }
            }
        }

        let mut tags = req_info;
        for (key, value) in response.log_tags() {
            tags.insert(key, value);
        }
        self.logger.log(
            &octx,
            LogBuilder::new(LogLevel::Info, "request complete")
                .tags(tags)
                .finish(),
        );

        response.finish()
    }
}

fn request_tags(request: &InboundRequest) -> Map<String, Value> {
    let mut tags = Map::new();
    tags.insert("http.method".to_string(), json!(request.method));
    tags.insert("url.path".to_string(), json!(request.path));
    tags.insert("url.port".to_string(), json!(request.port));
    tags.insert("url.host".to_string(), json!(request.host));
    if let Some(content_type) = &request.content_type {
        tags.insert("http.content_type".to_string(), json!(content_type));
    }
    if !request.body.is_empty() {
        tags.insert(
            "http.req_content_length".to_string(),
            json!(request.body.len()),
        );
    }
    tags
}

fn crash_response(detail: &str) -> FinishedResponse {
    FinishedResponse {
        status: Status::InternalServerError,
        headers: vec![
            ("Error".to_string(), detail.to_string()),
            ("Content-Length".to_string(), "0".to_string()),
        ],
        body: bytes::Bytes::new(),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}
