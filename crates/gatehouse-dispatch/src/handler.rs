use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use gatehouse_api::prelude::{ParamMap, PathValues, Payload};
use gatehouse_types::prelude::Status;

use crate::response::Response;
use crate::scope::RequestScope;

/// What a handler receives: bound path values, decoded params, the raw
/// header set and the decoded body.
#[derive(Debug)]
pub struct HandlerRequest {
    pub path: PathValues,
    pub params: ParamMap,
    pub headers: Vec<(String, String)>,
    pub body: Payload,
}

impl HandlerRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Restricted response capability handed to handlers: status, extra
/// headers and log tags - never the body, which goes through the route's
/// response adapter.
pub struct ResponseHead<'a> {
    response: &'a mut Response,
}

impl<'a> ResponseHead<'a> {
    pub(crate) fn new(response: &'a mut Response) -> Self {
        Self { response }
    }

    pub fn set(&mut self, status: Status, headers: Vec<(String, String)>) {
        self.response.resp_head(status, headers);
    }

    pub fn set_status(&mut self, status: Status) {
        self.response.set_status(status);
    }

    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.response.add_header(key, value);
    }

    pub fn add_log_tag(&mut self, key: &str, value: Value) {
        self.response.add_log_tag(key, value);
    }
}

/// A route's business logic. The returned payload is passed through the
/// route's response adapter; any error (or panic) becomes an internal
/// server error and discards whatever head state was already set.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        scope: &RequestScope,
        request: HandlerRequest,
        head: &mut ResponseHead<'_>,
    ) -> anyhow::Result<Payload>;
}

pub type HandlerObject = Arc<dyn Handler>;
