use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::{json, Value};

use gatehouse_api::prelude::{ParamMap, PathValues};
use gatehouse_observe::prelude::{LogBuilder, LogLevel};
use gatehouse_types::prelude::Status;

use crate::docs::{DocResponder, DOC_PREFIX};
use crate::handler::{HandlerRequest, ResponseHead};
use crate::pipeline::panic_message;
use crate::request::InboundRequest;
use crate::response::Response;
use crate::router::{Route, Router};
use crate::scope::RequestScope;

/// Route the request and run the matched handler through the dispatch
/// states. Every outcome lands in `response`; nothing propagates past this
/// boundary.
pub async fn dispatch(
    router: &Router,
    docs: Option<&dyn DocResponder>,
    scope: &RequestScope,
    request: &InboundRequest,
    response: &mut Response,
) {
    if let Some(docs) = docs {
        if request.method == "GET" && request.path.starts_with(DOC_PREFIX) {
            docs.respond(request, router, response);
            return;
        }
    }

    let Some((route, values)) = router.match_path(&request.path) else {
        response.set_not_found();
        return;
    };

    for (n, part) in values.segments().iter().enumerate() {
        response.add_log_tag(&format!("url.path.{n}"), Value::String(part.clone()));
    }

    if request.method == "OPTIONS" {
        describe_route(route, response);
        return;
    }

    if !route.api.allows_method(&request.method) {
        // deliberate policy: a matched path with a disallowed method is
        // indistinguishable from no route at all
        response.set_not_found();
        return;
    }

    invoke_route(route, values, scope, request, response).await;
}

/// `OPTIONS` answers with the route's machine-readable description and
/// never reaches the handler.
fn describe_route(route: &Route, response: &mut Response) {
    if response.set_json(&route.api.describe()).is_err() {
        response.set_internal_server_error("couldn't describe route");
        return;
    }
    response.set_status(Status::Ok);
}

async fn invoke_route(
    route: &Route,
    values: PathValues,
    scope: &RequestScope,
    request: &InboundRequest,
    response: &mut Response,
) {
    // ParamBuild
    let params = match route.adapter.build_params(&route.api, &request.raw_query) {
        Ok(params) => params,
        Err(err) => {
            response.set_bad_request(&format!("invalid params - {}", err.0.message_user));
            return;
        }
    };

    // LogEnrich: best effort, never fails the request
    enrich_param_tags(&params, response);

    // BodyBuild
    let body = match route.adapter.build_request_body(
        &route.api,
        request.content_type.as_deref(),
        &request.body,
    ) {
        Ok(body) => body,
        Err(err) => {
            response.set_bad_request(&format!("invalid body - {}", err.0.message_user));
            return;
        }
    };

    // Invoke
    let handler_request = HandlerRequest {
        path: values,
        params,
        headers: request.headers.clone(),
        body,
    };
    let invoked = {
        let mut head = ResponseHead::new(response);
        AssertUnwindSafe(route.handler.handle(scope, handler_request, &mut head))
            .catch_unwind()
            .await
    };
    let payload = match invoked {
        Ok(Ok(payload)) => payload,
        Ok(Err(err)) => {
            scope.log(
                LogBuilder::new(LogLevel::Error, "handler crashed")
                    .tag("error", json!(format!("{err:#}")))
                    .finish(),
            );
            response.set_internal_server_error("handler crashed");
            return;
        }
        Err(panic) => {
            scope.log(
                LogBuilder::new(LogLevel::Error, "handler crashed")
                    .tag("error", json!(panic_message(panic.as_ref())))
                    .finish(),
            );
            response.set_internal_server_error("handler crashed");
            return;
        }
    };

    // StatusValidate
    let status = response.status().unwrap_or(Status::Ok);
    response.set_status(status);
    if !route.api.allows_status(status) {
        scope.log(LogBuilder::new(LogLevel::Error, "invalid status code from handler").finish());
        response.set_internal_server_error("unregistered status code");
        return;
    }

    // ResponseBuild
    match route.adapter.build_response(&route.api, payload) {
        Ok((content_type, body)) => response.set_payload(content_type, body),
        Err(err) => {
            scope.log(
                LogBuilder::new(LogLevel::Error, "invalid response body")
                    .tag("error", json!(err.0.detail()))
                    .finish(),
            );
            response.set_internal_server_error("invalid response body");
        }
    }
}

fn enrich_param_tags(params: &ParamMap, response: &mut Response) {
    for (key, vals) in params {
        if vals.len() == 1 {
            response.add_log_tag(&format!("url.{key}"), scalar_tag(&vals[0]));
        } else {
            for (n, val) in vals.iter().enumerate() {
                response.add_log_tag(&format!("url.{key}.{n}"), scalar_tag(val));
            }
        }
    }
}

/// Scalars log as-is; anything structured is stringified.
fn scalar_tag(value: &Value) -> Value {
    if value.is_object() || value.is_array() {
        Value::String(value.to_string())
    } else {
        value.clone()
    }
}
