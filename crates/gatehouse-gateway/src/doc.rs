use serde_json::json;

use gatehouse_dispatch::prelude::{DocResponder, InboundRequest, Response, Router, DOC_PREFIX};
use gatehouse_types::prelude::Status;

use crate::config::documented_vars;

/// Machine-readable introspection under the reserved `/doc` prefix: a
/// route index, per-route descriptors and the documented configuration
/// variables.
pub struct JsonDocResponder;

impl DocResponder for JsonDocResponder {
    fn respond(&self, request: &InboundRequest, router: &Router, response: &mut Response) {
        let sub = request.path.strip_prefix(DOC_PREFIX).unwrap_or_default();
        match sub {
            "" | "/" | "/index.json" => index(router, response),
            "/env" => env_catalog(response),
            "/route" => route_detail(request, router, response),
            _ => response.set_not_found(),
        }
    }
}

fn index(router: &Router, response: &mut Response) {
    let routes: Vec<_> = router
        .routes()
        .iter()
        .map(|route| {
            json!({
                "id": route.api.id(),
                "name": route.api.name(),
                "methods": route.api.methods,
            })
        })
        .collect();
    finish_json(response, &json!({ "routes": routes }));
}

fn env_catalog(response: &mut Response) {
    let vars: Vec<_> = documented_vars()
        .iter()
        .map(|var| {
            json!({
                "name": var.name,
                "default": var.default,
                "doc": var.doc,
            })
        })
        .collect();
    finish_json(response, &json!({ "vars": vars }));
}

fn route_detail(request: &InboundRequest, router: &Router, response: &mut Response) {
    let values: Vec<String> = url::form_urlencoded::parse(request.raw_query.as_bytes())
        .filter(|(key, _)| key == "route")
        .map(|(_, value)| value.into_owned())
        .collect();
    let [route_id] = values.as_slice() else {
        response.set_bad_request("invalid route");
        return;
    };

    match router
        .routes()
        .iter()
        .find(|route| route.api.id() == route_id)
    {
        Some(route) => finish_json(response, &route.api.describe()),
        None => response.set_bad_request("couldn't find route"),
    }
}

fn finish_json(response: &mut Response, value: &serde_json::Value) {
    if response.set_json(value).is_err() {
        response.set_internal_server_error("couldn't render documentation");
        return;
    }
    response.set_status(Status::Ok);
}
