use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use gatehouse_api::prelude::{ApiDescriptor, JsonApi, PathTemplate, Payload};
use gatehouse_dispatch::prelude::{Handler, HandlerRequest, RequestScope, ResponseHead};
use gatehouse_gateway::Gateway;
use gatehouse_net::prelude::CallRequest;
use gatehouse_observe::prelude::{Logger, MemoryLogger};

const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

struct UserHandler;

#[async_trait]
impl Handler for UserHandler {
    async fn handle(
        &self,
        _scope: &RequestScope,
        request: HandlerRequest,
        _head: &mut ResponseHead<'_>,
    ) -> anyhow::Result<Payload> {
        let id = request.path.get("id").unwrap_or("").to_string();
        Ok(Payload::Json(json!({ "id": id })))
    }
}

struct RelayHandler {
    upstream: SocketAddr,
}

#[async_trait]
impl Handler for RelayHandler {
    async fn handle(
        &self,
        scope: &RequestScope,
        _request: HandlerRequest,
        _head: &mut ResponseHead<'_>,
    ) -> anyhow::Result<Payload> {
        let mut call = CallRequest::get(
            self.upstream.ip().to_string(),
            vec!["users".to_string(), "7".to_string()],
        );
        call.port = self.upstream.port();
        let mut future = scope.calls().submit(call);
        let outcome = future.wait_or_raise().await?;
        let response = outcome
            .response()
            .ok_or_else(|| anyhow::anyhow!("missing upstream response"))?;
        Ok(Payload::Json(json!({ "upstream": response.status })))
    }
}

fn users_api() -> ApiDescriptor {
    ApiDescriptor::new(
        "directory",
        vec!["GET".into()],
        PathTemplate::from_parts(&["users", ":id"]),
    )
    .with_response_schema(json!({
        "type": "object",
        "required": ["id"],
        "properties": { "id": { "type": "string" } },
    }))
    .expect("schema compiles")
}

fn directory_gateway(logger: Arc<MemoryLogger>) -> Gateway {
    Gateway::builder("directory")
        .with_logger(logger as Arc<dyn Logger>)
        .route(users_api(), Arc::new(JsonApi), Arc::new(UserHandler))
        .expect("route registers")
        .build()
        .expect("gateway builds")
}

async fn spawn(gateway: Gateway) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test port");
    let addr = listener.local_addr().expect("local addr");
    let router = gateway.axum_router();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router.into_make_service()).await;
    });
    addr
}

#[tokio::test]
async fn round_trip_binds_path_and_stamps_trace() {
    let logger = Arc::new(MemoryLogger::new());
    let addr = spawn(directory_gateway(Arc::clone(&logger))).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/users/42"))
        .header("traceparent", TRACEPARENT)
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("X-TraceId")
            .and_then(|value| value.to_str().ok()),
        Some("4bf92f3577b34da6a3ce929d0e0e4736")
    );
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body, json!({ "id": "42" }));

    let records = logger.with_msg("request complete");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["trace_id"], "4bf92f3577b34da6a3ce929d0e0e4736");
    assert_eq!(records[0]["parent_id"], "00f067aa0ba902b7");
    assert_eq!(records[0]["http.status"], 200);
}

#[tokio::test]
async fn unknown_path_and_wrong_method_are_not_found() {
    let logger = Arc::new(MemoryLogger::new());
    let addr = spawn(directory_gateway(logger)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/nope"))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .post(format!("http://{addr}/users/42"))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn options_serves_the_descriptor() {
    let logger = Arc::new(MemoryLogger::new());
    let addr = spawn(directory_gateway(logger)).await;
    let client = reqwest::Client::new();

    let response = client
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/users/42"))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["name"], "users/:id");
    assert_eq!(body["methods"], json!(["GET"]));
    assert_eq!(body["status_codes"], json!([200]));
}

#[tokio::test]
async fn stale_deadline_is_rejected() {
    let logger = Arc::new(MemoryLogger::new());
    let addr = spawn(directory_gateway(logger)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/users/42"))
        .header("X-Timeout", "5")
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        response
            .headers()
            .get("Error")
            .and_then(|value| value.to_str().ok()),
        Some("timeout is in the past")
    );
}

#[tokio::test]
async fn doc_prefix_serves_route_index_and_detail() {
    let logger = Arc::new(MemoryLogger::new());
    let addr = spawn(directory_gateway(logger)).await;
    let client = reqwest::Client::new();

    let index: Value = client
        .get(format!("http://{addr}/doc"))
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .expect("json body");
    let routes = index["routes"].as_array().expect("route list");
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["name"], "users/:id");
    let route_id = routes[0]["id"].as_str().expect("route id").to_string();

    let detail: Value = client
        .get(format!("http://{addr}/doc/route?route={route_id}"))
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .expect("json body");
    assert_eq!(detail["id"], route_id.as_str());
    assert_eq!(detail["methods"], json!(["GET"]));

    let response = client
        .get(format!("http://{addr}/doc/route?route=unknown"))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status().as_u16(), 400);

    let env: Value = client
        .get(format!("http://{addr}/doc/env"))
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .expect("json body");
    assert!(env["vars"]
        .as_array()
        .expect("vars")
        .iter()
        .any(|var| var["name"] == "GATEHOUSE__GATEWAY_TIMEOUT_SECS"));
}

#[tokio::test]
async fn outbound_call_propagates_the_trace_downstream() {
    let upstream_logger = Arc::new(MemoryLogger::new());
    let upstream_addr = spawn(directory_gateway(Arc::clone(&upstream_logger))).await;

    let relay_logger = Arc::new(MemoryLogger::new());
    let relay = Gateway::builder("relay")
        .with_logger(Arc::clone(&relay_logger) as Arc<dyn Logger>)
        .route(
            ApiDescriptor::new(
                "relay",
                vec!["GET".into()],
                PathTemplate::from_parts(&["relay"]),
            )
            .with_response_schema(json!({ "type": "object" }))
            .expect("schema compiles"),
            Arc::new(JsonApi),
            Arc::new(RelayHandler {
                upstream: upstream_addr,
            }),
        )
        .expect("route registers")
        .build()
        .expect("gateway builds");
    let relay_addr = spawn(relay).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{relay_addr}/relay"))
        .header("traceparent", TRACEPARENT)
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body, json!({ "upstream": 200 }));

    // the upstream request joined the same trace
    let upstream_records = upstream_logger.with_msg("request complete");
    assert_eq!(upstream_records.len(), 1);
    assert_eq!(
        upstream_records[0]["trace_id"],
        "4bf92f3577b34da6a3ce929d0e0e4736"
    );
    assert!(upstream_records[0]["parent_id"].as_str().is_some());

    let call_records = relay_logger.with_msg("call complete");
    assert_eq!(call_records.len(), 1);
    assert_eq!(call_records[0]["http.code"], 200);
    assert_eq!(call_records[0]["url.path"], "users/7");
}

#[tokio::test]
async fn slow_handler_returns_gateway_timeout() {
    struct SlowHandler;

    #[async_trait]
    impl Handler for SlowHandler {
        async fn handle(
            &self,
            _scope: &RequestScope,
            _request: HandlerRequest,
            _head: &mut ResponseHead<'_>,
        ) -> anyhow::Result<Payload> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(Payload::Empty)
        }
    }

    let gateway = Gateway::builder("slow")
        .with_logger(Arc::new(MemoryLogger::new()) as Arc<dyn Logger>)
        .with_default_budget_secs(1)
        .route(
            ApiDescriptor::new(
                "slow",
                vec!["GET".into()],
                PathTemplate::from_parts(&["slow"]),
            ),
            Arc::new(JsonApi),
            Arc::new(SlowHandler),
        )
        .expect("route registers")
        .build()
        .expect("gateway builds");
    let addr = spawn(gateway).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/slow"))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status().as_u16(), 504);
    assert_eq!(
        response
            .headers()
            .get("Error")
            .and_then(|value| value.to_str().ok()),
        Some("application timeout")
    );
}
