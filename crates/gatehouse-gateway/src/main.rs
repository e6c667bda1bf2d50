use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use gatehouse_api::prelude::{ApiDescriptor, JsonApi, PathTemplate, Payload, RawApi};
use gatehouse_dispatch::prelude::{Handler, HandlerRequest, RequestScope, ResponseHead};
use gatehouse_gateway::config::GatewayConfig;
use gatehouse_gateway::Gateway;

struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(
        &self,
        _scope: &RequestScope,
        _request: HandlerRequest,
        _head: &mut ResponseHead<'_>,
    ) -> anyhow::Result<Payload> {
        Ok(Payload::Empty)
    }
}

struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(
        &self,
        _scope: &RequestScope,
        request: HandlerRequest,
        _head: &mut ResponseHead<'_>,
    ) -> anyhow::Result<Payload> {
        let body = request
            .body
            .as_json()
            .cloned()
            .unwrap_or_else(|| json!({}));
        Ok(Payload::Json(json!({ "echo": body })))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = GatewayConfig::load()?;

    let gateway = Gateway::builder_from_config("gatehouse-demo", &config)
        .route(
            ApiDescriptor::new(
                "gatehouse-demo",
                vec!["GET".into()],
                PathTemplate::from_parts(&["ping"]),
            ),
            Arc::new(RawApi),
            Arc::new(PingHandler),
        )?
        .route(
            ApiDescriptor::new(
                "gatehouse-demo",
                vec!["POST".into()],
                PathTemplate::from_parts(&["echo"]),
            )
            .with_request_schema(json!({ "type": "object" }))?
            .with_response_schema(json!({
                "type": "object",
                "required": ["echo"],
            }))?,
            Arc::new(JsonApi),
            Arc::new(EchoHandler),
        )?
        .build()?;

    let addr: SocketAddr = format!("{}:{}", config.server.address, config.server.port)
        .parse()
        .context("invalid server address/port")?;

    gateway.serve(addr).await
}

fn init_tracing() {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .finish(),
    )
    .is_err()
    {
        // Subscriber already set by tests or an external runtime.
    }
}
