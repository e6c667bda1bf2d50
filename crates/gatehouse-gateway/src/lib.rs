pub mod adapter;
pub mod config;
pub mod doc;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use gatehouse_api::prelude::{ApiAdapter, ApiDescriptor};
use gatehouse_dispatch::prelude::{GateService, HandlerObject, Router};
use gatehouse_net::prelude::OutboundCaller;
use gatehouse_observe::prelude::{Logger, StdoutLogger};

use crate::config::GatewayConfig;
use crate::doc::JsonDocResponder;

/// A configured gateway: routes, logger, outbound caller and the axum
/// adapter around the dispatch pipeline.
pub struct Gateway {
    service: Arc<GateService>,
}

pub struct GatewayBuilder {
    service_name: String,
    router: Router,
    logger: Arc<dyn Logger>,
    caller: Option<Arc<OutboundCaller>>,
    default_budget_secs: u64,
}

impl GatewayBuilder {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            router: Router::new(),
            logger: Arc::new(StdoutLogger),
            caller: None,
            default_budget_secs: config::default_gateway_timeout_secs(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_caller(mut self, caller: Arc<OutboundCaller>) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_default_budget_secs(mut self, secs: u64) -> Self {
        self.default_budget_secs = secs;
        self
    }

    pub fn route(
        mut self,
        api: ApiDescriptor,
        adapter: Arc<dyn ApiAdapter>,
        handler: HandlerObject,
    ) -> anyhow::Result<Self> {
        self.router.add(api, adapter, handler)?;
        Ok(self)
    }

    pub fn build(self) -> anyhow::Result<Gateway> {
        let caller = match self.caller {
            Some(caller) => caller,
            None => OutboundCaller::reqwest().context("couldn't build the outbound caller")?,
        };
        let service = GateService::new(self.service_name, self.router, self.logger, caller)
            .with_default_budget_secs(self.default_budget_secs)
            .with_docs(Arc::new(JsonDocResponder));
        Ok(Gateway {
            service: Arc::new(service),
        })
    }
}

impl Gateway {
    pub fn builder(service_name: impl Into<String>) -> GatewayBuilder {
        GatewayBuilder::new(service_name)
    }

    /// Builder preconfigured from the loaded configuration.
    pub fn builder_from_config(
        service_name: impl Into<String>,
        config: &GatewayConfig,
    ) -> GatewayBuilder {
        GatewayBuilder::new(service_name).with_default_budget_secs(config.gateway_timeout_secs)
    }

    pub fn service(&self) -> Arc<GateService> {
        Arc::clone(&self.service)
    }

    pub fn axum_router(&self) -> axum::Router {
        adapter::axum_router(self.service())
    }

    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind to {addr}"))?;
        tracing::info!(%addr, "gateway listening");
        axum::serve(listener, self.axum_router().into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("gateway server failure")?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("could not install the shutdown signal handler");
    }
}
