use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::Response as AxumResponse;

use gatehouse_dispatch::prelude::{FinishedResponse, GateService, InboundRequest};

/// Upper bound on buffered request bodies.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Every path funnels through the dispatch pipeline; axum only carries
/// bytes in and out.
pub fn axum_router(service: Arc<GateService>) -> axum::Router {
    axum::Router::new()
        .fallback(handle_any)
        .with_state(service)
}

async fn handle_any(
    State(service): State<Arc<GateService>>,
    request: Request<Body>,
) -> AxumResponse {
    let inbound = into_inbound(request).await;
    let finished = service.handle(inbound).await;
    into_axum(finished)
}

async fn into_inbound(request: Request<Body>) -> InboundRequest {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .unwrap_or_default();

    let mut headers = Vec::new();
    for (key, value) in parts.headers.iter() {
        if let Ok(value) = value.to_str() {
            headers.push((key.as_str().to_string(), value.to_string()));
        }
    }

    let content_type = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.clone());
    let (host, port) = host_and_port(&headers);

    InboundRequest {
        method: parts.method.as_str().to_string(),
        path: parts.uri.path().to_string(),
        raw_query: parts.uri.query().unwrap_or_default().to_string(),
        headers,
        content_type,
        body,
        host,
        port,
    }
}

fn host_and_port(headers: &[(String, String)]) -> (String, u16) {
    let raw = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("host"))
        .map(|(_, value)| value.as_str())
        .unwrap_or_default();
    match raw.rsplit_once(':') {
        Some((host, port)) => (
            host.to_string(),
            port.parse().unwrap_or(80),
        ),
        None => (raw.to_string(), 80),
    }
}

fn into_axum(finished: FinishedResponse) -> AxumResponse {
    let status = StatusCode::from_u16(finished.status.code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = AxumResponse::builder().status(status);
    for (key, value) in &finished.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
        .body(Body::from(finished.body))
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not build transport response");
            AxumResponse::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::empty())
                .unwrap_or_default()
        })
}
