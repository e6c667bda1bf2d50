use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::errors::NetError;
use crate::types::{CallFailure, CallRequest, CallResponse, CallResult, FailureKind};

/// Seam between the call registry and the wire. Completions may arrive in
/// any order; each call resolves independently of the others.
#[async_trait]
pub trait CallTransport: Send + Sync {
    async fn send(&self, request: CallRequest) -> CallResult;
}

/// Production transport over a shared `reqwest` client: rustls, no
/// redirects, gzip, per-call overall timeout.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, NetError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .gzip(true)
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| {
                NetError::provider_unavailable(&format!("failed to build http client: {err}"))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CallTransport for ReqwestTransport {
    async fn send(&self, request: CallRequest) -> CallResult {
        let url = build_url(&request)?;
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|err| {
            CallFailure {
                action: "couldn't create call",
                kind: FailureKind::Protocol,
                detail: err.to_string(),
            }
        })?;

        let mut builder = self
            .client
            .request(method, url)
            .timeout(request.timeout)
            .header("Cache-Control", "no-cache");
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|err| classify("couldn't send request", err))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(key, value)| {
                (
                    key.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|err| classify("couldn't receive response", err))?;

        Ok(CallResponse {
            status,
            headers,
            body,
        })
    }
}

fn build_url(request: &CallRequest) -> Result<Url, CallFailure> {
    let scheme = if request.use_tls { "https" } else { "http" };
    let mut url = Url::parse(&format!("{scheme}://{}:{}/", request.host, request.port)).map_err(
        |err| CallFailure {
            action: "couldn't create call",
            kind: FailureKind::Protocol,
            detail: err.to_string(),
        },
    )?;

    {
        let mut segments = url.path_segments_mut().map_err(|()| CallFailure {
            action: "couldn't create call",
            kind: FailureKind::Protocol,
            detail: "host does not accept a path".to_string(),
        })?;
        segments.clear();
        for segment in &request.path_segms {
            segments.push(segment);
        }
    }

    for (key, value) in &request.params {
        url.query_pairs_mut().append_pair(key, value);
    }

    Ok(url)
}

fn classify(action: &'static str, err: reqwest::Error) -> CallFailure {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_connect() {
        FailureKind::Connect
    } else {
        FailureKind::Protocol
    };
    CallFailure {
        action,
        kind,
        detail: err.to_string(),
    }
}
