use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::json;
use tokio::time::sleep;

use gatehouse_net::mock::MockTransport;
use gatehouse_net::prelude::*;
use gatehouse_observe::prelude::{MemoryLogger, ObserveCtx};
use gatehouse_types::prelude::TraceContext;

fn scope_with(
    transport: Arc<MockTransport>,
) -> (CallScope, Arc<OutboundCaller>, Arc<MemoryLogger>) {
    let caller = OutboundCaller::new(transport);
    let logger = Arc::new(MemoryLogger::new());
    let octx = ObserveCtx::new("checkout")
        .with_trace(TraceContext {
            trace_id: "4bf92f3577b34da6a3ce929d0e0e4736".into(),
            parent_id: None,
            span_id: "a1b2c3d4e5f60718".into(),
        })
        .with_client(Some("orders-svc".into()));
    let scope = CallScope::new(
        Arc::clone(&caller),
        octx,
        Arc::clone(&logger) as Arc<dyn gatehouse_observe::prelude::Logger>,
    );
    (scope, caller, logger)
}

fn request(path: &str) -> CallRequest {
    CallRequest::get(
        "billing.internal",
        path.split('/').map(str::to_string).collect(),
    )
}

#[tokio::test]
async fn calls_resolve_out_of_submission_order() {
    let transport = MockTransport::new();
    transport.respond(
        "a",
        Ok(CallResponse {
            status: 200,
            headers: vec![],
            body: Bytes::from_static(b"first"),
        }),
    );
    transport.respond(
        "b",
        Ok(CallResponse {
            status: 201,
            headers: vec![],
            body: Bytes::from_static(b"second"),
        }),
    );
    let gate = transport.gate("a");
    let (scope, _caller, _logger) = scope_with(transport);

    let mut f1 = scope.submit(request("a"));
    let mut f2 = scope.submit(request("b"));

    let outcome = f2.wait().await.expect("f2 resolves first");
    match outcome {
        CallOutcome::Raw(Ok(response)) => assert_eq!(response.status, 201),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(!f1.is_ready());

    gate.notify_one();
    let outcome = f1.wait().await.expect("f1 resolves after release");
    match outcome {
        CallOutcome::Raw(Ok(response)) => assert_eq!(response.body.as_ref(), b"first"),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn clear_isolates_requests_from_stale_futures() {
    let transport = MockTransport::new();
    let gate = transport.gate("a");
    let (scope, caller, _logger) = scope_with(transport);

    let mut stale = scope.submit(request("a"));

    // next request begins: the table is reset before any handler runs
    caller.clear();
    gate.notify_one();
    sleep(Duration::from_millis(50)).await;

    assert!(!stale.is_ready());
    let err = stale.wait().await.expect_err("stale wait is a contract error");
    assert_eq!(err.0.code, gatehouse_errors::codes::CALL_CONTRACT);
}

#[tokio::test]
async fn completion_transform_replaces_the_value() {
    let transport = MockTransport::new();
    transport.respond(
        "a",
        Ok(CallResponse {
            status: 200,
            headers: vec![],
            body: Bytes::from_static(b"{\"total\":7}"),
        }),
    );
    let (scope, _caller, _logger) = scope_with(transport);

    let mut future = scope.submit_with(
        request("a"),
        Some(Box::new(|response| {
            let value = response.json()?;
            Ok(json!({ "doubled": value["total"].as_i64().unwrap_or(0) * 2 }))
        })),
    );

    let outcome = future.wait().await.expect("resolves");
    assert_eq!(outcome.transformed(), Some(&json!({ "doubled": 14 })));
}

#[tokio::test]
async fn failed_transform_keeps_raw_value_tagged() {
    let transport = MockTransport::new();
    transport.respond(
        "a",
        Ok(CallResponse {
            status: 200,
            headers: vec![],
            body: Bytes::from_static(b"not json"),
        }),
    );
    let (scope, _caller, _logger) = scope_with(transport);

    let mut future = scope.submit_with(
        request("a"),
        Some(Box::new(|response| {
            let value = response.json()?;
            Ok(value)
        })),
    );

    let outcome = future.wait().await.expect("resolves");
    match outcome {
        CallOutcome::Fallback {
            raw: Ok(response),
            transform_error,
        } => {
            assert_eq!(response.body.as_ref(), b"not json");
            assert!(!transform_error.is_empty());
        }
        other => panic!("expected fallback, got {other:?}"),
    }
}

#[tokio::test]
async fn transform_is_skipped_on_transport_failure() {
    let transport = MockTransport::new();
    transport.respond(
        "a",
        Err(CallFailure {
            action: "couldn't send request",
            kind: FailureKind::Timeout,
            detail: "deadline elapsed".into(),
        }),
    );
    let (scope, _caller, _logger) = scope_with(transport);

    let mut future = scope.submit_with(request("a"), Some(Box::new(|_| Ok(json!(1)))));
    let outcome = future.wait().await.expect("resolves to a captured failure");
    assert!(matches!(outcome, CallOutcome::Raw(Err(_))));

    let err = future
        .wait_or_raise()
        .await
        .expect_err("failure propagates");
    assert_eq!(err.0.code, gatehouse_errors::codes::NET_TIMEOUT);
}

#[tokio::test]
async fn wait_returns_cached_outcome_on_repeat() {
    let transport = MockTransport::new();
    let (scope, _caller, logger) = scope_with(transport);

    let mut future = scope.submit(request("a"));
    assert!(future.wait().await.is_ok());
    assert!(future.wait().await.is_ok());
    assert!(future.is_ready());

    // one completion record, not one per observation
    assert_eq!(logger.with_msg("call complete").len(), 1);
}

#[tokio::test]
async fn call_complete_record_merges_submission_and_callee_tags() {
    let transport = MockTransport::new();
    transport.respond(
        "invoices/42",
        Ok(CallResponse {
            status: 200,
            headers: vec![],
            body: Bytes::from_static(b"12345"),
        }),
    );
    let (scope, _caller, logger) = scope_with(Arc::clone(&transport));

    let mut call = CallRequest::get(
        "billing.internal",
        vec!["invoices".into(), "42".into()],
    );
    call.port = 8443;
    call.use_tls = true;
    call.body = b"query".to_vec();
    let mut future = scope.submit(call);
    future.wait().await.expect("resolves");

    let records = logger.with_msg("call complete");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["url.host"], "billing.internal");
    assert_eq!(record["url.port"], 8443);
    assert_eq!(record["url.path"], "invoices/42");
    assert_eq!(record["http.req_content_length"], 5);
    assert_eq!(record["http.ssl"], true);
    assert_eq!(record["http.code"], 200);
    assert_eq!(record["http.resp_content_length"], 5);
    assert_eq!(record["trace_id"], "4bf92f3577b34da6a3ce929d0e0e4736");
}

#[tokio::test]
async fn failed_call_record_carries_the_error() {
    let transport = MockTransport::new();
    transport.respond(
        "a",
        Err(CallFailure {
            action: "couldn't send request",
            kind: FailureKind::Connect,
            detail: "connection refused".into(),
        }),
    );
    let (scope, _caller, logger) = scope_with(transport);

    let mut future = scope.submit(request("a"));
    future.wait().await.expect("captured failure is a value");

    let records = logger.with_msg("call complete");
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0]["error"],
        "couldn't send request - connection refused"
    );
}

#[tokio::test]
async fn json_call_serializes_body_and_sets_content_type() {
    let transport = MockTransport::new();
    transport.respond(
        "a",
        Ok(CallResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Bytes::from_static(b"{}"),
        }),
    );
    let (scope, _caller, _logger) = scope_with(Arc::clone(&transport));

    let call = json_call(request("a"), &json!({ "total": 7 })).expect("serializes");
    let mut future = scope.submit(call);
    let outcome = future.wait().await.expect("resolves");
    let response = outcome.response().expect("raw response");
    assert_eq!(response.header("content-type"), Some("application/json"));

    let seen = transport.seen();
    assert_eq!(seen[0].body, b"{\"total\":7}");
    assert!(seen[0]
        .headers
        .iter()
        .any(|(key, value)| key == "Content-Type" && value == "application/json"));
}

#[tokio::test]
async fn scope_stamps_trace_client_and_deadline_headers() {
    let transport = MockTransport::new();
    let (scope, _caller, _logger) = scope_with(Arc::clone(&transport));

    let mut future = scope.submit(request("a"));
    future.wait().await.expect("resolves");

    let seen = transport.seen();
    assert_eq!(seen.len(), 1);
    let headers = &seen[0].headers;
    let get = |name: &str| {
        headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };
    assert_eq!(
        get("Traceparent").as_deref(),
        Some("00-4bf92f3577b34da6a3ce929d0e0e4736-a1b2c3d4e5f60718-00")
    );
    assert_eq!(get("X-Client").as_deref(), Some("orders-svc"));
    let x_timeout: i64 = get("X-Timeout")
        .expect("deadline header present")
        .parse()
        .expect("epoch seconds");
    assert!(x_timeout > gatehouse_types::prelude::unix_now());
}
