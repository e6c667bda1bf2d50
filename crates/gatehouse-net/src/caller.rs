use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Map};
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

use gatehouse_observe::prelude::{Logger, ObserveCtx};
use gatehouse_types::prelude::unix_now;

use crate::errors::NetError;
use crate::future::{CallFuture, OnComplete};
use crate::transport::{CallTransport, ReqwestTransport};
use crate::types::{CallRecv, CallRequest};

/// Worker-wide registry of outbound calls. The table is shared across the
/// requests a worker serves, so `clear` MUST run at the very start of every
/// inbound request; a completion whose id is no longer pending is dropped.
pub struct OutboundCaller {
    transport: Arc<dyn CallTransport>,
    seq: AtomicI64,
    notify: Notify,
    table: Mutex<CallTable>,
}

#[derive(Default)]
struct CallTable {
    pending: HashSet<i64>,
    completed: HashMap<i64, CallRecv>,
}

impl OutboundCaller {
    pub fn new(transport: Arc<dyn CallTransport>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            seq: AtomicI64::new(0),
            notify: Notify::new(),
            table: Mutex::new(CallTable::default()),
        })
    }

    pub fn reqwest() -> Result<Arc<Self>, NetError> {
        Ok(Self::new(Arc::new(ReqwestTransport::new()?)))
    }

    /// Drop every pending and completed call. Runs once per inbound
    /// request, before any handler code, so nothing submitted by an earlier
    /// request can ever resolve into the current one.
    pub fn clear(&self) {
        let mut table = self.table.lock();
        table.pending.clear();
        table.completed.clear();
    }

    pub(crate) fn submit(self: &Arc<Self>, request: CallRequest) -> i64 {
        let id = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        self.table.lock().pending.insert(id);

        let caller = Arc::clone(self);
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            let result = transport.send(request).await;
            caller.complete(CallRecv { id, result });
        });

        id
    }

    fn complete(&self, recv: CallRecv) {
        {
            let mut table = self.table.lock();
            if table.pending.remove(&recv.id) {
                table.completed.insert(recv.id, recv);
            }
        }
        self.notify.notify_waiters();
    }

    pub(crate) fn poll_ready(&self, id: i64) -> Option<CallRecv> {
        self.table.lock().completed.get(&id).cloned()
    }

    pub(crate) fn is_tracked(&self, id: i64) -> bool {
        let table = self.table.lock();
        table.pending.contains(&id) || table.completed.contains_key(&id)
    }

    pub(crate) fn notified(&self) -> Notified<'_> {
        self.notify.notified()
    }
}

/// Per-request face of the caller: carries the request's trace, client and
/// log context and stamps them onto every submitted call.
#[derive(Clone)]
pub struct CallScope {
    caller: Arc<OutboundCaller>,
    octx: ObserveCtx,
    logger: Arc<dyn Logger>,
}

impl CallScope {
    pub fn new(caller: Arc<OutboundCaller>, octx: ObserveCtx, logger: Arc<dyn Logger>) -> Self {
        Self {
            caller,
            octx,
            logger,
        }
    }

    pub fn submit(&self, request: CallRequest) -> CallFuture {
        self.submit_with(request, None)
    }

    /// Submit with a completion transform that runs once, at resolution
    /// time, on a successful raw result.
    pub fn submit_with(&self, mut request: CallRequest, on_complete: Option<OnComplete>) -> CallFuture {
        let mut tags = Map::new();
        tags.insert("url.host".to_string(), json!(request.host));
        tags.insert("url.port".to_string(), json!(request.port));
        tags.insert("url.path".to_string(), json!(request.path()));
        tags.insert(
            "http.req_content_length".to_string(),
            json!(request.body.len()),
        );
        tags.insert("http.ssl".to_string(), json!(request.use_tls));

        if let Some(trace) = &self.octx.trace {
            request
                .headers
                .push(("Traceparent".to_string(), trace.traceparent()));
        }
        if let Some(client) = &self.octx.client {
            request
                .headers
                .push(("X-Client".to_string(), client.clone()));
        }
        let call_deadline = unix_now() + request.timeout.as_secs() as i64;
        request
            .headers
            .push(("X-Timeout".to_string(), call_deadline.to_string()));

        let id = self.caller.submit(request);
        CallFuture::new(
            id,
            Arc::clone(&self.caller),
            tags,
            on_complete,
            Arc::clone(&self.logger),
            self.octx.clone(),
        )
    }
}
