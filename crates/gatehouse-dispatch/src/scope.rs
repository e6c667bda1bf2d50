use std::sync::Arc;

use gatehouse_net::prelude::CallScope;
use gatehouse_observe::prelude::{LogEvent, Logger, ObserveCtx};
use gatehouse_types::prelude::TraceContext;

use crate::deadline::Deadline;

/// Everything a request carries through the pipeline: its trace, deadline,
/// log context and outbound-call scope. Built fresh per request; nothing
/// here is ambient.
#[derive(Clone)]
pub struct RequestScope {
    pub trace: TraceContext,
    pub deadline: Deadline,
    pub octx: ObserveCtx,
    logger: Arc<dyn Logger>,
    calls: CallScope,
}

impl RequestScope {
    pub fn new(
        trace: TraceContext,
        deadline: Deadline,
        octx: ObserveCtx,
        logger: Arc<dyn Logger>,
        calls: CallScope,
    ) -> Self {
        Self {
            trace,
            deadline,
            octx,
            logger,
            calls,
        }
    }

    /// Issue outbound calls scoped to this request.
    pub fn calls(&self) -> &CallScope {
        &self.calls
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub fn log(&self, event: LogEvent) {
        self.logger.log(&self.octx, event);
    }
}
