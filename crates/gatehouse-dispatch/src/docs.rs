use crate::request::InboundRequest;
use crate::response::Response;
use crate::router::Router;

/// Reserved prefix served by the documentation responder instead of the
/// router.
pub const DOC_PREFIX: &str = "/doc";

/// Serves `GET /doc…` requests. The pipeline consults this before route
/// evaluation; rendering lives outside the dispatch core.
pub trait DocResponder: Send + Sync {
    fn respond(&self, request: &InboundRequest, router: &Router, response: &mut Response);
}
