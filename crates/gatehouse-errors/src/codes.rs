use crate::model::ErrorCode;

/// Malformed query parameters or request body.
pub const SCHEMA_VALIDATION: ErrorCode = ErrorCode("schema.validation", 400);
/// Explicit request deadline that is already (or almost) in the past.
pub const DEADLINE_IN_PAST: ErrorCode = ErrorCode("deadline.in_past", 400);
/// No route matched, or the matched route does not allow the method.
pub const ROUTE_NOT_FOUND: ErrorCode = ErrorCode("route.not_found", 404);
/// An error or panic escaped a handler.
pub const HANDLER_CRASH: ErrorCode = ErrorCode("handler.crash", 500);
/// A handler emitted a status code outside its declared set.
pub const STATUS_UNREGISTERED: ErrorCode = ErrorCode("handler.status_unregistered", 500);
/// A handler payload violated the declared response contract.
pub const RESPONSE_INVALID: ErrorCode = ErrorCode("response.invalid", 500);
/// A declared schema document failed to compile at registration time.
pub const SCHEMA_COMPILE: ErrorCode = ErrorCode("schema.compile", 500);
/// The per-request deadline elapsed.
pub const GATEWAY_TIMEOUT: ErrorCode = ErrorCode("gateway.timeout", 504);
/// An outbound-call handle was used outside its contract.
pub const CALL_CONTRACT: ErrorCode = ErrorCode("call.contract", 500);
/// An outbound call hit its own timeout.
pub const NET_TIMEOUT: ErrorCode = ErrorCode("net.timeout", 504);
/// An outbound call failed to reach or speak to the callee.
pub const PROVIDER_UNAVAILABLE: ErrorCode = ErrorCode("net.provider_unavailable", 502);
/// Anything that has no more precise classification.
pub const UNKNOWN_INTERNAL: ErrorCode = ErrorCode("unknown.internal", 500);
