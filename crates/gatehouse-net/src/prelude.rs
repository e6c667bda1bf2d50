pub use crate::caller::{CallScope, OutboundCaller};
pub use crate::errors::NetError;
pub use crate::future::{json_call, CallFuture, OnComplete};
pub use crate::transport::{CallTransport, ReqwestTransport};
pub use crate::types::{
    CallFailure, CallOutcome, CallRecv, CallRequest, CallResponse, CallResult, FailureKind,
};
