pub use crate::deadline::{Deadline, DEFAULT_GATEWAY_TIMEOUT_SECS, MIN_HEADROOM_SECS};
pub use crate::dispatcher::dispatch;
pub use crate::docs::{DocResponder, DOC_PREFIX};
pub use crate::errors::DispatchError;
pub use crate::handler::{Handler, HandlerObject, HandlerRequest, ResponseHead};
pub use crate::pipeline::GateService;
pub use crate::request::InboundRequest;
pub use crate::response::{FinishedResponse, Response};
pub use crate::router::{Route, Router};
pub use crate::scope::RequestScope;
