pub use crate::id::{new_span_id, new_trace_id, random_hex};
pub use crate::status::Status;
pub use crate::time::{unix_now, utc_rfc3339};
pub use crate::trace::{is_hex_string, parse_traceparent, TraceContext, TraceParseError};
