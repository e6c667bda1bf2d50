pub use crate::log::{render, LogBuilder, Logger, MemoryLogger, NoopLogger, StdoutLogger};
pub use crate::model::{LogEvent, LogLevel, ObserveCtx};
