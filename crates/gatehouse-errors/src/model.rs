use std::fmt;

/// Stable machine-readable code plus the HTTP status it maps to at the
/// request boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub &'static str, pub u16);

impl ErrorCode {
    pub fn id(self) -> &'static str {
        self.0
    }

    pub fn http_status(self) -> u16 {
        self.1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RetryClass {
    None,
    Transient,
    Permanent,
}

impl RetryClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            RetryClass::None => "none",
            RetryClass::Transient => "transient",
            RetryClass::Permanent => "permanent",
        }
    }
}

/// The error value carried through the dispatch pipeline.
///
/// `message_user` is safe to echo to the caller; `message_dev` holds the
/// detail that goes to the log only.
#[derive(Clone, Debug)]
pub struct ErrorObj {
    pub code: ErrorCode,
    pub message_user: String,
    pub message_dev: Option<String>,
    pub retry: RetryClass,
}

impl ErrorObj {
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Developer detail when present, user message otherwise.
    pub fn detail(&self) -> &str {
        self.message_dev.as_deref().unwrap_or(&self.message_user)
    }
}

impl fmt::Display for ErrorObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.id(), self.detail())
    }
}

pub struct ErrorBuilder {
    code: ErrorCode,
    message_user: String,
    message_dev: Option<String>,
    retry: RetryClass,
}

impl ErrorBuilder {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message_user: String::new(),
            message_dev: None,
            retry: RetryClass::None,
        }
    }

    pub fn user_msg(mut self, msg: impl Into<String>) -> Self {
        self.message_user = msg.into();
        self
    }

    pub fn dev_msg(mut self, msg: impl Into<String>) -> Self {
        self.message_dev = Some(msg.into());
        self
    }

    pub fn retry(mut self, retry: RetryClass) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> ErrorObj {
        ErrorObj {
            code: self.code,
            message_user: self.message_user,
            message_dev: self.message_dev,
            retry: self.retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;

    #[test]
    fn builder_carries_code_and_messages() {
        let obj = ErrorBuilder::new(codes::GATEWAY_TIMEOUT)
            .user_msg("application timeout")
            .dev_msg("deadline elapsed after 10s")
            .retry(RetryClass::Transient)
            .build();
        assert_eq!(obj.code, codes::GATEWAY_TIMEOUT);
        assert_eq!(obj.http_status(), 504);
        assert_eq!(obj.message_user, "application timeout");
        assert_eq!(obj.detail(), "deadline elapsed after 10s");
        assert_eq!(obj.retry.as_str(), "transient");
    }

    #[test]
    fn detail_falls_back_to_user_message() {
        let obj = ErrorBuilder::new(codes::ROUTE_NOT_FOUND)
            .user_msg("no such route")
            .build();
        assert_eq!(obj.detail(), "no such route");
    }
}
