use gatehouse_api::prelude::ApiError;
use gatehouse_errors::prelude::*;
use gatehouse_net::prelude::NetError;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct DispatchError(pub ErrorObj);

impl DispatchError {
    pub fn into_inner(self) -> ErrorObj {
        self.0
    }

    pub fn timeout_in_past() -> Self {
        DispatchError(
            ErrorBuilder::new(codes::DEADLINE_IN_PAST)
                .user_msg("timeout is in the past")
                .build(),
        )
    }

    pub fn gateway_timeout() -> Self {
        DispatchError(
            ErrorBuilder::new(codes::GATEWAY_TIMEOUT)
                .user_msg("application timeout")
                .retry(RetryClass::Transient)
                .build(),
        )
    }

    pub fn registration(msg: &str) -> Self {
        DispatchError(
            ErrorBuilder::new(codes::UNKNOWN_INTERNAL)
                .user_msg("Route registration failed.")
                .dev_msg(msg)
                .build(),
        )
    }

    pub fn internal(msg: &str) -> Self {
        DispatchError(
            ErrorBuilder::new(codes::UNKNOWN_INTERNAL)
                .user_msg("Request processing failed.")
                .dev_msg(msg)
                .build(),
        )
    }
}

impl From<ApiError> for DispatchError {
    fn from(err: ApiError) -> Self {
        DispatchError(err.into_inner())
    }
}

impl From<NetError> for DispatchError {
    fn from(err: NetError) -> Self {
        DispatchError(err.into_inner())
    }
}
