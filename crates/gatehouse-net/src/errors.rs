use gatehouse_errors::prelude::*;
use thiserror::Error;

use crate::types::{CallFailure, FailureKind};

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct NetError(pub ErrorObj);

impl NetError {
    pub fn into_inner(self) -> ErrorObj {
        self.0
    }

    pub fn contract(msg: &str) -> Self {
        NetError(
            ErrorBuilder::new(codes::CALL_CONTRACT)
                .user_msg("Outbound call handle used outside its contract.")
                .dev_msg(msg)
                .build(),
        )
    }

    pub fn timeout(msg: &str) -> Self {
        NetError(
            ErrorBuilder::new(codes::NET_TIMEOUT)
                .user_msg("Outbound call timed out.")
                .dev_msg(msg)
                .retry(RetryClass::Transient)
                .build(),
        )
    }

    pub fn provider_unavailable(msg: &str) -> Self {
        NetError(
            ErrorBuilder::new(codes::PROVIDER_UNAVAILABLE)
                .user_msg("Downstream service is unavailable.")
                .dev_msg(msg)
                .retry(RetryClass::Transient)
                .build(),
        )
    }

    pub fn from_failure(failure: &CallFailure) -> Self {
        match failure.kind {
            FailureKind::Timeout => Self::timeout(&failure.to_string()),
            _ => Self::provider_unavailable(&failure.to_string()),
        }
    }
}
