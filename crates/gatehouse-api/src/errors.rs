use gatehouse_errors::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct ApiError(pub ErrorObj);

impl ApiError {
    pub fn into_inner(self) -> ErrorObj {
        self.0
    }

    pub fn params(msg: &str) -> Self {
        ApiError(
            ErrorBuilder::new(codes::SCHEMA_VALIDATION)
                .user_msg(msg)
                .build(),
        )
    }

    pub fn body(msg: &str) -> Self {
        ApiError(
            ErrorBuilder::new(codes::SCHEMA_VALIDATION)
                .user_msg(msg)
                .build(),
        )
    }

    pub fn response(msg: &str) -> Self {
        ApiError(
            ErrorBuilder::new(codes::RESPONSE_INVALID)
                .user_msg("Response failed the declared contract.")
                .dev_msg(msg)
                .build(),
        )
    }

    pub fn schema_doc(msg: &str) -> Self {
        ApiError(
            ErrorBuilder::new(codes::SCHEMA_COMPILE)
                .user_msg("Declared schema does not compile.")
                .dev_msg(msg)
                .build(),
        )
    }
}
