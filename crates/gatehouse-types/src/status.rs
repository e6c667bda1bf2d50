use serde::{Deserialize, Serialize};

/// The response statuses the dispatch pipeline can produce. Handlers may
/// only emit statuses their route declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    InternalServerError,
    GatewayTimeout,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
            Status::GatewayTimeout => 504,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "Ok",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::InternalServerError => "Internal Server Error",
            Status::GatewayTimeout => "Gateway Timeout",
        }
    }

    /// Status line form, e.g. `200 Ok`.
    pub fn status_line(self) -> String {
        format!("{} {}", self.code(), self.reason())
    }
}
