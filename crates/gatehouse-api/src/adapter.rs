use bytes::Bytes;
use serde_json::Value;

use crate::descriptor::ApiDescriptor;
use crate::errors::ApiError;
use crate::params::{parse_query, ParamMap};

/// Request or response body as seen by handlers.
#[derive(Clone, Debug, Default)]
pub enum Payload {
    #[default]
    Empty,
    Bytes(Bytes),
    Json(Value),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Decodes the inbound parameter/body surface of a route and enforces the
/// declared response contract on the way out.
pub trait ApiAdapter: Send + Sync {
    fn build_params(&self, api: &ApiDescriptor, raw_query: &str) -> Result<ParamMap, ApiError> {
        match &api.param_schema {
            Some(schema) => schema.build(raw_query),
            None => Ok(parse_query(raw_query)),
        }
    }

    fn build_request_body(
        &self,
        api: &ApiDescriptor,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<Payload, ApiError>;

    fn build_response(
        &self,
        api: &ApiDescriptor,
        payload: Payload,
    ) -> Result<(Option<&'static str>, Bytes), ApiError>;
}

/// Passthrough adapter: the body goes to the handler as raw bytes and the
/// handler's payload is served untouched.
pub struct RawApi;

impl ApiAdapter for RawApi {
    fn build_request_body(
        &self,
        _api: &ApiDescriptor,
        _content_type: Option<&str>,
        body: &[u8],
    ) -> Result<Payload, ApiError> {
        Ok(Payload::Bytes(Bytes::copy_from_slice(body)))
    }

    fn build_response(
        &self,
        _api: &ApiDescriptor,
        payload: Payload,
    ) -> Result<(Option<&'static str>, Bytes), ApiError> {
        match payload {
            Payload::Empty => Ok((None, Bytes::new())),
            Payload::Bytes(body) => Ok((None, body)),
            Payload::Json(_) => Err(ApiError::response("json payload on a raw route")),
        }
    }
}

/// JSON adapter: enforces the `application/json` content type, validates
/// the decoded body against the declared request schema, and requires the
/// response payload to agree with the declared response schema - present
/// with one, absent without one.
pub struct JsonApi;

impl ApiAdapter for JsonApi {
    fn build_request_body(
        &self,
        api: &ApiDescriptor,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<Payload, ApiError> {
        // Without a declared schema the body is not read at all.
        let Some(schema) = &api.request_schema else {
            return Ok(Payload::Empty);
        };

        let content_type = content_type.unwrap_or_default();
        if content_type.to_ascii_lowercase() != "application/json" {
            return Err(ApiError::body("expected json request body"));
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|err| ApiError::body(&err.to_string()))?;
        schema
            .validate(&value)
            .map_err(|err| ApiError::body(&err))?;

        Ok(Payload::Json(value))
    }

    fn build_response(
        &self,
        api: &ApiDescriptor,
        payload: Payload,
    ) -> Result<(Option<&'static str>, Bytes), ApiError> {
        let value = match payload {
            Payload::Empty => None,
            Payload::Json(value) => Some(value),
            Payload::Bytes(_) => {
                return Err(ApiError::response("raw bytes payload on a json route"));
            }
        };

        match (value, &api.response_schema) {
            (None, None) => Ok((None, Bytes::new())),
            (None, Some(_)) => Err(ApiError::response("body is empty, but schema is not")),
            (Some(_), None) => Err(ApiError::response("body is populated, but no schema set")),
            (Some(value), Some(schema)) => {
                schema
                    .validate(&value)
                    .map_err(|err| ApiError::response(&err))?;
                let body = serde_json::to_vec(&value)
                    .map_err(|err| ApiError::response(&err.to_string()))?;
                Ok((Some("application/json"), Bytes::from(body)))
            }
        }
    }
}
