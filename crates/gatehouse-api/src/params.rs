use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use gatehouse_types::prelude::is_hex_string;

use crate::errors::ApiError;

/// Decoded query parameters: key to list of values, in decode order.
pub type ParamMap = BTreeMap<String, Vec<Value>>;

/// Plain query-string decode, no schema applied.
pub fn parse_query(raw_query: &str) -> ParamMap {
    let mut map = ParamMap::new();
    for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
        map.entry(key.into_owned())
            .or_default()
            .push(Value::String(value.into_owned()));
    }
    map
}

/// Validates one raw parameter value, optionally normalizing it.
pub trait ParamValidator: Send + Sync {
    fn validate(&self, raw: &str) -> Result<Value, String>;
}

/// Lowercased fixed-length hex identifier, e.g. a session id.
pub struct HexIdParam {
    pub len: usize,
}

impl ParamValidator for HexIdParam {
    fn validate(&self, raw: &str) -> Result<Value, String> {
        let normalized = raw.to_ascii_lowercase();
        if normalized.len() != self.len || !is_hex_string(&normalized) {
            return Err(format!("expected a hex string of length {}", self.len));
        }
        Ok(Value::String(normalized))
    }
}

pub struct ParamField {
    pub required: bool,
    pub allow_duplicates: bool,
    /// Drop invalid values instead of failing the request.
    pub ignore_invalid: bool,
    pub validator: Option<Arc<dyn ParamValidator>>,
}

impl Default for ParamField {
    fn default() -> Self {
        Self {
            required: false,
            allow_duplicates: false,
            ignore_invalid: false,
            validator: None,
        }
    }
}

impl fmt::Debug for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamField")
            .field("required", &self.required)
            .field("allow_duplicates", &self.allow_duplicates)
            .field("ignore_invalid", &self.ignore_invalid)
            .finish()
    }
}

impl ParamField {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn ParamValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn allow_duplicates(mut self) -> Self {
        self.allow_duplicates = true;
        self
    }

    pub fn ignore_invalid(mut self) -> Self {
        self.ignore_invalid = true;
        self
    }
}

/// Declared parameter shape for a route. Keys not listed here are dropped
/// from the decoded map.
#[derive(Debug, Default)]
pub struct ParamSchema {
    fields: Vec<(String, ParamField)>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, field: ParamField) -> Self {
        self.fields.push((key.into(), field));
        self
    }

    pub fn fields(&self) -> &[(String, ParamField)] {
        &self.fields
    }

    pub fn build(&self, raw_query: &str) -> Result<ParamMap, ApiError> {
        let decoded = parse_query(raw_query);
        let mut out = ParamMap::new();

        for (key, field) in &self.fields {
            let vals = decoded.get(key).cloned().unwrap_or_default();
            if vals.is_empty() {
                if field.required {
                    return Err(ApiError::params(&format!("missing required key {key}")));
                }
                continue;
            }

            if vals.len() != 1 && !field.allow_duplicates {
                return Err(ApiError::params(&format!("duplicate {key} not allowed")));
            }

            let mut kept = Vec::with_capacity(vals.len());
            for val in &vals {
                let raw = val.as_str().unwrap_or_default();
                match &field.validator {
                    None => kept.push(val.clone()),
                    Some(validator) => match validator.validate(raw) {
                        Ok(value) => kept.push(value),
                        Err(_) if field.ignore_invalid => {}
                        Err(_) => {
                            return Err(ApiError::params(&format!(
                                "not ignoring invalid param for {key}"
                            )));
                        }
                    },
                }
            }

            out.insert(key.clone(), kept);
        }

        Ok(out)
    }
}
