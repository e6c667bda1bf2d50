use std::fmt;
use std::sync::Arc;

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::errors::ApiError;

/// A declared request or response schema, compiled once at registration
/// time. The schema language itself is the validation engine's concern;
/// this wrapper only exposes `validate(data) -> ok | first error`.
#[derive(Clone)]
pub struct SchemaDoc {
    raw: Value,
    compiled: Arc<JSONSchema>,
}

impl SchemaDoc {
    pub fn compile(raw: Value) -> Result<Self, ApiError> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&raw)
            .map_err(|err| ApiError::schema_doc(&err.to_string()))?;

        Ok(Self {
            raw,
            compiled: Arc::new(compiled),
        })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn validate(&self, value: &Value) -> Result<(), String> {
        self.compiled.validate(value).map_err(|mut errors| {
            match errors.next() {
                Some(first) => first.to_string(),
                None => "schema validation failed".to_string(),
            }
        })
    }
}

impl fmt::Debug for SchemaDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDoc").field("raw", &self.raw).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compiled_schema_validates_instances() {
        let doc = SchemaDoc::compile(json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"],
        }))
        .expect("schema compiles");

        assert!(doc.validate(&json!({ "name": "ada" })).is_ok());
        assert!(doc.validate(&json!({})).is_err());
        assert!(doc.validate(&json!({ "name": 7 })).is_err());
    }

    #[test]
    fn broken_schema_fails_to_compile() {
        let result = SchemaDoc::compile(json!({ "type": "not-a-type" }));
        assert!(result.is_err());
    }
}
