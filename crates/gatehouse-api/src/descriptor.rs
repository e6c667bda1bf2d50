use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use gatehouse_types::prelude::Status;

use crate::errors::ApiError;
use crate::params::ParamSchema;
use crate::schema::SchemaDoc;
use crate::template::PathTemplate;

/// Route metadata: allowed methods, path template, declared schemas and the
/// status codes the handler is permitted to emit. The id is a content hash
/// of template plus methods and stays stable across restarts.
#[derive(Debug)]
pub struct ApiDescriptor {
    pub service: String,
    pub methods: Vec<String>,
    pub template: PathTemplate,
    pub param_schema: Option<ParamSchema>,
    pub request_schema: Option<SchemaDoc>,
    pub response_schema: Option<SchemaDoc>,
    pub status_codes: Vec<Status>,
    id: String,
}

impl ApiDescriptor {
    pub fn new(
        service: impl Into<String>,
        methods: Vec<String>,
        template: PathTemplate,
    ) -> Self {
        let id = content_id(&template, &methods);
        Self {
            service: service.into(),
            methods,
            template,
            param_schema: None,
            request_schema: None,
            response_schema: None,
            status_codes: vec![Status::Ok],
            id,
        }
    }

    pub fn with_param_schema(mut self, schema: ParamSchema) -> Self {
        self.param_schema = Some(schema);
        self
    }

    pub fn with_request_schema(mut self, raw: Value) -> Result<Self, ApiError> {
        self.request_schema = Some(SchemaDoc::compile(raw)?);
        Ok(self)
    }

    pub fn with_response_schema(mut self, raw: Value) -> Result<Self, ApiError> {
        self.response_schema = Some(SchemaDoc::compile(raw)?);
        Ok(self)
    }

    pub fn with_status_codes(mut self, status_codes: Vec<Status>) -> Self {
        self.status_codes = status_codes;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> String {
        self.template.name()
    }

    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    pub fn allows_status(&self, status: Status) -> bool {
        self.status_codes.contains(&status)
    }

    /// Machine-readable description served for `OPTIONS` and the doc index.
    pub fn describe(&self) -> Value {
        let params: Value = match &self.param_schema {
            None => Value::Null,
            Some(schema) => Value::Object(
                schema
                    .fields()
                    .iter()
                    .map(|(key, field)| {
                        (
                            key.clone(),
                            json!({
                                "required": field.required,
                                "allow_duplicates": field.allow_duplicates,
                            }),
                        )
                    })
                    .collect(),
            ),
        };

        json!({
            "id": self.id,
            "name": self.name(),
            "methods": self.methods,
            "status_codes": self
                .status_codes
                .iter()
                .map(|status| status.code())
                .collect::<Vec<_>>(),
            "param_schema": params,
            "request_schema": self
                .request_schema
                .as_ref()
                .map(|doc| doc.raw().clone())
                .unwrap_or(Value::Null),
            "response_schema": self
                .response_schema
                .as_ref()
                .map(|doc| doc.raw().clone())
                .unwrap_or(Value::Null),
        })
    }
}

fn content_id(template: &PathTemplate, methods: &[String]) -> String {
    let mut hasher = Sha256::new();
    for segment in template.segments() {
        hasher.update(segment.display().as_bytes());
    }
    for method in methods {
        hasher.update(method.as_bytes());
    }
    let digest = hex::encode(hasher.finalize());
    digest[..10].to_string()
}
