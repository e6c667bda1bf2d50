pub use crate::adapter::{ApiAdapter, JsonApi, Payload, RawApi};
pub use crate::descriptor::ApiDescriptor;
pub use crate::errors::ApiError;
pub use crate::params::{parse_query, HexIdParam, ParamField, ParamMap, ParamSchema, ParamValidator};
pub use crate::schema::SchemaDoc;
pub use crate::template::{PathTemplate, PathValues, Segment};
