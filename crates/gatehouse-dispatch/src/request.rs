use bytes::Bytes;

/// The transport-neutral view of an inbound request. The transport adapter
/// fills this in; the pipeline never sees the underlying server types.
#[derive(Clone, Debug, Default)]
pub struct InboundRequest {
    pub method: String,
    pub path: String,
    pub raw_query: String,
    pub headers: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub body: Bytes,
    /// Server name and port, used for log enrichment only.
    pub host: String,
    pub port: u16,
}

impl InboundRequest {
    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
