//! The response contract every extension method must honor.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What an extension method hands back to the access layer.
///
/// Methods return it as JSON (`{"status", "headers"?, "entity"}`); a status
/// of 400 or above marks an error response that the access layer forwards
/// verbatim.
///
/// ```
/// use graphgate_extensions::ExtensionResponse;
/// use serde_json::json;
///
/// let response = ExtensionResponse::error(422, "bad script");
/// assert!(response.is_error());
/// assert_eq!(response.entity, json!({ "message": "bad script" }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionResponse {
    /// HTTP-equivalent status.
    pub status: u16,
    /// Extra response headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// Response payload.
    pub entity: Value,
}

impl ExtensionResponse {
    /// A 200 response carrying `entity`.
    #[must_use]
    pub fn ok(entity: Value) -> Self {
        Self {
            status: 200,
            headers: IndexMap::new(),
            entity,
        }
    }

    /// An error response with a `{"message": ...}` payload.
    #[must_use]
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        let mut entity = serde_json::Map::new();
        entity.insert("message".into(), Value::String(message.into()));
        Self {
            status,
            headers: IndexMap::new(),
            entity: Value::Object(entity),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns true when the status marks an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Decodes a method's raw return value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl From<ExtensionResponse> for Value {
    fn from(response: ExtensionResponse) -> Self {
        let mut object = serde_json::Map::new();
        object.insert("status".into(), Value::from(response.status));
        if !response.headers.is_empty() {
            let headers = response
                .headers
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect();
            object.insert("headers".into(), Value::Object(headers));
        }
        object.insert("entity".into(), response.entity);
        Value::Object(object)
    }
}
