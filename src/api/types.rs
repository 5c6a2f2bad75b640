use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Extra query string parameters sent with a request.
pub type QueryParams = BTreeMap<String, String>;

/// A successful response from the remote endpoint, kept exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ApiResult {
    body: Map<String, Value>,
}

impl ApiResult {
    pub fn from_object(body: Map<String, Value>) -> Self {
        Self { body }
    }

    /// Whether the remote flagged the call as successful.
    pub fn is_success(&self) -> bool {
        self.body.get("success").is_some_and(is_truthy)
    }

    /// The remote's `message`, rendered as text whatever JSON type it has.
    pub fn message(&self) -> Option<String> {
        self.body.get("message").cloned().and_then(message_text)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// The full response body.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

/// Renders a `message` field as text, whatever JSON type it arrived as.
pub(crate) fn message_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Loose truthiness for the remote's `success` flag.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Result of a diagnostic probe. Failures are reported here, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}
