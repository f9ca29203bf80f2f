//! Worker tool types

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Metadata the worker advertises about one operation it supports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Canonical tool name (e.g. `get_projects`)
    pub name: String,
    /// Description of what the tool does
    #[serde(default)]
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }
}

/// Kind of one content item in a worker result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Image,
    Resource,
    /// Anything newer than the kinds above (audio, resource links, ...)
    Other,
}

impl ContentKind {
    /// Classify a raw content item by its `type` field
    pub fn of(item: &Value) -> Self {
        match item.get("type").and_then(Value::as_str) {
            Some("text") => ContentKind::Text,
            Some("image") => ContentKind::Image,
            Some("resource") => ContentKind::Resource,
            _ => ContentKind::Other,
        }
    }
}

/// Raw result of one `tools/call` exchange
///
/// Kept as the worker's JSON rather than a typed tree: the display formatter
/// needs the untouched value when there is no text to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationResult(Value);

impl InvocationResult {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// A result holding a single text item
    pub fn text(text: impl Into<String>) -> Self {
        Self(json!({ "content": [{ "type": "text", "text": text.into() }] }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The `content` list, if the result has one
    pub fn content(&self) -> Option<&[Value]> {
        self.0.get("content").and_then(Value::as_array).map(Vec::as_slice)
    }

    /// Whether the worker flagged the result as a tool-level error
    pub fn is_error(&self) -> bool {
        self.0.get("isError").and_then(Value::as_bool).unwrap_or(false)
    }
}

impl From<Value> for InvocationResult {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_deserializes_worker_shape() {
        let tool: ToolDescriptor = serde_json::from_value(json!({
            "name": "get_case",
            "description": "Get a test case",
            "inputSchema": { "type": "object", "properties": { "case_id": { "type": "integer" } } }
        }))
        .unwrap();
        assert_eq!(tool.name, "get_case");
        assert!(tool.input_schema["properties"]["case_id"].is_object());

        let bare: ToolDescriptor = serde_json::from_value(json!({ "name": "x" })).unwrap();
        assert_eq!(bare.description, "");
    }

    #[test]
    fn test_content_kind() {
        assert_eq!(ContentKind::of(&json!({"type": "text", "text": "a"})), ContentKind::Text);
        assert_eq!(ContentKind::of(&json!({"type": "image"})), ContentKind::Image);
        assert_eq!(ContentKind::of(&json!({"type": "resource"})), ContentKind::Resource);
        assert_eq!(ContentKind::of(&json!({"type": "audio"})), ContentKind::Other);
        assert_eq!(ContentKind::of(&json!({})), ContentKind::Other);
    }

    #[test]
    fn test_invocation_result_accessors() {
        let result = InvocationResult::text("hello");
        assert_eq!(result.content().map(|c| c.len()), Some(1));
        assert!(!result.is_error());

        let errored = InvocationResult::new(json!({ "content": [], "isError": true }));
        assert!(errored.is_error());

        let odd = InvocationResult::new(json!({ "status": "ok" }));
        assert!(odd.content().is_none());
    }
}
