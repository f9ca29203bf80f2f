//! Host-facing TestRail tool
//!
//! One invocation in, one display string out. Failures are reported in the
//! string itself; nothing propagates to the host.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::connection::{ConnectionError, ConnectionManager};
use crate::logging::{Logger, SharedLogger, TaggedLogger};
use crate::router::{route, InvocationRequest, ValidationError};
use crate::types::{CancellationToken, ContentKind};

/// Name the tool is registered under with the host
pub const TOOL_NAME: &str = "testrail_mcp";

/// Prefix of every failure string
pub const ERROR_PREFIX: &str = "TestRail MCP error: ";

/// Host-visible description of the tool
pub const TOOL_DESCRIPTION: &str = "Interact with TestRail: manage projects, test cases, sections, \
test runs, results and datasets. Set `action` to the operation (e.g. get_projects, create_case, \
add_result) and pass its parameters alongside.";

/// Optional parameters the host schema advertises, with their JSON types
const OPTIONAL_PARAMS: [(&str, &str, &str); 14] = [
    ("project_id", "number", "Project ID"),
    ("test_case_id", "number", "Test case ID (alias of case_id)"),
    ("case_id", "number", "Test case ID"),
    ("test_run_id", "number", "Test run ID (alias of run_id)"),
    ("run_id", "number", "Test run ID"),
    ("test_id", "number", "Test ID"),
    ("status_id", "number", "Result status ID (1 passed, 2 blocked, 4 retest, 5 failed)"),
    ("comment", "string", "Result comment"),
    ("suite_id", "number", "Suite ID"),
    ("section_id", "number", "Section ID"),
    ("dataset_id", "number", "Dataset ID"),
    ("name", "string", "Name of a project, section, run or dataset"),
    ("title", "string", "Test case title"),
    ("description", "string", "Description"),
];

/// JSON Schema for the tool input: `action` plus the optional parameters
pub fn tool_input_schema() -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "action".to_string(),
        json!({
            "type": "string",
            "description": "TestRail operation, e.g. get_projects, get_case, create_case, add_run, add_result"
        }),
    );
    for (name, kind, description) in OPTIONAL_PARAMS {
        properties.insert(
            name.to_string(),
            json!({ "type": kind, "description": description }),
        );
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": ["action"]
    })
}

#[derive(Debug, thiserror::Error)]
enum InvokeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// The tool the host registers
pub struct TestRailTool {
    connection: Arc<ConnectionManager>,
    logger: TaggedLogger,
}

impl TestRailTool {
    pub fn new(connection: Arc<ConnectionManager>, logger: SharedLogger) -> Self {
        Self {
            connection,
            logger: TaggedLogger::new(logger, "TestRailTool"),
        }
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    /// Run one host invocation and render the outcome for display
    ///
    /// `_cancel` is accepted for the host contract; an in-flight worker call
    /// is not interrupted.
    pub async fn invoke(&self, input: &Value, _cancel: &CancellationToken) -> String {
        self.logger.info(&format!("Invoked with params: {}", input));

        match self.try_invoke(input).await {
            Ok(formatted) => {
                self.logger.debug(&format!("Result: {}", formatted));
                formatted
            }
            Err(e) => {
                let message = error_text(&e.to_string());
                self.logger.error(&format!("Error: {}", message));
                message
            }
        }
    }

    async fn try_invoke(&self, input: &Value) -> Result<String, InvokeError> {
        let request = InvocationRequest::from_input(input)?;
        let (tool, args) = route(&request);
        self.logger.info(&format!(
            "Calling MCP tool: {} with args: {}",
            tool,
            Value::Object(args.clone())
        ));

        let result = self.connection.call(&tool, args).await?;
        Ok(format_result(result.as_value()))
    }
}

/// The string shown to the host when an invocation fails
pub fn error_text(message: &str) -> String {
    format!("{}{}", ERROR_PREFIX, message)
}

/// Render a raw worker result for display
///
/// Text items are joined with blank lines. Joined text that parses as JSON
/// is pretty-printed. With no `content` list, or no text at all, the whole
/// value is pretty-printed instead.
pub fn format_result(value: &Value) -> String {
    let Some(content) = value.get("content").and_then(Value::as_array) else {
        return pretty(value);
    };

    let text = content
        .iter()
        .filter(|item| ContentKind::of(item) == ContentKind::Text)
        .map(|item| item.get("text").and_then(Value::as_str).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n\n");

    if text.is_empty() {
        return pretty(value);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(parsed) => pretty(&parsed),
        Err(_) => text,
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
