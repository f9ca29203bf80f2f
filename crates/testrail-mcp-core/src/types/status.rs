//! Connection status of the worker

use serde::{Deserialize, Serialize};

/// Status of the connection to the TestRail MCP server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        ConnectionStatus::Disconnected
    }
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        }
    }

    /// Status indicator text (codicon syntax understood by VS Code)
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "$(check) TestRail MCP",
            ConnectionStatus::Connecting => "$(sync~spin) TestRail MCP",
            ConnectionStatus::Error => "$(error) TestRail MCP",
            ConnectionStatus::Disconnected => "$(debug-disconnect) TestRail MCP",
        }
    }

    /// Status indicator tooltip
    pub fn tooltip(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "TestRail MCP: Connected",
            ConnectionStatus::Connecting => "TestRail MCP: Connecting...",
            ConnectionStatus::Error => "TestRail MCP: Connection Error (click to reconnect)",
            ConnectionStatus::Disconnected => "TestRail MCP: Disconnected (click to connect)",
        }
    }

    /// Whether the indicator should use the error background
    pub fn is_error(&self) -> bool {
        matches!(self, ConnectionStatus::Error)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ConnectionStatus::Connected).unwrap(),
            "\"connected\""
        );
        let parsed: ConnectionStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, ConnectionStatus::Error);
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_indicator_texts() {
        assert!(ConnectionStatus::Error.is_error());
        assert!(!ConnectionStatus::Connected.is_error());
        assert!(ConnectionStatus::Disconnected.tooltip().contains("click to connect"));
        assert_eq!(ConnectionStatus::Connecting.to_string(), "connecting");
    }
}
