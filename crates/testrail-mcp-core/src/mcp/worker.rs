//! Worker seam: how a connection obtains and talks to a worker process

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{ToolDescriptor, WorkerConfig};

#[derive(Error, Debug)]
pub enum McpError {
    #[error("Failed to start worker: {0}")]
    Spawn(String),

    #[error("MCP handshake failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;

/// A live MCP session with one worker process
#[async_trait]
pub trait WorkerSession: Send + Sync {
    /// `tools/list`
    async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>>;

    /// `tools/call`; returns the raw result object
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> McpResult<Value>;

    /// End the session and stop the worker process
    async fn close(self: Box<Self>) -> McpResult<()>;
}

/// Starts a worker and completes the MCP handshake
#[async_trait]
pub trait WorkerLauncher: Send + Sync {
    async fn launch(&self, config: &WorkerConfig) -> McpResult<Box<dyn WorkerSession>>;
}
