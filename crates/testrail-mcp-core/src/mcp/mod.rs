//! MCP worker client
//!
//! The worker is the TestRail MCP server, started as a child process and
//! spoken to over its stdio with the official rmcp SDK.
//!
//! ```rust,ignore
//! use testrail_mcp_core::mcp::McpClient;
//!
//! let client = McpClient::spawn(&config, logger).await?;
//! let tools = client.list_tools().await?;
//! let result = client.call_tool("get_projects", serde_json::Map::new()).await?;
//! client.close().await?;
//! ```
//!
//! `ConnectionManager` only sees the `WorkerLauncher`/`WorkerSession` traits.

mod client;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{
    worker_command, ChildProcessLauncher, McpClient, CLIENT_NAME, ENV_TESTRAIL_API_KEY,
    ENV_TESTRAIL_URL, ENV_TESTRAIL_USERNAME,
};
pub use worker::{McpError, McpResult, WorkerLauncher, WorkerSession};
