//! MCP client for the TestRail worker, over the child process's stdio
//!
//! The official rmcp SDK owns the transport, handshake and request
//! correlation; this wraps it for one worker.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParams, ClientCapabilities, ClientInfo, Implementation},
    service::RunningService,
    transport::TokioChildProcess,
    RoleClient, ServiceExt,
};
use serde_json::{Map, Value};
use tokio::process::Command;

use super::worker::{McpError, McpResult, WorkerLauncher, WorkerSession};
use crate::logging::{Logger, SharedLogger, TaggedLogger};
use crate::types::{ToolDescriptor, WorkerConfig};

/// Client name announced during the MCP handshake
pub const CLIENT_NAME: &str = "testrail-mcp-bridge";

/// Environment variables the worker reads its credentials from
pub const ENV_TESTRAIL_URL: &str = "TESTRAIL_URL";
pub const ENV_TESTRAIL_USERNAME: &str = "TESTRAIL_USERNAME";
pub const ENV_TESTRAIL_API_KEY: &str = "TESTRAIL_API_KEY";

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: CLIENT_NAME.to_string(),
            title: Some("TestRail MCP Bridge".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

/// Launch command for a worker: configured executable and arguments, with
/// the credentials added to the inherited environment
pub fn worker_command(config: &WorkerConfig) -> Command {
    let mut cmd = Command::new(&config.worker_path);
    cmd.args(&config.worker_args)
        .env(ENV_TESTRAIL_URL, &config.server_url)
        .env(ENV_TESTRAIL_USERNAME, &config.username)
        .env(ENV_TESTRAIL_API_KEY, &config.api_key);
    cmd
}

/// Session with a running TestRail MCP server
pub struct McpClient {
    client: RunningService<RoleClient, ClientInfo>,
    logger: TaggedLogger,
}

impl McpClient {
    /// Spawn the worker and perform the MCP handshake on its stdio
    pub async fn spawn(config: &WorkerConfig, logger: SharedLogger) -> McpResult<Self> {
        let logger = TaggedLogger::new(logger, "McpClient");
        logger.info(&format!("Spawning: {}", config.command_line()));

        let transport =
            TokioChildProcess::new(worker_command(config)).map_err(|e| McpError::Spawn(e.to_string()))?;

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        let client = Self { client, logger };
        match client.server_info() {
            Some(server) => client.logger.info(&format!(
                "Connected to MCP server {} {}",
                server.name, server.version
            )),
            None => client.logger.info("Connected to MCP server"),
        }
        Ok(client)
    }

    pub async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>> {
        let result = self
            .client
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        result
            .tools
            .iter()
            .map(|tool| {
                serde_json::to_value(tool)
                    .and_then(serde_json::from_value)
                    .map_err(|e| McpError::Protocol(format!("Invalid tool descriptor: {}", e)))
            })
            .collect()
    }

    pub async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> McpResult<Value> {
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: Some(arguments),
            task: None,
        };

        let result = self
            .client
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))?;

        serde_json::to_value(&result).map_err(|e| McpError::Protocol(e.to_string()))
    }

    /// Server name and version reported during the handshake
    pub fn server_info(&self) -> Option<&Implementation> {
        self.client.peer_info().map(|info| &info.server_info)
    }

    /// Cancel the service; the transport stops the child process
    pub async fn close(self) -> McpResult<()> {
        self.logger.debug("Closing worker session");
        self.client
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl WorkerSession for McpClient {
    async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>> {
        McpClient::list_tools(self).await
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> McpResult<Value> {
        McpClient::call_tool(self, name, arguments).await
    }

    async fn close(self: Box<Self>) -> McpResult<()> {
        McpClient::close(*self).await
    }
}

/// Launches workers as child processes
#[derive(Clone)]
pub struct ChildProcessLauncher {
    logger: SharedLogger,
}

impl ChildProcessLauncher {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }

    pub fn shared(logger: SharedLogger) -> Arc<dyn WorkerLauncher> {
        Arc::new(Self::new(logger))
    }
}

#[async_trait]
impl WorkerLauncher for ChildProcessLauncher {
    async fn launch(&self, config: &WorkerConfig) -> McpResult<Box<dyn WorkerSession>> {
        let client = McpClient::spawn(config, self.logger.clone()).await?;
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::types::WorkerSettings;

    fn config(path: &str) -> WorkerConfig {
        WorkerConfig::from_parts(
            WorkerSettings {
                server_url: "https://acme.testrail.io".to_string(),
                worker_path: path.to_string(),
                ..Default::default()
            },
            "qa@acme.io".to_string(),
            "key".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_worker_command_env_and_args() {
        let cmd = worker_command(&config("uvx"));
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "uvx");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, vec!["testrail-mcp"]);

        let envs: Vec<_> = std_cmd
            .get_envs()
            .filter_map(|(k, v)| Some((k.to_str()?, v?.to_str()?)))
            .collect();
        assert!(envs.contains(&(ENV_TESTRAIL_URL, "https://acme.testrail.io")));
        assert!(envs.contains(&(ENV_TESTRAIL_USERNAME, "qa@acme.io")));
        assert!(envs.contains(&(ENV_TESTRAIL_API_KEY, "key")));
    }

    #[test]
    fn test_client_info_name() {
        assert_eq!(client_info().client_info.name, CLIENT_NAME);
    }

    #[tokio::test]
    async fn test_spawn_missing_executable_fails() {
        let launcher = ChildProcessLauncher::new(NoOpLogger::shared());
        let result = launcher
            .launch(&config("/nonexistent/testrail-mcp-worker-binary"))
            .await;
        assert!(matches!(result, Err(McpError::Spawn(_))));
    }
}
