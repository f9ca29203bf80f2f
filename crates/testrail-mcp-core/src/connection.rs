//! Connection manager
//!
//! Owns at most one worker session and the connection status state machine:
//!
//! ```text
//! Disconnected -> Connecting -> Connected
//!                            \-> Error -> Disconnected
//! Connected -> Disconnected (disconnect)
//! ```
//!
//! Observers run synchronously, in registration order, on every transition.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::logging::{Logger, SharedLogger, TaggedLogger};
use crate::mcp::{McpResult, WorkerLauncher, WorkerSession};
use crate::types::{ConnectionStatus, InvocationResult, ToolDescriptor, WorkerConfig};
use crate::{log_debug, log_error, log_info, log_warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Failed to connect: {0}")]
    Connect(String),

    #[error("Not connected to MCP server")]
    NotConnected,

    #[error("{0}")]
    Call(String),
}

/// Status change callback
pub type StatusObserver = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

/// Handle returned by `on_status_change`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub struct ConnectionManager {
    launcher: Arc<dyn WorkerLauncher>,
    config: RwLock<WorkerConfig>,
    status: RwLock<ConnectionStatus>,
    tools: RwLock<Arc<Vec<ToolDescriptor>>>,
    session: Mutex<Option<Box<dyn WorkerSession>>>,
    observers: RwLock<Vec<(ObserverId, StatusObserver)>>,
    next_observer: AtomicU64,
    logger: TaggedLogger,
}

impl ConnectionManager {
    pub fn new(config: WorkerConfig, launcher: Arc<dyn WorkerLauncher>, logger: SharedLogger) -> Self {
        Self {
            launcher,
            config: RwLock::new(config),
            status: RwLock::new(ConnectionStatus::Disconnected),
            tools: RwLock::new(Arc::new(Vec::new())),
            session: Mutex::new(None),
            observers: RwLock::new(Vec::new()),
            next_observer: AtomicU64::new(1),
            logger: TaggedLogger::new(logger, "McpClient"),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.read()
    }

    /// Tools advertised by the worker on the last successful connect
    pub fn tools(&self) -> Arc<Vec<ToolDescriptor>> {
        self.tools.read().clone()
    }

    pub fn config(&self) -> WorkerConfig {
        self.config.read().clone()
    }

    pub fn on_status_change(&self, observer: impl Fn(ConnectionStatus) + Send + Sync + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, Arc::new(observer)));
        id
    }

    /// Returns false if the id was not registered
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    fn set_status(&self, status: ConnectionStatus) {
        *self.status.write() = status;
        self.notify(status);
    }

    fn notify(&self, status: ConnectionStatus) {
        // Snapshot so observers may (un)subscribe from inside the callback
        let observers: Vec<StatusObserver> =
            self.observers.read().iter().map(|(_, o)| o.clone()).collect();
        for observer in observers {
            observer(status);
        }
    }

    /// Move to Connecting unless a connection is already up or on its way
    fn begin_connect(&self) -> bool {
        let mut status = self.status.write();
        if matches!(*status, ConnectionStatus::Connecting | ConnectionStatus::Connected) {
            return false;
        }
        *status = ConnectionStatus::Connecting;
        true
    }

    /// Start the worker and load its tool list
    ///
    /// A no-op while already Connecting or Connected. On failure the status
    /// passes through Error and ends Disconnected.
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        if !self.begin_connect() {
            self.logger.info("Already connected or connecting");
            return Ok(());
        }
        self.notify(ConnectionStatus::Connecting);
        self.logger.info("Connecting to TestRail MCP server...");

        let config = self.config();
        match self.open_session(&config).await {
            Ok(tools) => {
                let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
                self.logger
                    .info(&format!("Found {} tools: {}", tools.len(), names.join(", ")));
                *self.tools.write() = Arc::new(tools);
                self.set_status(ConnectionStatus::Connected);
                self.logger.info("Successfully connected to TestRail MCP server");
                Ok(())
            }
            Err(e) => {
                log_error!(self.logger, "Failed to connect: {}", e);
                self.set_status(ConnectionStatus::Error);
                self.disconnect().await;
                Err(ConnectionError::Connect(e.to_string()))
            }
        }
    }

    async fn open_session(&self, config: &WorkerConfig) -> McpResult<Vec<ToolDescriptor>> {
        let session = self.launcher.launch(config).await?;
        let mut slot = self.session.lock().await;
        let session = slot.insert(session);
        session.list_tools().await
    }

    /// Close the session if any; always ends Disconnected
    pub async fn disconnect(&self) {
        self.logger.info("Disconnecting from MCP server...");

        let session = self.session.lock().await.take();
        if let Some(session) = session {
            if let Err(e) = session.close().await {
                log_warn!(self.logger, "Error during disconnect: {}", e);
            }
        }

        self.set_status(ConnectionStatus::Disconnected);
        self.logger.info("Disconnected from MCP server");
    }

    pub async fn reconnect(&self) -> Result<(), ConnectionError> {
        self.disconnect().await;
        self.connect().await
    }

    /// One `tools/call` exchange; fails fast unless Connected
    pub async fn call(
        &self,
        tool_name: &str,
        args: Map<String, Value>,
    ) -> Result<InvocationResult, ConnectionError> {
        if self.status() != ConnectionStatus::Connected {
            return Err(ConnectionError::NotConnected);
        }
        let verbose = self.config.read().debug;

        let session = self.session.lock().await;
        let session = session.as_ref().ok_or(ConnectionError::NotConnected)?;

        if verbose {
            self.logger.debug(&format!(
                "Calling tool: {} with args: {}",
                tool_name,
                Value::Object(args.clone())
            ));
        } else {
            log_info!(self.logger, "Calling tool: {}", tool_name);
        }

        match session.call_tool(tool_name, args).await {
            Ok(raw) => {
                if verbose {
                    log_debug!(self.logger, "Tool response: {}", raw);
                }
                Ok(InvocationResult::new(raw))
            }
            Err(e) => {
                log_error!(self.logger, "Tool call failed: {}", e);
                Err(ConnectionError::Call(e.to_string()))
            }
        }
    }

    /// Replace the configuration; a live connection is restarted with it
    pub async fn update_config(&self, config: WorkerConfig) -> Result<(), ConnectionError> {
        *self.config.write() = config;
        if self.status() == ConnectionStatus::Connected {
            self.disconnect().await;
            self.connect().await?;
        }
        Ok(())
    }

    /// Disconnect, then drop every observer
    pub async fn shutdown(&self) {
        self.disconnect().await;
        self.observers.write().clear();
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("status", &self.status())
            .field("tools", &self.tools.read().len())
            .field("observers", &self.observers.read().len())
            .finish()
    }
}
