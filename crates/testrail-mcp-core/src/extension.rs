//! Host controller
//!
//! The application context a host creates once: it owns the credential
//! store, the current connection and tool, and implements the host commands
//! (configure credentials, test connection, reconnect). `deactivate` is the
//! single teardown path.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::connection::{ConnectionError, ConnectionManager};
use crate::credentials::{CredentialResult, CredentialStore, Prompter};
use crate::facade::{error_text, TestRailTool};
use crate::logging::{Logger, SharedLogger};
use crate::mcp::WorkerLauncher;
use crate::types::{CancellationToken, ConnectionStatus, ToolDescriptor};
use crate::{log_error, log_info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Follow-up a notification can offer the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    /// Run the configure-credentials command
    Configure,
}

impl HostAction {
    pub fn label(&self) -> &'static str {
        match self {
            HostAction::Configure => "Configure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    pub action: Option<HostAction>,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            action: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            action: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            action: None,
        }
    }

    pub fn with_action(mut self, action: HostAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// User-visible message surface of the host
///
/// When a notification carries an action and the user picks it, the host
/// runs the corresponding command.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    /// Update the status indicator
    fn show_status(&self, _status: ConnectionStatus) {}
}

/// Notifier that forwards everything to a logger
pub struct LogNotifier {
    logger: SharedLogger,
}

impl LogNotifier {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        let message = match notification.action {
            Some(action) => format!("{} [{}]", notification.message, action.label()),
            None => notification.message,
        };
        match notification.severity {
            Severity::Info => self.logger.info(&message),
            Severity::Warning => self.logger.warn(&message),
            Severity::Error => self.logger.error(&message),
        }
    }
}

pub struct Extension {
    logger: SharedLogger,
    credentials: Arc<CredentialStore>,
    launcher: Arc<dyn WorkerLauncher>,
    notifier: Arc<dyn Notifier>,
    connection: RwLock<Option<Arc<ConnectionManager>>>,
    tool: RwLock<Option<Arc<TestRailTool>>>,
}

impl Extension {
    pub fn new(
        credentials: Arc<CredentialStore>,
        launcher: Arc<dyn WorkerLauncher>,
        notifier: Arc<dyn Notifier>,
        logger: SharedLogger,
    ) -> Self {
        Self {
            logger,
            credentials,
            launcher,
            notifier,
            connection: RwLock::new(None),
            tool: RwLock::new(None),
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn connection(&self) -> Option<Arc<ConnectionManager>> {
        self.connection.read().clone()
    }

    pub fn tool(&self) -> Option<Arc<TestRailTool>> {
        self.tool.read().clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.connection()
            .map(|c| c.status())
            .unwrap_or(ConnectionStatus::Disconnected)
    }

    pub fn tools(&self) -> Arc<Vec<ToolDescriptor>> {
        self.connection()
            .map(|c| c.tools())
            .unwrap_or_default()
    }

    /// Auto-connect if credentials are present; never fails
    pub async fn activate(&self) {
        self.logger.info("TestRail MCP Extension activated");
        self.notifier.show_status(ConnectionStatus::Disconnected);

        if let Err(e) = self.initialize_connection().await {
            log_error!(self.logger, "Failed to initialize connection: {}", e);
            self.notifier.notify(
                Notification::warning(
                    "TestRail MCP: Failed to connect. Use \"TestRail MCP: Configure Credentials\" to set up.",
                )
                .with_action(HostAction::Configure),
            );
        }

        self.logger.info("TestRail MCP Extension activation complete");
    }

    /// Connect with the stored credentials, replacing any previous connection
    pub async fn initialize_connection(&self) -> Result<(), ConnectionError> {
        let Some(config) = self.credentials.get().await else {
            self.logger.info("No configuration found, skipping auto-connect");
            return Ok(());
        };
        self.logger.info("Configuration found, attempting to connect...");

        let previous = self.connection.write().take();
        self.tool.write().take();
        if let Some(previous) = previous {
            previous.shutdown().await;
        }

        let manager = Arc::new(ConnectionManager::new(
            config,
            self.launcher.clone(),
            self.logger.clone(),
        ));
        let notifier = self.notifier.clone();
        let logger = self.logger.clone();
        manager.on_status_change(move |status| {
            notifier.show_status(status);
            match status {
                ConnectionStatus::Connected => {
                    notifier.notify(Notification::info("TestRail MCP: Connected successfully"));
                }
                ConnectionStatus::Error => {
                    logger.error("Connection error");
                    notifier.notify(Notification::error(
                        "TestRail MCP: Connection error. Check output for details.",
                    ));
                }
                _ => {}
            }
        });
        *self.connection.write() = Some(manager.clone());

        manager.connect().await?;

        *self.tool.write() = Some(Arc::new(TestRailTool::new(manager, self.logger.clone())));
        self.logger.info("TestRail MCP tool registered");
        Ok(())
    }

    /// Prompt for credentials and reconnect with them
    ///
    /// Returns `Ok(false)` if the user dismissed a prompt.
    pub async fn configure_credentials(&self, prompter: &dyn Prompter) -> CredentialResult<bool> {
        self.logger.info("Configure Credentials command invoked");

        if !self.credentials.prompt_interactive(prompter).await? {
            return Ok(false);
        }
        self.notifier.notify(Notification::info(
            "TestRail MCP credentials configured successfully",
        ));
        self.reconnect().await;
        Ok(true)
    }

    /// Round-trip `get_projects`; true on success
    pub async fn test_connection(&self) -> bool {
        self.logger.info("Test Connection command invoked");

        let manager = match self.connection() {
            Some(manager) if manager.status() == ConnectionStatus::Connected => manager,
            _ => {
                self.notifier.notify(Notification::warning(
                    "TestRail MCP: Not connected. Use \"Reconnect\" to connect.",
                ));
                return false;
            }
        };

        match manager.call("get_projects", Map::new()).await {
            Ok(result) => {
                log_info!(self.logger, "Connection test result: {}", result.as_value());
                self.notifier
                    .notify(Notification::info("TestRail MCP: Connection test successful"));
                true
            }
            Err(e) => {
                log_error!(self.logger, "Connection test failed: {}", e);
                self.notifier.notify(Notification::error(format!(
                    "TestRail MCP: Connection test failed - {}",
                    e
                )));
                false
            }
        }
    }

    /// Drop the current connection and connect again; true if connected
    pub async fn reconnect(&self) -> bool {
        self.logger.info("Reconnect command invoked");

        if let Some(manager) = self.connection() {
            manager.disconnect().await;
        }

        if let Err(e) = self.initialize_connection().await {
            log_error!(self.logger, "Reconnect failed: {}", e);
            self.notifier.notify(
                Notification::error("TestRail MCP: Failed to connect. Please check your configuration.")
                    .with_action(HostAction::Configure),
            );
        }
        self.status() == ConnectionStatus::Connected
    }

    /// Host tool entry point; always yields a display string
    pub async fn invoke(&self, input: &Value, cancel: &CancellationToken) -> String {
        match self.tool() {
            Some(tool) => tool.invoke(input, cancel).await,
            None => error_text(&ConnectionError::NotConnected.to_string()),
        }
    }

    /// Tear everything down; no observer fires afterwards
    pub async fn deactivate(&self) {
        let manager = self.connection.write().take();
        if let Some(manager) = &manager {
            manager.shutdown().await;
        }
        self.tool.write().take();
        drop(manager);
        self.logger.info("TestRail MCP Extension deactivated");
    }
}

impl std::fmt::Debug for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extension")
            .field("status", &self.status())
            .field("tool", &self.tool.read().is_some())
            .finish()
    }
}
