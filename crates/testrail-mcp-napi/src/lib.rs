//! Node.js bindings for the TestRail MCP bridge via napi-rs
//!
//! The VS Code extension creates one `TestRailBridge`, wires its callbacks to
//! the output channel, status bar item and message API, and forwards tool
//! invocations to `invoke`. Prompts run on the JS side with the exported
//! validators.

#![deny(clippy::all)]

use std::sync::Arc;

use napi::bindgen_prelude::*;
use napi::threadsafe_function::{ThreadsafeFunction, ThreadsafeFunctionCallMode};
use napi_derive::napi;
use parking_lot::RwLock;
use serde_json::Value;

use testrail_mcp_core::config::{
    ConfigLevel, FileSettingsProvider, MemorySettingsProvider, SettingsProvider,
};
use testrail_mcp_core::credentials::{
    validate_api_key as core_validate_api_key, validate_server_url as core_validate_server_url,
    validate_username as core_validate_username, CredentialStore,
};
use testrail_mcp_core::extension::{
    Extension, HostAction, Notification as CoreNotification, Notifier, Severity,
};
use testrail_mcp_core::facade::{error_text, tool_input_schema, TOOL_NAME};
use testrail_mcp_core::logging::{file_logger, Logger, SharedLogger};
use testrail_mcp_core::mcp::ChildProcessLauncher;
use testrail_mcp_core::secrets::{create_secret_store, list_secret_stores};
use testrail_mcp_core::types::{CancellationToken, ConnectionStatus, WorkerSettings};

const DEFAULT_SECRET_STORE: &str = "chain";

// ============================================================================
// Objects
// ============================================================================

#[napi(object)]
pub struct BridgeSettings {
    pub server_url: Option<String>,
    pub worker_path: Option<String>,
    pub worker_args: Option<Vec<String>>,
    pub debug: Option<bool>,
}

impl From<BridgeSettings> for WorkerSettings {
    fn from(settings: BridgeSettings) -> Self {
        let defaults = WorkerSettings::default();
        Self {
            server_url: settings.server_url.unwrap_or(defaults.server_url),
            worker_path: settings.worker_path.unwrap_or(defaults.worker_path),
            worker_args: settings.worker_args.unwrap_or(defaults.worker_args),
            debug: settings.debug.unwrap_or(defaults.debug),
        }
    }
}

#[napi(object)]
pub struct BridgeOptions {
    /// Secret store name (`chain`, `keychain`, `env`, `memory`)
    pub secret_store: Option<String>,
    /// YAML settings file; when absent settings are pushed with `updateSettings`
    pub settings_file: Option<String>,
    /// Initial settings for the in-memory provider
    pub settings: Option<BridgeSettings>,
}

#[napi(object)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    /// JSON Schema as a JSON string
    pub input_schema: String,
}

#[napi(object)]
pub struct StatusIndicator {
    pub status: String,
    pub text: String,
    pub tooltip: String,
    pub is_error: bool,
}

#[napi(object)]
#[derive(Clone)]
pub struct NotificationEvent {
    /// `info`, `warning` or `error`
    pub severity: String,
    pub message: String,
    /// Button label the host should offer (`Configure`)
    pub action: Option<String>,
}

impl From<CoreNotification> for NotificationEvent {
    fn from(notification: CoreNotification) -> Self {
        let severity = match notification.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        Self {
            severity: severity.to_string(),
            message: notification.message,
            action: notification.action.map(|a: HostAction| a.label().to_string()),
        }
    }
}

#[napi(object)]
pub struct LogEvent {
    pub level: String,
    pub message: String,
}

#[napi(object)]
pub struct StoreInfo {
    pub name: String,
    pub description: String,
}

// ============================================================================
// JS callback adapters
// ============================================================================

/// Logger that writes to the debug log file and, once registered, the JS
/// output channel callback
#[derive(Default)]
struct JsLogger {
    sink: RwLock<Option<ThreadsafeFunction<LogEvent>>>,
}

impl JsLogger {
    fn emit(&self, level: &'static str, message: &str) {
        match level {
            "debug" => file_logger::debug("napi", message),
            "info" => file_logger::info("napi", message),
            "warn" => file_logger::warn("napi", message),
            _ => file_logger::error("napi", message),
        }
        if let Some(sink) = self.sink.read().as_ref() {
            sink.call(
                Ok(LogEvent {
                    level: level.to_string(),
                    message: message.to_string(),
                }),
                ThreadsafeFunctionCallMode::NonBlocking,
            );
        }
    }
}

impl Logger for JsLogger {
    fn debug(&self, message: &str) {
        self.emit("debug", message);
    }

    fn info(&self, message: &str) {
        self.emit("info", message);
    }

    fn warn(&self, message: &str) {
        self.emit("warn", message);
    }

    fn error(&self, message: &str) {
        self.emit("error", message);
    }
}

#[derive(Default)]
struct JsNotifier {
    notifications: RwLock<Vec<ThreadsafeFunction<NotificationEvent>>>,
    statuses: RwLock<Vec<ThreadsafeFunction<String>>>,
}

impl Notifier for JsNotifier {
    fn notify(&self, notification: CoreNotification) {
        file_logger::info("napi", &format!("notify: {}", notification.message));
        let event = NotificationEvent::from(notification);
        for callback in self.notifications.read().iter() {
            callback.call(Ok(event.clone()), ThreadsafeFunctionCallMode::NonBlocking);
        }
    }

    fn show_status(&self, status: ConnectionStatus) {
        for callback in self.statuses.read().iter() {
            callback.call(
                Ok(status.as_str().to_string()),
                ThreadsafeFunctionCallMode::NonBlocking,
            );
        }
    }
}

enum SettingsHandle {
    Memory(Arc<MemorySettingsProvider>),
    File(Arc<FileSettingsProvider>),
}

impl SettingsHandle {
    fn provider(&self) -> Arc<dyn SettingsProvider> {
        match self {
            SettingsHandle::Memory(p) => p.clone(),
            SettingsHandle::File(p) => p.clone(),
        }
    }
}

fn to_napi_error(e: impl std::fmt::Display) -> Error {
    Error::from_reason(e.to_string())
}

// ============================================================================
// TestRailBridge
// ============================================================================

#[napi]
pub struct TestRailBridge {
    extension: Arc<Extension>,
    logger: Arc<JsLogger>,
    notifier: Arc<JsNotifier>,
    settings: SettingsHandle,
}

#[napi]
impl TestRailBridge {
    #[napi(constructor)]
    pub fn new(options: Option<BridgeOptions>) -> Result<Self> {
        let options = options.unwrap_or(BridgeOptions {
            secret_store: None,
            settings_file: None,
            settings: None,
        });

        let store_name = options
            .secret_store
            .unwrap_or_else(|| DEFAULT_SECRET_STORE.to_string());
        let secrets = create_secret_store(&store_name)
            .ok_or_else(|| Error::from_reason(format!("Unknown secret store: {}", store_name)))?;

        let settings = match options.settings_file {
            Some(path) => SettingsHandle::File(Arc::new(FileSettingsProvider::new(path, ConfigLevel::User))),
            None => SettingsHandle::Memory(Arc::new(MemorySettingsProvider::with_settings(
                options.settings.map(WorkerSettings::from).unwrap_or_default(),
            ))),
        };

        let logger = Arc::new(JsLogger::default());
        let notifier = Arc::new(JsNotifier::default());
        let shared_logger: SharedLogger = logger.clone();

        let credentials = Arc::new(CredentialStore::new(
            secrets,
            settings.provider(),
            shared_logger.clone(),
        ));
        let extension = Arc::new(Extension::new(
            credentials,
            ChildProcessLauncher::shared(shared_logger.clone()),
            notifier.clone(),
            shared_logger,
        ));

        file_logger::info("napi", &format!("TestRailBridge created, secret store '{}'", store_name));

        Ok(Self {
            extension,
            logger,
            notifier,
            settings,
        })
    }

    #[napi(getter)]
    pub fn tool_name(&self) -> String {
        TOOL_NAME.to_string()
    }

    #[napi]
    pub async fn activate(&self) {
        self.extension.activate().await;
    }

    #[napi]
    pub async fn deactivate(&self) {
        self.extension.deactivate().await;
    }

    /// Run one tool invocation; `input` is the JSON object from the model
    #[napi]
    pub async fn invoke(&self, input: String) -> String {
        let value: Value = match serde_json::from_str(&input) {
            Ok(value) => value,
            Err(e) => return error_text(&format!("Invalid tool input: {}", e)),
        };
        self.extension.invoke(&value, &CancellationToken::new()).await
    }

    #[napi]
    pub async fn reconnect(&self) -> bool {
        self.extension.reconnect().await
    }

    #[napi]
    pub async fn test_connection(&self) -> bool {
        self.extension.test_connection().await
    }

    #[napi]
    pub fn status(&self) -> String {
        self.extension.status().as_str().to_string()
    }

    #[napi]
    pub fn status_indicator(&self) -> StatusIndicator {
        let status = self.extension.status();
        StatusIndicator {
            status: status.as_str().to_string(),
            text: status.label().to_string(),
            tooltip: status.tooltip().to_string(),
            is_error: status.is_error(),
        }
    }

    #[napi]
    pub fn tools(&self) -> Vec<ToolInfo> {
        self.extension
            .tools()
            .iter()
            .map(|tool| ToolInfo {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.input_schema.to_string(),
            })
            .collect()
    }

    #[napi]
    pub async fn set_credentials(&self, username: String, api_key: String) -> Result<()> {
        self.extension
            .credentials()
            .set(&username, &api_key)
            .map_err(to_napi_error)
    }

    #[napi]
    pub async fn set_server_url(&self, url: String) -> Result<()> {
        self.extension
            .credentials()
            .set_server_url(&url)
            .await
            .map_err(to_napi_error)
    }

    #[napi]
    pub async fn clear_credentials(&self) -> Result<()> {
        self.extension.credentials().clear().map_err(to_napi_error)
    }

    #[napi]
    pub async fn is_configured(&self) -> bool {
        self.extension.credentials().is_configured().await
    }

    /// Replace the plain settings (VS Code `testrailMcp.*` configuration)
    #[napi]
    pub async fn update_settings(&self, settings: BridgeSettings) -> Result<()> {
        let settings = WorkerSettings::from(settings);
        match &self.settings {
            SettingsHandle::Memory(provider) => {
                provider.set_settings(settings);
                Ok(())
            }
            SettingsHandle::File(provider) => provider.write_settings(&settings).map_err(to_napi_error),
        }
    }

    #[napi]
    pub fn on_status_change(
        &self,
        #[napi(ts_arg_type = "(err: Error | null, status: string) => void")]
        callback: ThreadsafeFunction<String>,
    ) {
        self.notifier.statuses.write().push(callback);
    }

    #[napi]
    pub fn on_notification(
        &self,
        #[napi(ts_arg_type = "(err: Error | null, event: NotificationEvent) => void")]
        callback: ThreadsafeFunction<NotificationEvent>,
    ) {
        self.notifier.notifications.write().push(callback);
    }

    #[napi]
    pub fn on_log(
        &self,
        #[napi(ts_arg_type = "(err: Error | null, event: LogEvent) => void")]
        callback: ThreadsafeFunction<LogEvent>,
    ) {
        *self.logger.sink.write() = Some(callback);
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Host input schema of the tool, as a JSON string
#[napi]
pub fn tool_schema() -> String {
    tool_input_schema().to_string()
}

/// `null` when valid, otherwise the message to show under the input box
#[napi]
pub fn validate_server_url(value: String) -> Option<String> {
    core_validate_server_url(&value).err().map(str::to_string)
}

#[napi]
pub fn validate_username(value: String) -> Option<String> {
    core_validate_username(&value).err().map(str::to_string)
}

#[napi]
pub fn validate_api_key(value: String) -> Option<String> {
    core_validate_api_key(&value).err().map(str::to_string)
}

#[napi]
pub fn get_secret_stores() -> Vec<StoreInfo> {
    list_secret_stores()
        .into_iter()
        .map(|(name, description)| StoreInfo { name, description })
        .collect()
}

#[napi]
pub fn debug_log_path() -> String {
    file_logger::log_file_path().to_string_lossy().into_owned()
}
