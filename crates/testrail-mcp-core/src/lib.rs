//! TestRail MCP Core
//!
//! Runtime-agnostic bridge between a host application's tool framework and
//! the TestRail MCP server. The server runs as a child process and is spoken
//! to over MCP on its stdio. This crate can be hosted from Node.js (napi-rs,
//! for the VS Code extension) or from the native CLI.
//!
//! Data flow:
//!
//! ```text
//! host -> TestRailTool -> router -> ConnectionManager -> worker process
//! ```
//!
//! ```rust,ignore
//! use testrail_mcp_core::{Extension, CredentialStore, ChildProcessLauncher};
//!
//! let extension = Extension::new(credentials, ChildProcessLauncher::shared(logger.clone()), notifier, logger);
//! extension.activate().await;
//! let text = extension.invoke(&json!({"action": "list_projects"}), &CancellationToken::new()).await;
//! extension.deactivate().await;
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod credentials;
pub mod mcp;
pub mod connection;
pub mod router;
pub mod facade;
pub mod extension;

pub use types::{
    CancellationToken, ConnectionStatus, ContentKind, InvocationResult, ToolDescriptor,
    WorkerConfig, WorkerSettings,
};

pub use secrets::{
    SecretStore, SecretStoreError, SecretStoreResult,
    EnvSecretStore, MemorySecretStore, ChainSecretStore, KeychainSecretStore,
    register_secret_store, create_secret_store, list_secret_stores,
};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, MemoryLogger, SharedLogger, TaggedLogger};

pub use config::{SettingsProvider, MemorySettingsProvider, FileSettingsProvider, ConfigError};

pub use credentials::{
    CredentialStore, CredentialError, Prompter, PromptRequest,
    validate_server_url, validate_username, validate_api_key,
    SECRET_KEY_USERNAME, SECRET_KEY_API_KEY,
};

pub use mcp::{McpClient, McpError, McpResult, WorkerLauncher, WorkerSession, ChildProcessLauncher};

pub use connection::{ConnectionManager, ConnectionError, ObserverId};

pub use router::{resolve, normalize_args, route, InvocationRequest, ValidationError};

pub use facade::{TestRailTool, TOOL_NAME, tool_input_schema, format_result};

pub use extension::{Extension, Notifier, Notification, Severity, HostAction, LogNotifier};
