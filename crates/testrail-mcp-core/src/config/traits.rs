//! Settings provider trait

use async_trait::async_trait;

use crate::types::WorkerSettings;

/// Source of the plain (non-secret) worker settings
///
/// Implementations:
/// - `MemorySettingsProvider`: in-memory, for tests and hosts that push settings
/// - `FileSettingsProvider`: YAML file (~/.config/testrail-mcp/config.yaml)
/// - VS Code adapter: reads `testrailMcp.*` from the workspace configuration
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Current settings; missing values take their defaults
    async fn get_settings(&self) -> ConfigResult<WorkerSettings>;

    /// Persist a new server URL, leaving the other settings alone
    async fn update_server_url(&self, url: &str) -> ConfigResult<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
