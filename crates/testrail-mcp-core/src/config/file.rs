//! File-based settings provider (YAML)
//!
//! User-level file: `<config_dir>/testrail-mcp/config.yaml`.
//! Workspace-level file: `.config/testrail-mcp/config.yaml` under the workspace root.
//!
//! ```yaml
//! serverUrl: https://acme.testrail.io
//! workerPath: uvx
//! workerArgs:
//!   - testrail-mcp
//! debug: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{ConfigResult, SettingsProvider};
use crate::types::WorkerSettings;

const CONFIG_DIR_NAME: &str = "testrail-mcp";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Which settings file a provider reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    User,
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

/// Settings provider backed by a YAML file
///
/// A missing file reads as the defaults. The parsed file is cached until
/// `reload()` or the next save.
///
/// ```no_run
/// use testrail_mcp_core::config::FileSettingsProvider;
///
/// let user = FileSettingsProvider::user();
/// let workspace = FileSettingsProvider::workspace("/path/to/workspace");
/// ```
pub struct FileSettingsProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<WorkerSettings>>,
}

impl FileSettingsProvider {
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// User-level settings file
    pub fn user() -> Self {
        let config_dir = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
        Self::new(
            config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME),
            ConfigLevel::User,
        )
    }

    /// Workspace-level settings file
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root
            .as_ref()
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME);
        Self::new(path, ConfigLevel::Workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> ConfigResult<WorkerSettings> {
        if !self.path.exists() {
            return Ok(WorkerSettings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(WorkerSettings::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    fn save(&self, settings: &WorkerSettings) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(settings)?;
        fs::write(&self.path, content)?;

        *self.cache.write() = Some(settings.clone());
        Ok(())
    }

    fn cached(&self) -> ConfigResult<WorkerSettings> {
        if let Some(settings) = self.cache.read().as_ref() {
            return Ok(settings.clone());
        }
        self.reload()
    }

    /// Re-read the file, replacing the cache
    pub fn reload(&self) -> ConfigResult<WorkerSettings> {
        let settings = self.load()?;
        *self.cache.write() = Some(settings.clone());
        Ok(settings)
    }

    /// Write a complete settings value
    pub fn write_settings(&self, settings: &WorkerSettings) -> ConfigResult<()> {
        self.save(settings)
    }
}

impl std::fmt::Debug for FileSettingsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSettingsProvider")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl SettingsProvider for FileSettingsProvider {
    async fn get_settings(&self) -> ConfigResult<WorkerSettings> {
        self.cached()
    }

    async fn update_server_url(&self, url: &str) -> ConfigResult<()> {
        let mut settings = self.cached()?;
        settings.server_url = url.to_string();
        self.save(&settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_reads_defaults() {
        let dir = tempdir().unwrap();
        let provider = FileSettingsProvider::new(dir.path().join("config.yaml"), ConfigLevel::User);

        assert!(!provider.exists());
        assert_eq!(provider.get_settings().await.unwrap(), WorkerSettings::default());
    }

    #[tokio::test]
    async fn test_update_server_url_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let provider = FileSettingsProvider::new(&path, ConfigLevel::User);

        provider.update_server_url("https://acme.testrail.io").await.unwrap();
        assert!(provider.exists());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("serverUrl: https://acme.testrail.io"));

        let fresh = FileSettingsProvider::new(&path, ConfigLevel::User);
        let settings = fresh.get_settings().await.unwrap();
        assert_eq!(settings.server_url, "https://acme.testrail.io");
        assert_eq!(settings.worker_path, "uvx");
    }

    #[tokio::test]
    async fn test_partial_yaml_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "workerPath: /opt/bin/testrail-mcp\nworkerArgs: []\n").unwrap();

        let provider = FileSettingsProvider::new(&path, ConfigLevel::Workspace);
        let settings = provider.get_settings().await.unwrap();
        assert_eq!(settings.worker_path, "/opt/bin/testrail-mcp");
        assert!(settings.worker_args.is_empty());
        assert!(settings.server_url.is_empty());

        fs::write(&path, "debug: true\n").unwrap();
        // Cached until reload
        assert!(!provider.get_settings().await.unwrap().debug);
        assert!(provider.reload().unwrap().debug);
    }

    #[tokio::test]
    async fn test_malformed_yaml_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "workerArgs: [unterminated\n").unwrap();

        let provider = FileSettingsProvider::new(&path, ConfigLevel::User);
        assert!(matches!(
            provider.get_settings().await,
            Err(ConfigError::Serialization(_))
        ));
    }

    #[test]
    fn test_workspace_path() {
        let provider = FileSettingsProvider::workspace("/tmp/project");
        assert_eq!(provider.level(), ConfigLevel::Workspace);
        assert!(provider
            .path()
            .ends_with(".config/testrail-mcp/config.yaml"));
    }
}
