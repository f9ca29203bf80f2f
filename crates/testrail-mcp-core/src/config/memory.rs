//! In-memory settings provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{ConfigResult, SettingsProvider};
use crate::types::WorkerSettings;

/// Settings held in memory
#[derive(Debug, Default)]
pub struct MemorySettingsProvider {
    settings: RwLock<WorkerSettings>,
}

impl MemorySettingsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: WorkerSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Replace all settings (hosts that push their own configuration)
    pub fn set_settings(&self, settings: WorkerSettings) {
        *self.settings.write() = settings;
    }
}

#[async_trait]
impl SettingsProvider for MemorySettingsProvider {
    async fn get_settings(&self) -> ConfigResult<WorkerSettings> {
        Ok(self.settings.read().clone())
    }

    async fn update_server_url(&self, url: &str) -> ConfigResult<()> {
        self.settings.write().server_url = url.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_settings_provider() {
        let provider = MemorySettingsProvider::new();
        assert_eq!(provider.get_settings().await.unwrap(), WorkerSettings::default());

        provider.update_server_url("https://acme.testrail.io").await.unwrap();
        let settings = provider.get_settings().await.unwrap();
        assert_eq!(settings.server_url, "https://acme.testrail.io");
        assert_eq!(settings.worker_path, "uvx");

        provider.set_settings(WorkerSettings {
            debug: true,
            ..Default::default()
        });
        let settings = provider.get_settings().await.unwrap();
        assert!(settings.debug);
        assert!(settings.server_url.is_empty());
    }
}
