//! Credential store
//!
//! The server URL lives in the plain settings; the username and API key go
//! through a `SecretStore` under namespaced keys. A configuration is only
//! ever returned whole: URL, username and API key all non-empty.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{ConfigError, SettingsProvider};
use crate::logging::{Logger, SharedLogger, TaggedLogger};
use crate::secrets::{SecretStore, SecretStoreError};
use crate::types::WorkerConfig;

/// Secret key holding the TestRail username
pub const SECRET_KEY_USERNAME: &str = "testrailMcp.username";

/// Secret key holding the TestRail API key
pub const SECRET_KEY_API_KEY: &str = "testrailMcp.apiKey";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to store credentials: {0}")]
    Storage(#[from] SecretStoreError),

    #[error("Failed to update settings: {0}")]
    Config(#[from] ConfigError),
}

pub type CredentialResult<T> = Result<T, CredentialError>;

/// Input validator: `Err` carries the message shown next to the input box
pub type Validator = fn(&str) -> Result<(), &'static str>;

pub fn validate_server_url(value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        return Err("Server URL is required");
    }
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|_| "Invalid URL format")
}

pub fn validate_username(value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        Err("Username is required")
    } else {
        Ok(())
    }
}

pub fn validate_api_key(value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        Err("API key is required")
    } else {
        Ok(())
    }
}

/// One input the credential flow asks the host for
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest {
    pub message: &'static str,
    pub placeholder: &'static str,
    /// Mask the input
    pub password: bool,
    pub validate: Validator,
}

impl PromptRequest {
    pub const SERVER_URL: PromptRequest = PromptRequest {
        message: "Enter TestRail server URL",
        placeholder: "https://your-instance.testrail.io",
        password: false,
        validate: validate_server_url,
    };

    pub const USERNAME: PromptRequest = PromptRequest {
        message: "Enter TestRail username (email)",
        placeholder: "your-email@example.com",
        password: false,
        validate: validate_username,
    };

    pub const API_KEY: PromptRequest = PromptRequest {
        message: "Enter TestRail API key",
        placeholder: "Your API key from TestRail",
        password: true,
        validate: validate_api_key,
    };
}

/// Host input surface (VS Code input box, terminal prompt, ...)
///
/// Hosts are expected to keep asking until `validate` passes. `None` means
/// the user dismissed the prompt.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn prompt(&self, request: &PromptRequest) -> Option<String>;
}

pub struct CredentialStore {
    secrets: Arc<dyn SecretStore>,
    settings: Arc<dyn SettingsProvider>,
    logger: TaggedLogger,
}

impl CredentialStore {
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        settings: Arc<dyn SettingsProvider>,
        logger: SharedLogger,
    ) -> Self {
        Self {
            secrets,
            settings,
            logger: TaggedLogger::new(logger, "Config"),
        }
    }

    pub fn secret_store(&self) -> &Arc<dyn SecretStore> {
        &self.secrets
    }

    pub fn settings(&self) -> &Arc<dyn SettingsProvider> {
        &self.settings
    }

    /// The complete worker configuration, or `None` if anything is missing
    ///
    /// Unreadable settings count as missing and are logged.
    pub async fn get(&self) -> Option<WorkerConfig> {
        let settings = match self.settings.get_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                self.logger.warn(&format!("Failed to read settings: {}", e));
                return None;
            }
        };
        let username = self.secrets.get(SECRET_KEY_USERNAME).unwrap_or_default();
        let api_key = self.secrets.get(SECRET_KEY_API_KEY).unwrap_or_default();

        WorkerConfig::from_parts(settings, username, api_key)
    }

    /// Store the username and API key
    ///
    /// If the API key cannot be written the previous username is put back,
    /// so a new username never pairs with an old key.
    pub fn set(&self, username: &str, api_key: &str) -> CredentialResult<()> {
        if !self.secrets.is_available() {
            return Err(SecretStoreError::NotAvailable(self.secrets.name().to_string()).into());
        }
        let previous = self.secrets.get(SECRET_KEY_USERNAME);
        self.secrets.store(SECRET_KEY_USERNAME, username)?;

        if let Err(e) = self.secrets.store(SECRET_KEY_API_KEY, api_key) {
            let restored = match &previous {
                Some(old) => self.secrets.store(SECRET_KEY_USERNAME, old),
                None => self.secrets.delete(SECRET_KEY_USERNAME),
            };
            if let Err(restore_error) = restored {
                self.logger
                    .error(&format!("Failed to restore previous username: {}", restore_error));
            }
            return Err(e.into());
        }

        self.logger.info("Credentials stored securely");
        Ok(())
    }

    /// Remove both secrets; clearing what is not there succeeds
    pub fn clear(&self) -> CredentialResult<()> {
        for key in [SECRET_KEY_USERNAME, SECRET_KEY_API_KEY] {
            match self.secrets.delete(key) {
                Ok(()) | Err(SecretStoreError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.logger.info("Credentials cleared");
        Ok(())
    }

    pub async fn is_configured(&self) -> bool {
        self.get().await.is_some()
    }

    /// Validate and persist the server URL
    pub async fn set_server_url(&self, url: &str) -> CredentialResult<()> {
        validate_server_url(url).map_err(|msg| CredentialError::Validation(msg.to_string()))?;
        self.settings.update_server_url(url).await?;
        Ok(())
    }

    /// Walk the user through the missing credentials
    ///
    /// Asks for the server URL only when none is set, and commits it before
    /// moving on. Returns `Ok(false)` as soon as a prompt is dismissed.
    pub async fn prompt_interactive(&self, prompter: &dyn Prompter) -> CredentialResult<bool> {
        let settings = self.settings.get_settings().await?;

        if settings.server_url.is_empty() {
            let Some(url) = ask(prompter, &PromptRequest::SERVER_URL).await? else {
                return Ok(false);
            };
            self.settings.update_server_url(&url).await?;
        }

        let Some(username) = ask(prompter, &PromptRequest::USERNAME).await? else {
            return Ok(false);
        };
        let Some(api_key) = ask(prompter, &PromptRequest::API_KEY).await? else {
            return Ok(false);
        };

        self.set(&username, &api_key)?;
        Ok(true)
    }
}

/// Prompt once; an empty answer counts as dismissed
async fn ask(prompter: &dyn Prompter, request: &PromptRequest) -> CredentialResult<Option<String>> {
    let Some(value) = prompter.prompt(request).await else {
        return Ok(None);
    };
    if value.is_empty() {
        return Ok(None);
    }
    (request.validate)(&value).map_err(|msg| CredentialError::Validation(msg.to_string()))?;
    Ok(Some(value))
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("secrets", &self.secrets.name())
            .finish()
    }
}
