//! Worker settings and resolved launch configuration

use serde::{Deserialize, Serialize};

/// Default launcher used to run the TestRail MCP server
pub const DEFAULT_WORKER_PATH: &str = "uvx";

/// Default package the launcher runs
pub const DEFAULT_WORKER_PACKAGE: &str = "testrail-mcp";

fn default_worker_path() -> String {
    DEFAULT_WORKER_PATH.to_string()
}

fn default_worker_args() -> Vec<String> {
    vec![DEFAULT_WORKER_PACKAGE.to_string()]
}

/// Plain (non-secret) settings read from the host's settings surface
///
/// Serialized with the host's camelCase keys. Missing keys take their
/// defaults, so an empty settings file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSettings {
    /// TestRail instance URL, empty when not configured
    #[serde(default)]
    pub server_url: String,
    /// Executable that launches the worker
    #[serde(default = "default_worker_path")]
    pub worker_path: String,
    /// Arguments passed to the launcher
    #[serde(default = "default_worker_args")]
    pub worker_args: Vec<String>,
    /// Verbose logging of worker traffic
    #[serde(default)]
    pub debug: bool,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            worker_path: default_worker_path(),
            worker_args: default_worker_args(),
            debug: false,
        }
    }
}

/// Fully resolved configuration for one worker connection
///
/// Only constructed when URL, username and API key are all present.
#[derive(Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub server_url: String,
    pub username: String,
    pub api_key: String,
    pub worker_path: String,
    pub worker_args: Vec<String>,
    pub debug: bool,
}

impl WorkerConfig {
    /// Combine settings with the two secrets
    ///
    /// Returns `None` if any of URL, username or API key is empty.
    pub fn from_parts(settings: WorkerSettings, username: String, api_key: String) -> Option<Self> {
        if settings.server_url.is_empty() || username.is_empty() || api_key.is_empty() {
            return None;
        }
        Some(Self {
            server_url: settings.server_url,
            username,
            api_key,
            worker_path: settings.worker_path,
            worker_args: settings.worker_args,
            debug: settings.debug,
        })
    }

    /// The command line as it would be typed, for logging
    pub fn command_line(&self) -> String {
        std::iter::once(self.worker_path.as_str())
            .chain(self.worker_args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// The API key must never reach a log line through `{:?}`
impl std::fmt::Debug for WorkerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerConfig")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .field("worker_path", &self.worker_path)
            .field("worker_args", &self.worker_args)
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: &str) -> WorkerSettings {
        WorkerSettings {
            server_url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_settings_defaults_from_empty_json() {
        let parsed: WorkerSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, WorkerSettings::default());
        assert_eq!(parsed.worker_path, "uvx");
        assert_eq!(parsed.worker_args, vec!["testrail-mcp".to_string()]);
        assert!(!parsed.debug);
    }

    #[test]
    fn test_settings_camel_case_keys() {
        let parsed: WorkerSettings = serde_json::from_str(
            r#"{"serverUrl":"https://acme.testrail.io","workerPath":"python","workerArgs":["-m","testrail_mcp"],"debug":true}"#,
        )
        .unwrap();
        assert_eq!(parsed.server_url, "https://acme.testrail.io");
        assert_eq!(parsed.worker_path, "python");
        assert_eq!(parsed.worker_args.len(), 2);
        assert!(parsed.debug);
    }

    #[test]
    fn test_worker_config_requires_all_fields() {
        let url = "https://acme.testrail.io";
        assert!(WorkerConfig::from_parts(settings(url), "u".into(), "k".into()).is_some());
        assert!(WorkerConfig::from_parts(settings(""), "u".into(), "k".into()).is_none());
        assert!(WorkerConfig::from_parts(settings(url), "".into(), "k".into()).is_none());
        assert!(WorkerConfig::from_parts(settings(url), "u".into(), "".into()).is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config =
            WorkerConfig::from_parts(settings("https://x.io"), "u".into(), "secret-key".into()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
        assert_eq!(config.command_line(), "uvx testrail-mcp");
    }
}
