//! The secret storage seam

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretStoreError {
    /// The store cannot hold new values (environment variables)
    #[error("Secret store '{0}' is read-only")]
    ReadOnly(String),

    #[error("No secret stored under '{0}'")]
    NotFound(String),

    /// Locked or missing keychain, or a test store switched off
    #[error("Secret store '{0}' is not available")]
    NotAvailable(String),

    #[error("Secret store backend failed: {0}")]
    Backend(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Host-provided secure key/value storage
///
/// The TestRail username and API key are kept here under
/// `testrailMcp.username` / `testrailMcp.apiKey` and never in plain
/// settings.
///
/// ```
/// use testrail_mcp_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.store("testrailMcp.username", "qa@example.com").unwrap();
/// assert_eq!(store.source_of("testrailMcp.username").as_deref(), Some("memory"));
/// ```
pub trait SecretStore: Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }

    /// False for stores that only read (so a chain can skip them for writes)
    fn is_writable(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Option<String>;

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()>;

    /// Remove `key`; removing an absent key succeeds
    fn delete(&self, key: &str) -> SecretStoreResult<()>;

    /// Name of the store the value of `key` would be read from
    fn source_of(&self, key: &str) -> Option<String> {
        self.get(key).map(|_| self.name().to_string())
    }
}
