//! OS credential manager (macOS Keychain, Windows Credential Manager,
//! Secret Service on Linux)

use keyring::Entry;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};
use crate::logging::file_logger as log;

/// Service the TestRail secrets are filed under
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "testrail-mcp";

const PROBE_KEY: &str = "__testrail_mcp_probe__";

pub struct KeychainSecretStore {
    service: String,
}

impl KeychainSecretStore {
    pub fn new() -> Self {
        Self::with_service(DEFAULT_KEYCHAIN_SERVICE)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> SecretStoreResult<Entry> {
        Entry::new(&self.service, key).map_err(|e| backend_error(&self.service, e))
    }
}

impl Default for KeychainSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

fn backend_error(service: &str, e: keyring::Error) -> SecretStoreError {
    match e {
        keyring::Error::NoStorageAccess(_) | keyring::Error::PlatformFailure(_) => {
            SecretStoreError::NotAvailable(format!("keychain ({})", service))
        }
        other => SecretStoreError::Backend(other.to_string()),
    }
}

impl SecretStore for KeychainSecretStore {
    fn name(&self) -> &str {
        "keychain"
    }

    fn is_available(&self) -> bool {
        let probe = Entry::new(&self.service, PROBE_KEY).and_then(|entry| match entry.get_password() {
            Err(keyring::Error::NoEntry) => Ok(()),
            other => other.map(|_| ()),
        });
        match probe {
            Ok(()) => true,
            Err(e) => {
                log::warn("Keychain", &format!("unavailable: {}", e));
                false
            }
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.entry(key).ok()?.get_password() {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                log::warn("Keychain", &format!("read '{}' failed: {}", key, e));
                None
            }
        }
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        log::debug("Keychain", &format!("write '{}' to service '{}'", key, self.service));
        self.entry(key)?
            .set_password(value)
            .map_err(|e| backend_error(&self.service, e))?;

        // Some Secret Service backends accept a write they never persist
        match self.entry(key)?.get_password() {
            Ok(stored) if stored == value => Ok(()),
            Ok(_) => Err(SecretStoreError::Backend(format!(
                "'{}' read back with a different value",
                key
            ))),
            Err(e) => Err(backend_error(&self.service, e)),
        }
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(backend_error(&self.service, e)),
        }
    }
}

impl std::fmt::Debug for KeychainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeychainSecretStore")
            .field("service", &self.service)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::SECRET_KEY_API_KEY;

    #[test]
    #[ignore] // needs a desktop keychain
    fn test_round_trip_in_real_keychain() {
        let store = KeychainSecretStore::with_service("testrail-mcp-test");
        store.delete(SECRET_KEY_API_KEY).unwrap();

        store.store(SECRET_KEY_API_KEY, "k3y").unwrap();
        assert_eq!(store.get(SECRET_KEY_API_KEY).as_deref(), Some("k3y"));
        store.delete(SECRET_KEY_API_KEY).unwrap();
        store.delete(SECRET_KEY_API_KEY).unwrap();
        assert_eq!(store.get(SECRET_KEY_API_KEY), None);
    }

    #[test]
    fn test_service_name() {
        assert_eq!(KeychainSecretStore::new().service(), DEFAULT_KEYCHAIN_SERVICE);
        assert_eq!(KeychainSecretStore::with_service("other").service(), "other");
        assert_eq!(KeychainSecretStore::new().name(), "keychain");
    }
}
