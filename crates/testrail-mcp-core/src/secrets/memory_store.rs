//! In-memory secret store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Process-lifetime credentials, for tests and throwaway CLI sessions
///
/// `set_available(false)` makes it behave like a locked keychain: reads see
/// nothing and writes fail with `NotAvailable`.
#[derive(Debug)]
pub struct MemorySecretStore {
    values: RwLock<HashMap<String, String>>,
    available: AtomicBool,
}

impl Default for MemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    fn writable(&self) -> SecretStoreResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(SecretStoreError::NotAvailable(self.name().to_string()))
        }
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.is_available()
            .then(|| self.values.read().get(key).cloned())
            .flatten()
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        self.writable()?;
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        self.writable()?;
        self.values.write().remove(key);
        Ok(())
    }
}
