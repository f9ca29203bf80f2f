//! Layered secret lookup

use std::sync::Arc;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Reads from the first available layer that has the key
///
/// Writes land in the first layer that is writable; deletes clear every
/// writable layer, so a cleared credential cannot resurface from a lower
/// saved layer. Read-only layers (environment) keep their values.
///
/// ```
/// use std::sync::Arc;
/// use testrail_mcp_core::secrets::{ChainSecretStore, EnvSecretStore, MemorySecretStore, SecretStore};
///
/// let saved = Arc::new(MemorySecretStore::new());
/// let chain = ChainSecretStore::new(vec![saved.clone(), Arc::new(EnvSecretStore::new())]);
/// chain.store("testrailMcp.apiKey", "k3y").unwrap();
/// assert_eq!(saved.get("testrailMcp.apiKey").as_deref(), Some("k3y"));
/// ```
pub struct ChainSecretStore {
    layers: Vec<Arc<dyn SecretStore>>,
}

impl ChainSecretStore {
    pub fn new(layers: Vec<Arc<dyn SecretStore>>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[Arc<dyn SecretStore>] {
        &self.layers
    }

    fn readable(&self) -> impl Iterator<Item = &Arc<dyn SecretStore>> {
        self.layers.iter().filter(|layer| layer.is_available())
    }
}

impl SecretStore for ChainSecretStore {
    fn name(&self) -> &str {
        "chain"
    }

    fn is_available(&self) -> bool {
        self.layers.iter().any(|layer| layer.is_available())
    }

    fn is_writable(&self) -> bool {
        self.layers.iter().any(|layer| layer.is_writable())
    }

    fn get(&self, key: &str) -> Option<String> {
        self.readable().find_map(|layer| layer.get(key))
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        let target = self
            .layers
            .iter()
            .find(|layer| layer.is_writable())
            .ok_or_else(|| SecretStoreError::ReadOnly(self.name().to_string()))?;
        if !target.is_available() {
            return Err(SecretStoreError::NotAvailable(target.name().to_string()));
        }
        target.store(key, value)
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        for layer in self.layers.iter().filter(|layer| layer.is_writable()) {
            match layer.delete(key) {
                Ok(()) | Err(SecretStoreError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn source_of(&self, key: &str) -> Option<String> {
        self.readable().find_map(|layer| layer.source_of(key))
    }
}

impl std::fmt::Debug for ChainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.layers.iter().map(|layer| layer.name()).collect();
        f.debug_struct("ChainSecretStore").field("layers", &names).finish()
    }
}
