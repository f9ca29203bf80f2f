//! Secret stores selectable by name (`--secrets`, the napi `secretStore` option)

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::chain_store::ChainSecretStore;
use super::env_store::EnvSecretStore;
use super::keychain_store::KeychainSecretStore;
use super::memory_store::MemorySecretStore;
use super::traits::SecretStore;

pub type StoreFactory = Box<dyn Fn() -> Arc<dyn SecretStore> + Send + Sync>;

struct Registered {
    description: String,
    factory: StoreFactory,
}

fn factory<S: SecretStore + 'static>(make: fn() -> S) -> StoreFactory {
    Box::new(move || Arc::new(make()))
}

/// Keychain for saved credentials, exported variables underneath
fn default_chain() -> Arc<dyn SecretStore> {
    Arc::new(ChainSecretStore::new(vec![
        Arc::new(KeychainSecretStore::new()),
        Arc::new(EnvSecretStore::new()),
    ]))
}

static STORES: Lazy<RwLock<BTreeMap<String, Registered>>> = Lazy::new(|| {
    let builtin: [(&str, &str, StoreFactory); 4] = [
        (
            "chain",
            "System keychain, falling back to TESTRAIL_USERNAME / TESTRAIL_API_KEY",
            Box::new(default_chain),
        ),
        (
            "env",
            "TESTRAIL_USERNAME / TESTRAIL_API_KEY (read-only)",
            factory(EnvSecretStore::new),
        ),
        (
            "keychain",
            "System keychain",
            factory(KeychainSecretStore::new),
        ),
        (
            "memory",
            "Kept in memory until the process exits",
            factory(MemorySecretStore::new),
        ),
    ];
    let map = builtin
        .into_iter()
        .map(|(name, description, factory)| {
            (
                name.to_string(),
                Registered {
                    description: description.to_string(),
                    factory,
                },
            )
        })
        .collect();
    RwLock::new(map)
});

/// Add or replace a named store
pub fn register_secret_store(name: &str, description: &str, factory: StoreFactory) {
    STORES.write().insert(
        name.to_string(),
        Registered {
            description: description.to_string(),
            factory,
        },
    );
}

pub fn create_secret_store(name: &str) -> Option<Arc<dyn SecretStore>> {
    STORES.read().get(name).map(|store| (store.factory)())
}

/// (name, description) pairs, sorted by name
pub fn list_secret_stores() -> Vec<(String, String)> {
    STORES
        .read()
        .iter()
        .map(|(name, store)| (name.clone(), store.description.clone()))
        .collect()
}

pub fn unregister_secret_store(name: &str) -> bool {
    STORES.write().remove(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let names: Vec<_> = list_secret_stores().into_iter().map(|(name, _)| name).collect();
        for name in ["chain", "env", "keychain", "memory"] {
            assert!(names.iter().any(|n| n == name), "{} missing", name);
        }
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_create_by_name() {
        assert_eq!(create_secret_store("env").map(|s| s.name().to_string()).as_deref(), Some("env"));
        assert_eq!(create_secret_store("chain").map(|s| s.name().to_string()).as_deref(), Some("chain"));
        assert!(create_secret_store("vault").is_none());
    }

    #[test]
    fn test_memory_stores_are_independent() {
        let a = create_secret_store("memory").unwrap();
        let b = create_secret_store("memory").unwrap();
        a.store("testrailMcp.username", "qa@example.com").unwrap();
        assert_eq!(b.get("testrailMcp.username"), None);
    }

    #[test]
    fn test_register_and_remove() {
        register_secret_store(
            "scratch_test_store",
            "scratch",
            factory(MemorySecretStore::new),
        );
        assert!(create_secret_store("scratch_test_store").is_some());
        assert!(unregister_secret_store("scratch_test_store"));
        assert!(!unregister_secret_store("scratch_test_store"));
    }
}
