//! Where the TestRail username and API key live
//!
//! Everything goes through [`SecretStore`]. Hosts pick a store by name
//! from the registry; `chain` (keychain over environment) is the default.

mod chain_store;
mod env_store;
mod keychain_store;
mod memory_store;
mod registry;
mod traits;

pub use chain_store::ChainSecretStore;
pub use env_store::EnvSecretStore;
pub use keychain_store::{KeychainSecretStore, DEFAULT_KEYCHAIN_SERVICE};
pub use memory_store::MemorySecretStore;
pub use registry::{
    create_secret_store, list_secret_stores, register_secret_store, unregister_secret_store,
    StoreFactory,
};
pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
