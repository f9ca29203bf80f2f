//! Credentials exported in the environment

use std::env;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};
use crate::credentials::{SECRET_KEY_API_KEY, SECRET_KEY_USERNAME};

/// Read-only store over the same variables the worker itself understands
///
/// `testrailMcp.username` reads `TESTRAIL_USERNAME` and `testrailMcp.apiKey`
/// reads `TESTRAIL_API_KEY`. Other keys are not served. Empty variables
/// count as unset.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    /// Environment variable that backs a secret key
    pub fn variable_for(key: &str) -> Option<&'static str> {
        match key {
            SECRET_KEY_USERNAME => Some("TESTRAIL_USERNAME"),
            SECRET_KEY_API_KEY => Some("TESTRAIL_API_KEY"),
            _ => None,
        }
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn is_writable(&self) -> bool {
        false
    }

    fn get(&self, key: &str) -> Option<String> {
        let var = Self::variable_for(key)?;
        env::var(var).ok().filter(|value| !value.is_empty())
    }

    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly(self.name().to_string()))
    }

    fn delete(&self, _key: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly(self.name().to_string()))
    }
}
