use std::sync::Arc;

use tracing::warn;

use super::KeyValueBackend;

/// String-only storage for secrets such as the auth token.
#[derive(Clone)]
pub struct SecureStorage {
    backend: Arc<dyn KeyValueBackend>,
}

impl SecureStorage {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Store `value` under `key`. Empty values are refused.
    pub fn save(&self, key: &str, value: &str) -> bool {
        if value.is_empty() {
            warn!(key, "Refusing to store empty secure value");
            return false;
        }
        match self.backend.write(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Secure storage save failed");
                false
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self.backend.read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Secure storage get failed");
                None
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.backend.delete(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Secure storage remove failed");
                false
            }
        }
    }
}
