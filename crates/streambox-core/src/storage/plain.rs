use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::{KeyValueBackend, StorageError};

/// JSON-serialized key-value storage for non-sensitive data.
///
/// Failures are logged and reported as `false` / `None` rather than raised,
/// so callers can always fall back to a default.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueBackend>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Serialize `value` as JSON and write it under `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match self.try_save(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Storage save failed");
                false
            }
        }
    }

    /// Read and deserialize `key`. Missing keys and unreadable or malformed
    /// values all yield `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Storage get failed");
                None
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.try_remove(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Storage remove failed");
                false
            }
        }
    }

    pub fn clear(&self) -> bool {
        match self.backend.clear() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Storage clear failed");
                false
            }
        }
    }

    /// Like `save`, but surfaces the error.
    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|source| StorageError::Json {
            key: key.to_string(),
            source,
        })?;
        self.backend.write(key, &json)
    }

    /// Like `remove`, but surfaces the error.
    pub fn try_remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.delete(key)
    }

    /// Like `get`, but surfaces the error.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(json) = self.backend.read(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })
    }
}
