use keyring::Entry;

use crate::config::APP_NAME;

use super::{KeyValueBackend, StorageError};

/// Keys this backend has written, so `clear` knows what to remove.
const KNOWN_KEYS: &[&str] = &[super::keys::AUTH_TOKEN];

/// Secure values stored in the OS keychain, one entry per key.
pub struct KeyringBackend {
    service: String,
}

impl KeyringBackend {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Entry::new(&self.service, key).map_err(|source| StorageError::Keychain {
            key: key.to_string(),
            source,
        })
    }
}

impl Default for KeyringBackend {
    fn default() -> Self {
        Self::new(APP_NAME)
    }
}

impl KeyValueBackend for KeyringBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(source) => Err(StorageError::Keychain {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|source| StorageError::Keychain {
                key: key.to_string(),
                source,
            })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(source) => Err(StorageError::Keychain {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        for key in KNOWN_KEYS {
            self.delete(key)?;
        }
        Ok(())
    }
}
