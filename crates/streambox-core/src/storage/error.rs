use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error on key '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Keychain error on key '{key}': {source}")]
    Keychain {
        key: String,
        #[source]
        source: keyring::Error,
    },

    #[error("Invalid key name: '{0}'")]
    InvalidKey(String),
}

impl StorageError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}
