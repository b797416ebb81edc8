//! Raw string key-value backends.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use super::StorageError;

/// Extension used for plain key files
const KEY_FILE_EXT: &str = "json";

/// A string-to-string store. Implementations must make each single-key
/// operation atomic.
pub trait KeyValueBackend: Send + Sync {
    /// Read a value, `Ok(None)` if the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting an absent key succeeds.
    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every key in this namespace.
    fn clear(&self) -> Result<(), StorageError>;
}

/// One file per key under a directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::io("<root>", e))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", key, KEY_FILE_EXT)))
    }
}

impl KeyValueBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        // Write-then-rename keeps a crash from leaving a half-written value
        let tmp = path.with_extension(format!("{}.tmp", KEY_FILE_EXT));
        std::fs::write(&tmp, value).map_err(|e| StorageError::io(key, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| StorageError::io(key, e))?;
        debug!(key, bytes = value.len(), "Wrote key file");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| StorageError::io("<root>", e))?;
        for entry in entries {
            let path = entry.map_err(|e| StorageError::io("<root>", e))?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(KEY_FILE_EXT) {
                std::fs::remove_file(&path).map_err(|e| StorageError::io("<root>", e))?;
            }
        }
        Ok(())
    }
}

/// Process-local store, used for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic mid-insert cannot leave the map itself inconsistent
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_backend_read_write_delete() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf()).unwrap();

        assert_eq!(backend.read("theme_preference").unwrap(), None);
        backend.write("theme_preference", "\"dark\"").unwrap();
        assert_eq!(
            backend.read("theme_preference").unwrap().as_deref(),
            Some("\"dark\"")
        );

        backend.delete("theme_preference").unwrap();
        assert_eq!(backend.read("theme_preference").unwrap(), None);
        // Deleting again is fine
        backend.delete("theme_preference").unwrap();
    }

    #[test]
    fn test_file_backend_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf()).unwrap();
        backend.write("favorites", "[]").unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["favorites.json".to_string()]);
    }

    #[test]
    fn test_file_backend_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf()).unwrap();
        assert!(matches!(
            backend.write("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(backend.read(""), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_file_backend_clear() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf()).unwrap();
        backend.write("a", "1").unwrap();
        backend.write("b", "2").unwrap();
        backend.clear().unwrap();
        assert_eq!(backend.read("a").unwrap(), None);
        assert_eq!(backend.read("b").unwrap(), None);
    }

    #[test]
    fn test_memory_backend() {
        let backend = MemoryBackend::new();
        backend.write("k", "v").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
        backend.clear().unwrap();
        assert_eq!(backend.read("k").unwrap(), None);
    }
}
