//! On-device key-value persistence.
//!
//! Two namespaces are exposed:
//! - `Storage`: plain values serialized as JSON (user profile, favorites,
//!   theme, locally registered accounts)
//! - `SecureStorage`: string-only values kept in the OS keychain (auth token)
//!
//! Both sit on a `KeyValueBackend`. Each key is written atomically, but there
//! is no transaction spanning several keys.

pub mod backend;
pub mod error;
pub mod keychain;
pub mod plain;
pub mod secure;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use error::StorageError;
pub use keychain::KeyringBackend;
pub use plain::Storage;
pub use secure::SecureStorage;

/// Fixed key names shared by every front end.
pub mod keys {
    /// Secure namespace
    pub const AUTH_TOKEN: &str = "auth_token";

    pub const USER_DATA: &str = "user_data";
    pub const FAVORITES: &str = "favorites";
    pub const THEME: &str = "theme_preference";
    pub const REGISTERED_USERS: &str = "registered_users";
}
