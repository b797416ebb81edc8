use tracing::{debug, warn};

use crate::models::{AuthSession, User};
use crate::storage::{keys, SecureStorage, Storage};

/// Persists the token/profile pair across the two storage namespaces.
#[derive(Clone)]
pub struct SessionStore {
    secure: SecureStorage,
    storage: Storage,
}

impl SessionStore {
    pub fn new(secure: SecureStorage, storage: Storage) -> Self {
        Self { secure, storage }
    }

    /// Write the token, then the profile. The two writes are independent;
    /// `load` ignores a half-written session.
    pub fn save(&self, session: &AuthSession) -> bool {
        let token_saved = self.secure.save(keys::AUTH_TOKEN, &session.token);
        let user_saved = self.storage.save(keys::USER_DATA, &session.user);
        if !(token_saved && user_saved) {
            warn!(token_saved, user_saved, "Session only partially persisted");
        }
        token_saved && user_saved
    }

    /// Load the stored session. Returns `None` unless both halves exist.
    pub fn load(&self) -> Option<AuthSession> {
        let token = self.secure.get(keys::AUTH_TOKEN).filter(|t| !t.is_empty());
        let user = self.storage.get::<User>(keys::USER_DATA);
        match (token, user) {
            (Some(token), Some(user)) => {
                debug!(user_id = user.id, "Stored session found");
                Some(AuthSession { token, user })
            }
            (token, user) => {
                debug!(has_token = token.is_some(), has_user = user.is_some(), "No complete stored session");
                None
            }
        }
    }

    pub fn clear(&self) -> bool {
        let token_removed = self.secure.remove(keys::AUTH_TOKEN);
        let user_removed = self.storage.remove(keys::USER_DATA);
        token_removed && user_removed
    }
}
