//! Accounts registered on this device.
//!
//! The remote auth service accepts new users but never persists them, so
//! registrations are kept locally and checked before the remote login.
//! Passwords are stored as Argon2 PHC strings.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{AuthSession, RegisterData, User};
use crate::storage::{keys, Storage};

use super::AuthError;

/// Placeholder avatar; the user's initial is appended as the `text` param
const AVATAR_PLACEHOLDER_URL: &str = "https://via.placeholder.com/150/1e293b/ffffff?text=";

/// Prefix that marks tokens issued on-device rather than by the auth service
pub const LOCAL_TOKEN_PREFIX: &str = "local_token_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl RegisteredUser {
    fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            image: Some(self.image.clone()),
            gender: None,
        }
    }
}

fn issue_local_token() -> String {
    format!("{}{}", LOCAL_TOKEN_PREFIX, Utc::now().timestamp_millis())
}

fn avatar_for(first_name: &str, username: &str) -> String {
    let initial = first_name
        .chars()
        .chain(username.chars())
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "U".to_string());
    format!("{}{}", AVATAR_PLACEHOLDER_URL, initial)
}

#[derive(Clone)]
pub struct AccountRegistry {
    storage: Storage,
}

impl AccountRegistry {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn users(&self) -> Vec<RegisteredUser> {
        self.storage
            .get::<Vec<RegisteredUser>>(keys::REGISTERED_USERS)
            .unwrap_or_default()
    }

    pub fn find(&self, username: &str) -> Option<RegisteredUser> {
        self.users().into_iter().find(|u| u.username == username)
    }

    /// Create a local account and return a session for it.
    ///
    /// An unreadable account list is an error; nothing is written over it.
    pub fn register(&self, data: &RegisterData) -> Result<AuthSession, AuthError> {
        let mut users = self
            .storage
            .try_get::<Vec<RegisteredUser>>(keys::REGISTERED_USERS)?
            .unwrap_or_default();

        if users.iter().any(|u| u.username == data.username) {
            return Err(AuthError::UsernameTaken);
        }
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&data.email)) {
            return Err(AuthError::EmailTaken);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(data.password.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
            .to_string();

        // Millisecond ids, bumped past any existing id registered in the same tick
        let mut id = Utc::now().timestamp_millis();
        while users.iter().any(|u| u.id == id) {
            id += 1;
        }

        let user = RegisteredUser {
            id,
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash,
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            image: avatar_for(&data.first_name, &data.username),
            created_at: Utc::now(),
        };
        let session = AuthSession {
            token: issue_local_token(),
            user: user.to_user(),
        };

        users.push(user);
        self.storage.try_save(keys::REGISTERED_USERS, &users)?;
        info!(username = %data.username, "Registered local account");

        Ok(session)
    }

    /// Check credentials against local accounts.
    ///
    /// `Ok(None)` means the username is not local and the caller should try
    /// the remote service. A local username with a wrong password is an
    /// error; it never falls through.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<AuthSession>, AuthError> {
        let Some(user) = self.find(username) else {
            return Ok(None);
        };

        let parsed = PasswordHash::new(&user.password_hash).map_err(|e| {
            debug!(username, error = %e, "Stored password hash is unreadable");
            AuthError::InvalidCredentials
        })?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)?;

        debug!(user_id = user.id, "Local login succeeded");
        Ok(Some(AuthSession {
            token: issue_local_token(),
            user: user.to_user(),
        }))
    }
}
