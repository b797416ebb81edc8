use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Failed to fetch user profile")]
    ProfileUnavailable,

    #[error("No stored authentication")]
    NoStoredSession,

    #[error("Registration failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Registration failed: {0}")]
    PasswordHash(String),
}
