//! Authentication: session persistence and locally registered accounts.
//!
//! This module provides:
//! - `SessionStore`: token in secure storage, profile in plain storage
//! - `AccountRegistry`: accounts created on this device, since the remote
//!   auth service does not persist new users
//!
//! A session only counts as valid when both token and profile are present.

pub mod error;
pub mod registry;
pub mod session;

pub use error::AuthError;
pub use registry::{AccountRegistry, RegisteredUser};
pub use session::SessionStore;
