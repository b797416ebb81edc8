//! StreamBox core library.
//!
//! This crate contains the data layer of the StreamBox movie browser:
//!
//! - `api`: HTTP client for the TMDB catalog and the DummyJSON auth service
//! - `storage`: plain and secure key-value persistence
//! - `auth`: session persistence and locally registered accounts
//! - `store`: application state slices and the `AppStore` that drives them
//! - `config`, `validation`, `utils`: supporting pieces used by front ends

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod storage;
pub mod store;
pub mod utils;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use store::AppStore;
