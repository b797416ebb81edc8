//! HTTP client module for the TMDB catalog and DummyJSON auth services.
//!
//! Every call is a single request/response round trip: no retries and no
//! backoff. TMDB requests carry the API key as a query parameter.

pub mod client;
pub mod error;
pub mod image;

pub use client::ApiClient;
pub use error::ApiError;
pub use image::{image_url, ImageSize};
