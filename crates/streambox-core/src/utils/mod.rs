//! Utility functions for display formatting.

pub mod format;

pub use format::{format_date, format_rating, format_runtime, release_year, truncate_string};
