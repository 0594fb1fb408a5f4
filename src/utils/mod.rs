//! Utility modules for the scraper
//!
//! This module contains reusable utilities that can be used
//! across different parts of the system.

pub mod http_client;
pub mod url;

// Re-export commonly used types for convenience
pub use http_client::{build_client, build_http_client};
pub use self::url::UrlUtils;
