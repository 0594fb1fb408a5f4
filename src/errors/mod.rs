//! Centralized error handling for the scraper
//!
//! # Error Categories
//!
//! - **Source Errors**: directory page connectivity and parsing (fatal)
//! - **Resolve Errors**: per-channel stream resolution (local to one channel)
//! - **Registry Errors**: channel number persistence (recovered or logged)
//! - **Configuration Errors**: invalid settings detected at startup
//!
//! # Usage
//!
//! ```rust
//! use iptv_scraper::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::validation("concurrency limit must be positive"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for Registry Results
pub type RegistryResult<T> = Result<T, RegistryError>;
