//! Error type definitions for the scraper
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system: per-channel resolution errors stay
//! local to their task, while directory and configuration errors bubble up
//! to the run.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
///
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Directory page / source handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Channel number registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Directory page errors
///
/// Any of these is fatal for a run: without the directory there are no
/// channels to process.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Connection refused, DNS failure, reset, ...
    #[error("Transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    /// Non-success HTTP status from the directory
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Parsing errors for directory markup
    #[error("Parse error: {message}")]
    ParseError { message: String },
}

/// Failure to resolve a single channel's stream URL
///
/// Never propagated past the task that produced it.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("descriptor has no stream path")]
    MissingStreamPath,

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("no stream manifest found in response from {url}")]
    NoManifest { url: String },

    /// Admission to the pipeline was refused. Only reachable if the
    /// pipeline's semaphore is closed, which `resolve_all` never does.
    #[error("resolution cancelled before it started")]
    Cancelled,
}

/// Channel number registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Persisted state could not be read
    #[error("Failed to read registry {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted state is not an object of stream path -> positive integer
    #[error("Malformed registry {path:?}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// Persisted state could not be written
    #[error("Failed to write registry {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mapping could not be serialized
    #[error("Failed to serialize registry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No unused channel number is left above the current maximum
    #[error("No channel numbers left to assign")]
    Exhausted,
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Classify a reqwest transport failure for the given URL
    pub fn from_reqwest<S: Into<String>>(url: S, err: &reqwest::Error) -> Self {
        let url = url.into();
        if err.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Transport {
                url,
                message: err.to_string(),
            }
        }
    }
}

impl ResolveError {
    /// Classify a reqwest transport failure for the given URL
    pub fn from_reqwest<S: Into<String>>(url: S, err: &reqwest::Error) -> Self {
        let url = url.into();
        if err.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Transport {
                url,
                message: err.to_string(),
            }
        }
    }

    /// Short machine-friendly tag used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::MissingStreamPath => "missing_stream_path",
            ResolveError::Timeout { .. } => "timeout",
            ResolveError::Transport { .. } => "transport",
            ResolveError::HttpStatus { .. } => "http_status",
            ResolveError::NoManifest { .. } => "no_manifest",
            ResolveError::Cancelled => "cancelled",
        }
    }
}
