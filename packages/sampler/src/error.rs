//! Typed errors for the sampling library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! transport failure from a storage failure and react per category.

use thiserror::Error;

/// Errors that can occur during sampling operations.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// Fetching a listing or detail page failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Invalid static configuration (matrix, targets, origin)
    #[error("config error: {reason}")]
    Config { reason: String },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SamplerError {
    /// Build a configuration error from any message.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Wrap any storage backend error.
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }
}

/// Errors that can occur while fetching pages.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Page does not exist (404 or no canned page)
    #[error("page not found: {url}")]
    NotFound { url: String },

    /// Connection or read timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Result type alias for sampling operations.
pub type Result<T> = std::result::Result<T, SamplerError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
