//! Offline proxy error types

use crate::proxy::LifecycleState;

/// Offline proxy error types
#[derive(Debug, thiserror::Error)]
pub enum OfflineError {
    // Network errors
    #[error("network error: {0}")]
    Network(String),

    /// A precache entry could not be fetched or came back unsuccessful.
    /// Aborts the whole install.
    #[error("precache failed for {url}: {reason}")]
    Precache { url: String, reason: String },

    // Storage errors
    #[error("cache error: {0}")]
    Cache(String),

    // Data errors
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Lifecycle errors
    #[error("invalid lifecycle state: expected {expected}, got {actual}")]
    InvalidState {
        expected: LifecycleState,
        actual: LifecycleState,
    },

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for OfflineError {
    fn from(err: reqwest::Error) -> Self {
        OfflineError::Network(err.to_string())
    }
}

/// Result type alias for offline proxy operations
pub type Result<T> = std::result::Result<T, OfflineError>;
