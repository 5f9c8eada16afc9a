//! Error types for the storefront core.

use thiserror::Error;

/// Errors surfaced by the catalog and its collaborators.
///
/// Only [`CatalogError::FeedUnavailable`] ever reaches the shopper. Malformed
/// rows, corrupt persisted carts and stale product ids are absorbed where they
/// occur and never become values of this type.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The product feed could not be retrieved or parsed
    #[error("Product feed unavailable: {reason}")]
    FeedUnavailable {
        /// What went wrong, for the log and the retry banner
        reason: String,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage error (localStorage in WASM, config dir on native)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CatalogError {
    /// Create a feed-unavailable error with a reason.
    pub fn feed_unavailable(reason: impl Into<String>) -> Self {
        Self::FeedUnavailable {
            reason: reason.into(),
        }
    }

    /// Whether this error leaves the catalog in a retryable failed state.
    pub fn is_feed_unavailable(&self) -> bool {
        matches!(self, Self::FeedUnavailable { .. })
    }
}
