//! Error types for the status store

use thiserror::Error;

/// Result type alias for status store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading billing request status
///
/// None of these mean "still running": callers must abort the wait.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connecting to or querying the database failed
    #[error("Status query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// A scripted query failure
    #[cfg(any(test, feature = "testing"))]
    #[error("Status store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(any(test, feature = "testing"))]
impl StoreError {
    /// Create an unavailable error from any message
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
