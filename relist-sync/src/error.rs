//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur talking to a container store.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The store rejected the request.
    #[error("store rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The store answered with something we cannot interpret.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Container or slot not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Position out of range for the container.
    #[error("position {position} out of range for container of length {len}")]
    InvalidPosition { position: usize, len: usize },
}
