//! Error types for sticker operations.

use thiserror::Error;

/// Result type for sticker operations.
pub type StickerResult<T> = Result<T, StickerError>;

/// Errors that can occur in sticker operations.
#[derive(Debug, Error)]
pub enum StickerError {
    /// Element not found in scene.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Invalid element operation.
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// Record serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
