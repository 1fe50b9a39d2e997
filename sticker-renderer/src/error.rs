//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while decoding or exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Input bytes could not be decoded as an image.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Export rendering or encoding failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// The requested facility is unavailable on this platform; callers
    /// fall back to the basic PNG path.
    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),
}
