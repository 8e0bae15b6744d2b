//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while laying out, rasterizing or exporting a canvas.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The named capture node is not part of the render tree.
    #[error("Capture target not found: {0}")]
    CaptureTargetMissing(String),

    /// The generated SVG could not be parsed.
    #[error("SVG parsing failed: {0}")]
    SvgParse(String),

    /// Rasterization failed.
    #[error("Rasterization failed: {0}")]
    Raster(String),

    /// Image encoding failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Writing the artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
