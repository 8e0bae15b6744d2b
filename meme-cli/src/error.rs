//! Host error types.

use std::path::PathBuf;

use meme_core::EditorError;
use meme_renderer::RenderError;
use thiserror::Error;

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Errors from opening, replaying or exporting a canvas.
#[derive(Debug, Error)]
pub enum HostError {
    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// An input file is not valid JSON for what it should hold.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// Editor error.
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// Render or export error.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Writing an output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
