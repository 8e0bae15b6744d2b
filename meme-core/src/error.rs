//! Error types for editor operations.
//!
//! Most editor operations are deliberately lenient (unknown ids and rejected
//! adds are no-ops), so this enum only covers the boundaries: documents coming
//! in from outside and the pending-template slot.

use thiserror::Error;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur at the edges of the editor core.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Scene or command serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A document was structurally valid JSON but violates a scene invariant.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Reading or writing the pending template slot failed.
    #[error("Pending template I/O error: {0}")]
    PendingTemplate(#[from] std::io::Error),
}
