//! One-shot hand-off of a template chosen elsewhere in the app.
//!
//! A gallery page stores the chosen template under a single key; the editor
//! consumes it once on startup and the slot is cleared so a reload starts
//! fresh.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::EditorResult;

/// Storage key for the pending template.
pub const PENDING_TEMPLATE_KEY: &str = "selected-template";

/// A single-slot store for a template reference.
pub trait PendingTemplateStore {
    /// Remove and return the stored template, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read or cleared.
    fn take(&mut self) -> EditorResult<Option<String>>;

    /// Store a template, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn put(&mut self, template: &str) -> EditorResult<()>;
}

/// In-memory slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryPendingTemplate {
    slot: Option<String>,
}

impl MemoryPendingTemplate {
    /// Slot pre-filled with `template`.
    #[must_use]
    pub fn with(template: impl Into<String>) -> Self {
        Self {
            slot: Some(template.into()),
        }
    }
}

impl PendingTemplateStore for MemoryPendingTemplate {
    fn take(&mut self) -> EditorResult<Option<String>> {
        Ok(self.slot.take())
    }

    fn put(&mut self, template: &str) -> EditorResult<()> {
        self.slot = Some(template.to_string());
        Ok(())
    }
}

/// Slot backed by a file named [`PENDING_TEMPLATE_KEY`] in a data directory.
#[derive(Debug, Clone)]
pub struct FilePendingTemplate {
    path: PathBuf,
}

impl FilePendingTemplate {
    /// Use `data_dir` for the slot file. The directory is created on `put`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(PENDING_TEMPLATE_KEY),
        }
    }

    /// Path of the slot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PendingTemplateStore for FilePendingTemplate {
    fn take(&mut self) -> EditorResult<Option<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        fs::remove_file(&self.path)?;
        let template = contents.trim();
        if template.is_empty() {
            return Ok(None);
        }
        tracing::debug!(path = %self.path.display(), "consumed pending template");
        Ok(Some(template.to_string()))
    }

    fn put(&mut self, template: &str) -> EditorResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, template)?;
        Ok(())
    }
}
