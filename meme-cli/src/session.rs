//! Export session: open, replay, export.

use std::path::{Path, PathBuf};

use meme_core::{
    CommandOutcome, Editor, EditorCommand, EditorConfig, EditorVariant, FilePendingTemplate, SceneDocument,
    SystemClock, ViewportDocument,
};
use meme_renderer::{preview_svg, CanvasExporter, ExportArtifact, RenderDocument};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{HostError, HostResult};
use crate::HostConfig;

/// An editor opened for headless export.
#[derive(Debug)]
pub struct ExportSession {
    config: HostConfig,
    editor: Editor,
}

impl ExportSession {
    /// Open the canvas described by `config`.
    ///
    /// The editor configuration comes from the configuration file when given,
    /// otherwise from the document's variant, otherwise from `config.variant`.
    /// A pending template in the data directory is consumed once.
    ///
    /// # Errors
    ///
    /// Returns an error if an input file cannot be read or parsed, or the
    /// document violates a scene invariant.
    pub fn open(config: HostConfig) -> HostResult<Self> {
        let document: Option<SceneDocument> = config.document.as_deref().map(read_json::<SceneDocument>).transpose()?;
        let editor_config = match config.editor_config.as_deref() {
            Some(path) => read_json::<EditorConfig>(path)?,
            None => defaults_for(document.as_ref().map_or(config.variant, |doc| doc.variant)),
        };

        let mut editor = match document {
            Some(document) => {
                if document.variant != editor_config.variant {
                    warn!(
                        "Document variant {:?} differs from editor variant {:?}",
                        document.variant, editor_config.variant
                    );
                }
                Editor::from_document(editor_config, document, Box::new(SystemClock))?
            }
            None => Editor::new(editor_config),
        };

        if let Some(dir) = &config.data_dir {
            let mut store = FilePendingTemplate::new(dir);
            if editor.consume_pending_template(&mut store)? {
                info!("Opened pending template from {}", store.path().display());
            }
        }

        Ok(Self { config, editor })
    }

    /// The editor.
    #[must_use]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Mutable access to the editor.
    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// Current layout.
    #[must_use]
    pub fn layout(&self) -> RenderDocument {
        RenderDocument::from_editor(&self.editor, &self.config.render)
    }

    /// Replay the configured command script, if any.
    ///
    /// Returns the number of commands that changed the editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be read or parsed.
    pub fn replay_script(&mut self) -> HostResult<usize> {
        let Some(path) = self.config.commands.clone() else {
            return Ok(0);
        };
        let commands: Vec<EditorCommand> = read_json(&path)?;
        info!("Replaying {} commands from {}", commands.len(), path.display());
        Ok(self.replay(commands))
    }

    /// Apply commands in order against the live layout.
    ///
    /// Pointer input is mapped against the stage as laid out just before the
    /// command, so geometry changes from earlier commands are honored.
    pub fn replay(&mut self, commands: impl IntoIterator<Item = EditorCommand>) -> usize {
        let mut applied = 0;
        for (index, command) in commands.into_iter().enumerate() {
            let surface = self.layout();
            let outcome = self.editor.apply(&surface, command);
            debug!("Command {index}: {outcome:?}");
            if outcome != CommandOutcome::Rejected {
                applied += 1;
            }
        }
        applied
    }

    /// Capture the canvas and write it to the output directory.
    ///
    /// Writes the SVG preview first when one is configured. Nothing is
    /// written to the output directory when capture fails.
    ///
    /// # Errors
    ///
    /// Returns an error if capture, encoding or writing fails.
    pub fn export(&self) -> HostResult<(ExportArtifact, PathBuf)> {
        let document = self.layout();
        if let Some(path) = &self.config.preview {
            std::fs::write(path, preview_svg(&document))?;
            info!("Wrote preview {}", path.display());
        }
        let exporter = CanvasExporter::new(self.config.export.clone());
        let artifact = exporter.export(&document)?;
        let path = artifact.save_to(&self.config.out_dir)?;
        Ok((artifact, path))
    }

    /// The current scene as a document sized to the live layout.
    #[must_use]
    pub fn document(&self) -> SceneDocument {
        let bounds = self.layout().root().bounds;
        self.editor.document(ViewportDocument {
            width: bounds.width,
            height: bounds.height,
        })
    }
}

fn defaults_for(variant: EditorVariant) -> EditorConfig {
    match variant {
        EditorVariant::Meme => EditorConfig::meme(),
        EditorVariant::Template => EditorConfig::template(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> HostResult<T> {
    let text = std::fs::read_to_string(path).map_err(|source| HostError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| HostError::Json {
        path: path.to_path_buf(),
        source,
    })
}
