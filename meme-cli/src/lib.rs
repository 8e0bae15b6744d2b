//! # Meme Export
//!
//! Headless host for the meme editor. Opens a canvas (fresh, from a saved
//! document, or from a pending template left by a gallery), replays a script
//! of editor commands against the live layout, and exports the result.
//!
//! ## Usage
//!
//! ```bash
//! meme-export --document meme.json --format jpeg --quality 0.9
//! ```
//!
//! ## With a command script:
//!
//! ```bash
//! MEME_OUTPUT_DIR=out meme-export --commands script.json --resources-dir public
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `HostConfig` - Editor, layout and export settings resolved from the arguments
//! - `ExportSession` - Owns the editor and drives replay and export

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod error;
mod session;

pub use error::{HostError, HostResult};
pub use session::ExportSession;

use std::path::PathBuf;

use clap::Parser;
use meme_core::EditorVariant;
use meme_renderer::{ExportConfig, ExportFormat, RenderConfig};

/// Command-line arguments for meme-export.
#[derive(Debug, Clone, Parser)]
#[command(name = "meme-export")]
#[command(about = "Replay meme editor commands and export the canvas")]
#[command(version)]
pub struct CliArgs {
    /// Saved scene document (JSON) to open
    #[arg(long)]
    pub document: Option<PathBuf>,

    /// JSON array of editor commands to replay
    #[arg(long)]
    pub commands: Option<PathBuf>,

    /// Editor configuration (JSON); defaults follow the variant
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Editor variant when no configuration or document says otherwise
    #[arg(long, value_parser = ["meme", "template"], default_value = "meme")]
    pub variant: String,

    /// Output format
    #[arg(long, value_parser = ["png", "jpeg", "jpg"], default_value = "png")]
    pub format: String,

    /// Encoder quality between 0 and 1
    #[arg(long, default_value = "1.0")]
    pub quality: f32,

    /// Supersampling factor
    #[arg(long, default_value = "2.0")]
    pub scale: f32,

    /// Artifact name prefix (defaults to the variant name)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Meme container width in pixels
    #[arg(long, default_value = "600")]
    pub width: f32,

    /// Directory the artifact is written to
    #[arg(long, env = "MEME_OUTPUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Directory holding the pending template hand-off
    #[arg(long, env = "MEME_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory relative image references resolve against
    #[arg(long, env = "MEME_RESOURCES_DIR")]
    pub resources_dir: Option<PathBuf>,

    /// Also write an SVG preview (with editor decorations) to this path
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

/// Host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Saved document to open.
    pub document: Option<PathBuf>,
    /// Command script to replay.
    pub commands: Option<PathBuf>,
    /// Editor configuration file.
    pub editor_config: Option<PathBuf>,
    /// Variant used when nothing else decides it.
    pub variant: EditorVariant,
    /// Layout settings.
    pub render: RenderConfig,
    /// Export settings.
    pub export: ExportConfig,
    /// Artifact directory.
    pub out_dir: PathBuf,
    /// Pending template directory.
    pub data_dir: Option<PathBuf>,
    /// Preview SVG path.
    pub preview: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConfig {
    /// Create a host configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: None,
            commands: None,
            editor_config: None,
            variant: EditorVariant::Meme,
            render: RenderConfig::default(),
            export: ExportConfig::default(),
            out_dir: PathBuf::from("."),
            data_dir: None,
            preview: None,
        }
    }
}

impl From<CliArgs> for HostConfig {
    fn from(args: CliArgs) -> Self {
        let variant = if args.variant == "template" {
            EditorVariant::Template
        } else {
            EditorVariant::Meme
        };
        let format = if args.format == "png" {
            ExportFormat::Png
        } else {
            ExportFormat::Jpeg
        };
        let prefix = args.prefix.unwrap_or_else(|| match variant {
            EditorVariant::Meme => "meme".to_string(),
            EditorVariant::Template => "template".to_string(),
        });
        Self {
            document: args.document,
            commands: args.commands,
            editor_config: args.config,
            variant,
            render: RenderConfig {
                viewport_width: args.width,
                resources_dir: args.resources_dir,
                ..RenderConfig::default()
            },
            export: ExportConfig {
                format,
                quality: args.quality,
                scale: args.scale,
                filename_prefix: prefix,
                ..ExportConfig::default()
            },
            out_dir: args.out_dir,
            data_dir: args.data_dir,
            preview: args.preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::try_parse_from(["meme-export", "--out-dir", "out"]).expect("parse");
        let config = HostConfig::from(args);
        assert_eq!(config.variant, EditorVariant::Meme);
        assert_eq!(config.export.format, ExportFormat::Png);
        assert_eq!(config.export.filename_prefix, "meme");
        assert_eq!(config.out_dir, PathBuf::from("out"));
        assert!((config.export.scale - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_template_prefix_follows_variant() {
        let args = CliArgs::try_parse_from(["meme-export", "--variant", "template", "--format", "jpg"]).expect("parse");
        let config = HostConfig::from(args);
        assert_eq!(config.variant, EditorVariant::Template);
        assert_eq!(config.export.format, ExportFormat::Jpeg);
        assert_eq!(config.export.filename_prefix, "template");
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(CliArgs::try_parse_from(["meme-export", "--format", "gif"]).is_err());
    }
}
