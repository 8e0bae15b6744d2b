//! Canvas capture and image export.
//!
//! Captures a named node of the render tree to PNG or JPEG through an SVG
//! intermediate and the resvg/tiny-skia rasterization pipeline. Editor
//! decorations are excluded from the capture.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::ImageEncoder;
use meme_core::schema::current_timestamp_ms;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RenderError, RenderResult};
use crate::layout::{RenderDocument, CAPTURE_ROOT};
use crate::svg;

/// Export output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG image.
    #[default]
    Png,
    /// JPEG image, flattened onto the background.
    Jpeg,
}

impl ExportFormat {
    /// File extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    /// MIME type.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(RenderError::Encode(format!("unsupported export format: {other}"))),
        }
    }
}

/// Configuration for canvas export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output format.
    pub format: ExportFormat,
    /// Encoder quality in `[0, 1]`; only JPEG uses it.
    pub quality: f32,
    /// Supersampling factor over the captured node's size.
    pub scale: f32,
    /// Background as RGBA bytes.
    pub background: [u8; 4],
    /// Artifact name prefix.
    pub filename_prefix: String,
    /// Name of the render node to capture.
    pub capture_target: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: 1.0,
            scale: 2.0,
            background: [255, 255, 255, 255],
            filename_prefix: "meme".to_string(),
            capture_target: CAPTURE_ROOT.to_string(),
        }
    }
}

impl ExportConfig {
    /// JPEG quality on the encoder's 1-100 scale.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn jpeg_quality(&self) -> u8 {
        let quality = if self.quality.is_finite() { self.quality } else { 1.0 };
        ((quality.clamp(0.0, 1.0) * 100.0).round() as u8).max(1)
    }

    fn background_hex(&self) -> String {
        let [r, g, b, _] = self.background;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name, `<prefix>-<timestamp>.<ext>`.
    pub filename: String,
    /// Encoded image.
    pub bytes: Vec<u8>,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Encoding.
    pub format: ExportFormat,
}

impl ExportArtifact {
    /// MIME type of the bytes.
    #[must_use]
    pub const fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// Write the artifact into `dir` under its file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save_to(&self, dir: &Path) -> RenderResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Captures render documents to image artifacts.
pub struct CanvasExporter {
    config: ExportConfig,
    options: usvg::Options<'static>,
}

impl CanvasExporter {
    /// Create an exporter. System fonts are loaded once here.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        debug!("Loaded {} font faces", options.fontdb.len());
        Self { config, options }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Capture the configured target.
    ///
    /// # Errors
    ///
    /// Returns an error if the target node is missing or rendering or
    /// encoding fails.
    pub fn export(&self, document: &RenderDocument) -> RenderResult<ExportArtifact> {
        self.capture(document, &self.config.capture_target)
    }

    /// Capture the named node at its current rendered size, supersampled.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::CaptureTargetMissing`] if no node has that name,
    /// or another error if rendering or encoding fails.
    pub fn capture(&self, document: &RenderDocument, target: &str) -> RenderResult<ExportArtifact> {
        let node = document
            .find(target)
            .ok_or_else(|| RenderError::CaptureTargetMissing(target.to_string()))?;
        if node.bounds.is_empty() {
            return Err(RenderError::Raster(format!("capture target {target} has no size")));
        }

        let scale = if self.config.scale > 0.0 { self.config.scale } else { 1.0 };
        let markup = svg::render_svg(
            node,
            scale,
            Some(&self.config.background_hex()),
            &svg::is_editor_decoration,
        );
        let pixmap = self.rasterize(&markup, svg::output_size(node, scale))?;

        let bytes = match self.config.format {
            ExportFormat::Png => pixmap
                .encode_png()
                .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?,
            ExportFormat::Jpeg => self.encode_jpeg(&pixmap)?,
        };

        let artifact = ExportArtifact {
            filename: format!(
                "{}-{}.{}",
                self.config.filename_prefix,
                current_timestamp_ms(),
                self.config.format.extension()
            ),
            bytes,
            width: pixmap.width(),
            height: pixmap.height(),
            format: self.config.format,
        };
        info!(
            "Captured {target} as {} ({}x{}, {} bytes)",
            artifact.filename,
            artifact.width,
            artifact.height,
            artifact.bytes.len()
        );
        Ok(artifact)
    }

    /// Rasterize an SVG string into a pixmap of exactly `size`.
    fn rasterize(&self, markup: &str, size: (u32, u32)) -> RenderResult<tiny_skia::Pixmap> {
        let tree = usvg::Tree::from_str(markup, &self.options)
            .map_err(|e| RenderError::SvgParse(e.to_string()))?;

        let mut pixmap = tiny_skia::Pixmap::new(size.0, size.1)
            .ok_or_else(|| RenderError::Raster(format!("cannot allocate {}x{} pixmap", size.0, size.1)))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn encode_jpeg(&self, pixmap: &tiny_skia::Pixmap) -> RenderResult<Vec<u8>> {
        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = &self.config.background;
        // Pixmap data is premultiplied, so color over background is c + bg * (1 - a)
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            rgb_data.push(f32::from(bg[0]).mul_add(inv, f32::from(pixel[0])).round().min(255.0) as u8);
            rgb_data.push(f32::from(bg[1]).mul_add(inv, f32::from(pixel[1])).round().min(255.0) as u8);
            rgb_data.push(f32::from(bg[2]).mul_add(inv, f32::from(pixel[2])).round().min(255.0) as u8);
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality());
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }
}

impl Default for CanvasExporter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for CanvasExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasExporter").field("config", &self.config).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RenderConfig;
    use meme_core::{Editor, EditorConfig, ShapeType, TextRole};

    fn document() -> RenderDocument {
        let mut editor = Editor::new(EditorConfig::meme().without_seed_text());
        editor.add_text_field(TextRole::Header);
        editor.add_shape_field(ShapeType::Heart, "#000000", "#ff0000", 2.0);
        let config = RenderConfig {
            viewport_width: 200.0,
            ..RenderConfig::default()
        };
        RenderDocument::from_editor(&editor, &config)
    }

    #[test]
    fn test_png_export_produces_valid_bytes() {
        let doc = document();
        let artifact = CanvasExporter::with_defaults().export(&doc).expect("export");
        assert_eq!(&artifact.bytes[0..4], &[137, 80, 78, 71]);
        assert_eq!(artifact.mime(), "image/png");
    }

    #[test]
    fn test_jpeg_export_produces_valid_bytes() {
        let doc = document();
        let exporter = CanvasExporter::new(ExportConfig {
            format: ExportFormat::Jpeg,
            quality: 0.8,
            ..ExportConfig::default()
        });
        let artifact = exporter.export(&doc).expect("export");
        assert_eq!(artifact.bytes[0], 0xFF);
        assert_eq!(artifact.bytes[1], 0xD8);
        assert!(artifact.filename.ends_with(".jpeg"));
    }

    #[test]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn test_output_is_supersampled() {
        let doc = document();
        let root = doc.root().bounds;
        let artifact = CanvasExporter::with_defaults().export(&doc).expect("export");
        assert_eq!(artifact.width, (root.width * 2.0).ceil() as u32);
        assert_eq!(artifact.height, (root.height * 2.0).ceil() as u32);
    }

    #[test]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn test_capture_stage_only() {
        let doc = document();
        let artifact = CanvasExporter::with_defaults().capture(&doc, "stage").expect("export");
        assert_eq!(artifact.height, (doc.stage().height * 2.0).ceil() as u32);
    }

    #[test]
    fn test_missing_target_is_fatal() {
        let doc = document();
        let err = CanvasExporter::with_defaults().capture(&doc, "nope").expect_err("missing");
        assert!(matches!(err, RenderError::CaptureTargetMissing(name) if name == "nope"));
    }

    #[test]
    fn test_filename_shape() {
        let doc = document();
        let exporter = CanvasExporter::new(ExportConfig {
            filename_prefix: "template".into(),
            ..ExportConfig::default()
        });
        let artifact = exporter.export(&doc).expect("export");
        let stem = artifact
            .filename
            .strip_prefix("template-")
            .and_then(|rest| rest.strip_suffix(".png"))
            .expect("prefix and extension");
        assert!(stem.parse::<u64>().is_ok());
    }

    #[test]
    fn test_save_to_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact = CanvasExporter::with_defaults().export(&document()).expect("export");
        let path = artifact.save_to(&dir.path().join("out")).expect("save");
        assert_eq!(std::fs::read(path).expect("read"), artifact.bytes);
    }

    #[test]
    fn test_quality_mapping() {
        let mut config = ExportConfig::default();
        assert_eq!(config.jpeg_quality(), 100);
        config.quality = 0.0;
        assert_eq!(config.jpeg_quality(), 1);
        config.quality = 0.853;
        assert_eq!(config.jpeg_quality(), 85);
        config.quality = f32::NAN;
        assert_eq!(config.jpeg_quality(), 100);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>().ok(), Some(ExportFormat::Png));
        assert_eq!("jpg".parse::<ExportFormat>().ok(), Some(ExportFormat::Jpeg));
        assert!("gif".parse::<ExportFormat>().is_err());
    }
}
