//! Image reference resolution.
//!
//! Element and template images are referenced by data URI or by a path
//! relative to the resources directory. The resolver turns either into an
//! inline data URI the SVG rasterizer can embed, plus the bitmap's natural
//! size for layout.

use std::path::{Path, PathBuf};

use base64::Engine;
use tracing::warn;

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            _ => Self::Unknown,
        }
    }

    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        Self::Unknown
    }

    /// MIME type used when re-embedding the bytes.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// An image reference ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Inline `data:` URI.
    pub href: String,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
}

impl ResolvedImage {
    /// Natural height over width.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect(&self) -> f32 {
        if self.width == 0 {
            return 1.0;
        }
        self.height as f32 / self.width as f32
    }
}

/// Resolves element image references against a resources directory.
#[derive(Debug, Clone, Default)]
pub struct ResourceResolver {
    resources_dir: Option<PathBuf>,
}

impl ResourceResolver {
    /// Create a resolver. Relative paths are joined onto `resources_dir`.
    #[must_use]
    pub fn new(resources_dir: Option<PathBuf>) -> Self {
        Self { resources_dir }
    }

    /// Directory relative references are resolved against.
    #[must_use]
    pub fn resources_dir(&self) -> Option<&Path> {
        self.resources_dir.as_deref()
    }

    /// Resolve a reference, logging and returning `None` when it cannot be
    /// loaded. Remote URLs are never fetched.
    #[must_use]
    pub fn resolve(&self, src: &str) -> Option<ResolvedImage> {
        if src.is_empty() {
            return None;
        }
        match self.try_resolve(src) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Skipping image {}: {e}", abbreviate(src));
                None
            }
        }
    }

    /// Resolve a reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is remote, missing or undecodable.
    pub fn try_resolve(&self, src: &str) -> RenderResult<ResolvedImage> {
        if src.starts_with("data:") {
            let (_, bytes) = decode_data_uri(src)?;
            let (width, height) = probe_dimensions(&bytes)?;
            return Ok(ResolvedImage {
                href: src.to_string(),
                width,
                height,
            });
        }
        if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("blob:") {
            return Err(RenderError::Resource("remote references are not fetched".to_string()));
        }

        let path = self.path_for(src);
        let bytes = std::fs::read(&path)
            .map_err(|e| RenderError::Resource(format!("{}: {e}", path.display())))?;
        let (width, height) = probe_dimensions(&bytes)?;
        let mut format = ImageFormat::from_magic_bytes(&bytes);
        if format == ImageFormat::Unknown {
            format = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(ImageFormat::Unknown, ImageFormat::from_extension);
        }
        Ok(ResolvedImage {
            href: encode_data_uri(format, &bytes),
            width,
            height,
        })
    }

    fn path_for(&self, src: &str) -> PathBuf {
        let direct = Path::new(src);
        if direct.is_absolute() && direct.exists() {
            return direct.to_path_buf();
        }
        // Web-style "/templates/x.jpg" is relative to the resources root
        match &self.resources_dir {
            Some(dir) => dir.join(src.trim_start_matches('/')),
            None => direct.to_path_buf(),
        }
    }
}

/// Decode a data URI into its declared format and raw bytes.
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...`
///
/// # Errors
///
/// Returns an error if the data URI is malformed.
pub fn decode_data_uri(uri: &str) -> RenderResult<(ImageFormat, Vec<u8>)> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    // Find the comma separating metadata from data
    let (metadata, encoded) = uri_data
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    let mime = metadata.split(';').next().unwrap_or_default();
    let bytes = if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))?
    } else {
        percent_decode(encoded)?
    };

    let mut format = ImageFormat::from_mime(mime);
    if format == ImageFormat::Unknown {
        format = ImageFormat::from_magic_bytes(&bytes);
    }
    Ok((format, bytes))
}

/// Encode bytes as a base64 data URI.
#[must_use]
pub fn encode_data_uri(format: ImageFormat, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        format.mime(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Decode an image far enough to learn its size.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image.
pub fn probe_dimensions(bytes: &[u8]) -> RenderResult<(u32, u32)> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;
    Ok((img.width(), img.height()))
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }
    Ok(result)
}

fn abbreviate(src: &str) -> &str {
    if src.starts_with("data:") {
        src.split(',').next().unwrap_or(src)
    } else {
        src
    }
}
