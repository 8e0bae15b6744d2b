//! # Meme Renderer
//!
//! Lays out a meme or template scene as a render tree and captures it to
//! PNG or JPEG.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌─────────────┐   ┌──────────────┐
//! │  Scene   │──▶│ Render tree  │──▶│ SVG string  │──▶│ resvg raster │──▶ PNG / JPEG
//! │          │   │ (layout)     │   │ (svg)       │   │ tiny-skia    │
//! └──────────┘   └──────────────┘   └─────────────┘   └──────────────┘
//!                       │
//!                       └── decorations kept in preview, dropped on export
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;
pub mod layout;
pub mod shapes;
pub mod svg;

pub use error::{RenderError, RenderResult};
pub use export::{CanvasExporter, ExportArtifact, ExportConfig, ExportFormat};
pub use crate::image::{ImageFormat, ResolvedImage, ResourceResolver};
pub use layout::{Marker, RenderConfig, RenderDocument, RenderNode, CAPTURE_ROOT, STAGE, TEXT_PLACEHOLDER};
pub use shapes::Outline;
pub use svg::{is_editor_decoration, preview_svg, render_svg};
