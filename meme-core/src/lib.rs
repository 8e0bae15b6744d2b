//! # Meme Core
//!
//! Editor logic for meme and template canvases.
//! Compiles to WASM for use behind a browser UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Editor                    │
//! ├─────────────────────────────────────────────┤
//! │  Scene           │  Interaction             │
//! │  - Elements      │  - Pointer/touch drag    │
//! │  - Backdrop      │  - Coordinate mapping    │
//! │  - Selection     │  - Auto-deselect timer   │
//! ├─────────────────────────────────────────────┤
//! │  History         │  Transforms              │
//! │  - Snapshots     │  - Rotate / scale steps  │
//! │  - Coalescing    │  - Shape media pan/zoom  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rendering and export live in `meme-renderer`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod command;
pub mod config;
pub mod coords;
pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod history;
pub mod interaction;
pub mod pending;
pub mod scene;
pub mod schema;
pub mod selection;
pub mod template;
pub mod timer;
pub mod transform;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use command::{CommandOutcome, EditorCommand};
pub use config::{DefaultPlacement, EditorConfig, EditorVariant, FeatureSet};
pub use coords::{CanvasSurface, CoordinateSpace, Rect};
pub use editor::Editor;
pub use element::{
    Element, ElementId, ElementKind, ElementPatch, ElementRef, ImageCategory, ImageField, ImagePatch, LineField,
    LineOrientation, LinePatch, LogoStyle, Point, ShapeField, ShapeMedia, ShapePatch, ShapeType, TextField, TextPatch,
    TextRole,
};
pub use error::{EditorError, EditorResult};
pub use event::{InputEvent, PointerEvent, PointerPhase, TouchEvent, TouchPhase, TouchPoint};
pub use history::History;
pub use interaction::{DragOutcome, DragState, InteractionController};
pub use pending::{FilePendingTemplate, MemoryPendingTemplate, PendingTemplateStore, PENDING_TEMPLATE_KEY};
pub use scene::{Backdrop, Background, Scene};
pub use schema::{SceneDocument, ViewportDocument};
pub use selection::Selection;
pub use template::TemplateLayout;
pub use timer::{Clock, DeselectTimer, ManualClock, SystemClock};
pub use transform::{ScaleDirection, Transformable};

/// Meme core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
