//! Serializable editor commands.
//!
//! Every operation on [`crate::Editor`] has a command form so hosts without
//! direct Rust access (scripts, the wasm bindings) can drive the editor with
//! JSON.

use serde::{Deserialize, Serialize};

use crate::element::{
    ElementId, ElementKind, ElementPatch, ImageCategory, LineOrientation, ShapeMedia, ShapeType, TextRole,
};
use crate::event::InputEvent;
use crate::scene::Background;
use crate::template::TemplateLayout;

/// One editor operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[allow(missing_docs)] // Variant fields documented at variant level
pub enum EditorCommand {
    /// Add a text field with the given role.
    AddText { role: TextRole },
    /// Add an image.
    AddImage {
        src: String,
        #[serde(default)]
        category: ImageCategory,
    },
    /// Add an image rendered as a circular logo.
    AddLogo { src: String },
    /// Add a line.
    AddLine { orientation: LineOrientation },
    /// Add a shape.
    AddShape {
        shape_type: ShapeType,
        stroke_color: String,
        fill_color: String,
        stroke_width: f32,
    },
    /// Patch an element's attributes.
    Update { id: ElementId, patch: ElementPatch },
    /// Remove an element.
    Remove { kind: ElementKind, id: ElementId },
    /// Select an element.
    Select { kind: ElementKind, id: ElementId },
    /// Clear the selection.
    DeselectAll,
    /// Rotate the selection one step.
    Rotate,
    /// Grow the selection one step.
    ScaleUp,
    /// Shrink the selection one step.
    ScaleDown,
    /// Step back in history.
    Undo,
    /// Step forward in history.
    Redo,
    /// Record the current state as a history entry.
    Snapshot,
    /// Replace (or clear) the template image.
    SetTemplateImage { src: Option<String> },
    /// Replace (or clear) the template image filter.
    SetImageStyle { filter: Option<String> },
    /// Replace the canvas background.
    SetBackground { background: Background },
    /// Replace the scene with a grid of empty image slots.
    ApplyLayout { layout: TemplateLayout },
    /// Attach, replace or remove a shape's media.
    SetShapeMedia { id: ElementId, media: Option<ShapeMedia> },
    /// Pan and zoom a shape's media.
    MoveShapeMedia { id: ElementId, x: f32, y: f32, scale: f32 },
    /// Feed a pointer or touch event.
    Input { event: InputEvent },
    /// Fire the auto-deselect timer if its deadline passed.
    Tick,
}

/// What a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "id", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// A new element was created.
    Created(ElementId),
    /// The command changed editor state.
    Applied,
    /// The command was a no-op (unknown id, invariant, disabled feature).
    Rejected,
}

impl CommandOutcome {
    /// Map a `changed` flag.
    #[must_use]
    pub const fn from_changed(changed: bool) -> Self {
        if changed {
            Self::Applied
        } else {
            Self::Rejected
        }
    }

    /// Map an optional new id.
    #[must_use]
    pub fn from_created(id: Option<ElementId>) -> Self {
        id.map_or(Self::Rejected, Self::Created)
    }
}
