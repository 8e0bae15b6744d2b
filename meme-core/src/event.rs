//! Input events for canvas interaction.
//!
//! Coordinates are viewport pixels. The host resolves which element was hit
//! (see the renderer's hit test) and passes it as the event target.

use serde::{Deserialize, Serialize};

use crate::element::{ElementRef, Point};

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled (e.g., palm rejection).
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in viewport pixels.
    pub x: f32,
    /// Y position in viewport pixels.
    pub y: f32,
}

impl TouchPoint {
    /// Position as a point.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A touch event with one or more touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    pub touches: Vec<TouchPoint>,
    /// Element under the primary touch when the gesture started.
    #[serde(default)]
    pub target: Option<ElementRef>,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self {
            phase,
            touches,
            target: None,
        }
    }

    /// Single-finger event at `(x, y)`.
    #[must_use]
    pub fn single(phase: TouchPhase, x: f32, y: f32) -> Self {
        Self::new(phase, vec![TouchPoint { id: 0, x, y }])
    }

    /// Attach the touched element.
    #[must_use]
    pub fn with_target(mut self, target: ElementRef) -> Self {
        self.target = Some(target);
        self
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}

/// Phase of a mouse/pen pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Pointer left the canvas.
    Leave,
}

/// A mouse/pen pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this pointer event.
    pub phase: PointerPhase,
    /// X position in viewport pixels.
    pub x: f32,
    /// Y position in viewport pixels.
    pub y: f32,
    /// Element under the pointer, for [`PointerPhase::Down`].
    #[serde(default)]
    pub target: Option<ElementRef>,
}

impl PointerEvent {
    /// Create a pointer event without a target.
    #[must_use]
    pub const fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            x,
            y,
            target: None,
        }
    }

    /// Pointer-down on `target`.
    #[must_use]
    pub const fn down(target: ElementRef, x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Down,
            x,
            y,
            target: Some(target),
        }
    }

    /// Position as a point.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// All input events the canvas can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum InputEvent {
    /// Raw touch event.
    Touch(TouchEvent),
    /// Pointer (mouse) event.
    Pointer(PointerEvent),
}
