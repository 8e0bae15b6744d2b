//! Mapping between viewport pixels and an element's native coordinates.
//!
//! Pointer events arrive in viewport pixels. The meme variant stores positions
//! as percentages of the stage, the template variant as pixels relative to the
//! canvas origin. The container rectangle is never cached here; callers pass
//! the bounds they just read from the active [`CanvasSurface`].

use serde::{Deserialize, Serialize};

use crate::element::Point;

/// An axis-aligned rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size centered on `center`.
    #[must_use]
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether a point lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Whether either side has no extent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Anything that can report the live bounds of the active canvas.
///
/// The editor asks for bounds on every pointer event, so an implementation
/// backed by a real layout must return the current geometry, not a stored copy.
pub trait CanvasSurface {
    /// Current bounds of the canvas container in viewport pixels.
    fn bounds(&self) -> Rect;
}

impl CanvasSurface for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// Native coordinate space of an editor variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateSpace {
    /// Percent of the container, clamped to `[min, max]` while dragging.
    Percent {
        /// Lower clamp bound.
        min: f32,
        /// Upper clamp bound.
        max: f32,
    },
    /// Pixels relative to the container origin, unclamped.
    Pixel,
}

impl CoordinateSpace {
    /// The meme stage: percent clamped to `[5, 95]`.
    pub const PERCENT: Self = Self::Percent { min: 5.0, max: 95.0 };

    /// Map a viewport pointer to native coordinates.
    ///
    /// `offset` is the pointer-to-center offset captured at drag start, so
    /// the result is where the element's center should go.
    #[must_use]
    pub fn to_native(&self, pointer: Point, bounds: Rect, offset: Point) -> Point {
        let local_x = pointer.x - bounds.x - offset.x;
        let local_y = pointer.y - bounds.y - offset.y;
        match *self {
            Self::Percent { min, max } => Point::new(
                percent_axis(local_x, bounds.width, min, max),
                percent_axis(local_y, bounds.height, min, max),
            ),
            Self::Pixel => Point::new(local_x, local_y),
        }
    }

    /// Map native coordinates back to a viewport point.
    #[must_use]
    pub fn to_viewport(&self, native: Point, bounds: Rect) -> Point {
        match self {
            Self::Percent { .. } => Point::new(
                bounds.x + native.x / 100.0 * bounds.width,
                bounds.y + native.y / 100.0 * bounds.height,
            ),
            Self::Pixel => Point::new(bounds.x + native.x, bounds.y + native.y),
        }
    }

    /// Whether this space clamps positions.
    #[must_use]
    pub const fn is_percent(&self) -> bool {
        matches!(self, Self::Percent { .. })
    }
}

fn percent_axis(local: f32, size: f32, min: f32, max: f32) -> f32 {
    if size <= 0.0 || !size.is_finite() {
        return (min + max) / 2.0;
    }
    let value = local / size * 100.0;
    if value.is_nan() {
        return (min + max) / 2.0;
    }
    value.clamp(min, max)
}
