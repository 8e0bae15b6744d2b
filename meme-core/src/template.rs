//! Grid layouts for building a template from empty image slots.

use serde::{Deserialize, Serialize};

use crate::coords::Rect;

/// Horizontal distance between slot origins.
const SLOT_STRIDE_X: f32 = 300.0;
/// Vertical distance between slot origins.
const SLOT_STRIDE_Y: f32 = 200.0;
/// Margin before the first slot on each axis.
const SLOT_MARGIN: f32 = 50.0;
/// Slot width.
pub const SLOT_WIDTH: f32 = 250.0;
/// Slot height.
pub const SLOT_HEIGHT: f32 = 150.0;

/// Predefined image grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateLayout {
    /// One image.
    Single,
    /// Two images side by side.
    Double,
    /// Three images in a row.
    Triple,
    /// Four images in a row.
    QuadHorizontal,
    /// Four images in a 2x2 grid.
    QuadGrid,
}

impl TemplateLayout {
    /// Every layout, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Single,
        Self::Double,
        Self::Triple,
        Self::QuadHorizontal,
        Self::QuadGrid,
    ];

    /// `(columns, rows)`.
    #[must_use]
    pub const fn grid(self) -> (usize, usize) {
        match self {
            Self::Single => (1, 1),
            Self::Double => (2, 1),
            Self::Triple => (3, 1),
            Self::QuadHorizontal => (4, 1),
            Self::QuadGrid => (2, 2),
        }
    }

    /// Slot rectangles in canvas pixels, row-major.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn slots(self) -> Vec<Rect> {
        let (cols, rows) = self.grid();
        (0..cols * rows)
            .map(|i| {
                let (col, row) = (i % cols, i / cols);
                Rect::new(
                    col as f32 * SLOT_STRIDE_X + SLOT_MARGIN,
                    row as f32 * SLOT_STRIDE_Y + SLOT_MARGIN,
                    SLOT_WIDTH,
                    SLOT_HEIGHT,
                )
            })
            .collect()
    }
}
