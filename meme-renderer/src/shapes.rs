//! Shape outlines.
//!
//! Geometry is expressed in the shape's local box, `(0, 0)` to
//! `(width, height)`, inset by the stroke width so the stroke stays inside
//! the box.

use std::fmt::Write;

use meme_core::{Point, ShapeField, ShapeType};

/// Corner radius of [`ShapeType::RoundedRectangle`].
pub const CORNER_RADIUS: f32 = 12.0;

/// A shape outline in local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    /// Axis-aligned ellipse.
    Ellipse {
        /// Center x.
        cx: f32,
        /// Center y.
        cy: f32,
        /// Horizontal radius.
        rx: f32,
        /// Vertical radius.
        ry: f32,
    },
    /// Axis-aligned rectangle with optional rounded corners.
    Rect {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        width: f32,
        /// Height.
        height: f32,
        /// Corner radius.
        radius: f32,
    },
    /// Closed polygon.
    Polygon(Vec<Point>),
    /// Arbitrary path data.
    Path(String),
}

impl Outline {
    /// Build the outline for a shape at its unscaled box size.
    #[must_use]
    pub fn of(shape: &ShapeField) -> Self {
        let (w, h, sw) = (shape.width, shape.height, shape.stroke_width);
        match shape.shape_type {
            ShapeType::Circle => Self::Ellipse {
                cx: w / 2.0,
                cy: h / 2.0,
                rx: (w / 2.0 - sw).max(0.0),
                ry: (h / 2.0 - sw).max(0.0),
            },
            ShapeType::Square | ShapeType::Rectangle | ShapeType::Line => inset_rect(w, h, sw, 0.0),
            ShapeType::RoundedRectangle => inset_rect(w, h, sw, CORNER_RADIUS),
            ShapeType::Triangle => Self::Polygon(vec![
                Point::new(w / 2.0, sw),
                Point::new(w - sw, h - sw),
                Point::new(sw, h - sw),
            ]),
            ShapeType::Pentagon => Self::Polygon(
                (0..5u8)
                    .map(|i| {
                        let angle = (f32::from(i) * 72.0 - 90.0).to_radians();
                        Point::new(
                            (w / 2.0 - sw).mul_add(angle.cos(), w / 2.0),
                            (h / 2.0 - sw).mul_add(angle.sin(), h / 2.0),
                        )
                    })
                    .collect(),
            ),
            ShapeType::Star => Self::Polygon(
                (0..10u8)
                    .map(|i| {
                        let angle = (f32::from(i) * 36.0 - 90.0).to_radians();
                        let radius = if i.is_multiple_of(2) { w / 2.0 - sw } else { w / 4.0 };
                        Point::new(radius.mul_add(angle.cos(), w / 2.0), radius.mul_add(angle.sin(), h / 2.0))
                    })
                    .collect(),
            ),
            ShapeType::Heart => Self::Path(format!(
                "M {},{} C {},{} {},{} {},{} C {},{} {},{} {},{} Z",
                w / 2.0,
                h * 0.3,
                w * 0.2,
                h * 0.1,
                -w * 0.2,
                h * 0.6,
                w / 2.0,
                h * 0.9,
                w * 1.2,
                h * 0.6,
                w * 0.8,
                h * 0.1,
                w / 2.0,
                h * 0.3,
            )),
            // Fewer than three points cannot enclose anything
            ShapeType::Custom if shape.points.len() > 2 => Self::Polygon(shape.points.clone()),
            ShapeType::Custom => inset_rect(w, h, sw, 0.0),
        }
    }

    /// SVG element for this outline with extra attributes appended verbatim.
    #[must_use]
    pub fn to_svg(&self, attrs: &str) -> String {
        let mut svg = String::new();
        match self {
            Self::Ellipse { cx, cy, rx, ry } => {
                let _ = write!(svg, r#"<ellipse cx="{cx}" cy="{cy}" rx="{rx}" ry="{ry}" {attrs}/>"#);
            }
            Self::Rect {
                x,
                y,
                width,
                height,
                radius,
            } => {
                let _ = write!(
                    svg,
                    r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" rx="{radius}" ry="{radius}" {attrs}/>"#
                );
            }
            Self::Polygon(points) => {
                let _ = write!(svg, r#"<polygon points="{}" {attrs}/>"#, points_attr(points));
            }
            Self::Path(d) => {
                let _ = write!(svg, r#"<path d="{d}" {attrs}/>"#);
            }
        }
        svg
    }
}

fn inset_rect(w: f32, h: f32, sw: f32, radius: f32) -> Outline {
    Outline::Rect {
        x: sw / 2.0,
        y: sw / 2.0,
        width: (w - sw).max(0.0),
        height: (h - sw).max(0.0),
        radius,
    }
}

fn points_attr(points: &[Point]) -> String {
    let mut out = String::new();
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{},{}", p.x, p.y);
    }
    out
}
