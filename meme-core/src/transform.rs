//! Rotate and scale steps for transformable elements.

use crate::element::{
    clamp_scale, normalize_rotation, ElementKind, ElementRef, ImageField, ShapeField, TextField, ROTATION_STEP,
    SCALE_STEP,
};
use crate::scene::Scene;

/// Elements that carry a rotation and a scale.
pub trait Transformable {
    /// Rotation in degrees.
    fn rotation(&self) -> f32;
    /// Scale multiplier.
    fn scale(&self) -> f32;
    /// Store a rotation; implementations normalize into `[0, 360)`.
    fn set_rotation(&mut self, degrees: f32);
    /// Store a scale; implementations clamp into `[MIN_SCALE, MAX_SCALE]`.
    fn set_scale(&mut self, scale: f32);

    /// Rotate clockwise by one step.
    fn rotate_step(&mut self) {
        self.set_rotation(self.rotation() + ROTATION_STEP);
    }

    /// Grow or shrink by one step.
    fn scale_step(&mut self, direction: ScaleDirection) {
        let delta = match direction {
            ScaleDirection::Up => SCALE_STEP,
            ScaleDirection::Down => -SCALE_STEP,
        };
        self.set_scale(self.scale() + delta);
    }
}

/// Which way a scale step goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDirection {
    /// Larger.
    Up,
    /// Smaller.
    Down,
}

macro_rules! impl_transformable {
    ($($ty:ty),*) => {$(
        impl Transformable for $ty {
            fn rotation(&self) -> f32 {
                self.rotation
            }
            fn scale(&self) -> f32 {
                self.scale
            }
            fn set_rotation(&mut self, degrees: f32) {
                self.rotation = normalize_rotation(degrees);
            }
            fn set_scale(&mut self, scale: f32) {
                // round away float drift from repeated 0.1 steps
                self.scale = clamp_scale((scale * 100.0).round() / 100.0);
            }
        }
    )*};
}

impl_transformable!(TextField, ImageField, ShapeField);

/// The transformable element behind `target`, if it is one.
pub fn transformable_mut(scene: &mut Scene, target: ElementRef) -> Option<&mut dyn Transformable> {
    match target.kind {
        ElementKind::Text => scene.text_mut(target.id).map(|f| f as &mut dyn Transformable),
        ElementKind::Image => scene.image_mut(target.id).map(|f| f as &mut dyn Transformable),
        ElementKind::Shape => scene.shape_mut(target.id).map(|f| f as &mut dyn Transformable),
        ElementKind::Line => None,
    }
}

/// Rotate `target` one step. Returns `false` if nothing changed.
pub fn rotate(scene: &mut Scene, target: ElementRef) -> bool {
    let Some(element) = transformable_mut(scene, target) else {
        return false;
    };
    element.rotate_step();
    true
}

/// Scale `target` one step. Returns `false` if nothing changed, including
/// when the scale is already held at a bound.
pub fn scale(scene: &mut Scene, target: ElementRef, direction: ScaleDirection) -> bool {
    let Some(element) = transformable_mut(scene, target) else {
        return false;
    };
    let before = element.scale();
    element.scale_step(direction);
    (element.scale() - before).abs() > f32::EPSILON
}
