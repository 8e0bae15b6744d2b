//! Drag state machine shared by pointer and touch input.
//!
//! ```text
//! Idle --down(target)--> Dragging --move--> Dragging
//!                         |
//!                         +--up / leave / touch end / touch cancel--> Idle
//! ```
//!
//! The controller only tracks the gesture and writes positions into the
//! scene. Selection and history belong to [`crate::Editor`], which reacts to
//! the [`DragOutcome`] returned from each step.

use crate::coords::{CanvasSurface, CoordinateSpace};
use crate::element::{ElementKind, ElementRef, Point, TextRole};
use crate::scene::Scene;

/// Current gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging an element.
    Dragging {
        /// Element being dragged.
        target: ElementRef,
        /// Pointer minus the element's rendered center at drag start, in
        /// viewport pixels.
        offset: Point,
        /// Whether any move changed the element's position.
        moved: bool,
    },
}

/// Result of feeding one event to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// The event did not affect a drag.
    Ignored,
    /// The target was selected but is pinned, so no drag began.
    Selected(ElementRef),
    /// A drag began on the target.
    Started(ElementRef),
    /// The target was repositioned.
    Moved(ElementRef),
    /// The drag finished.
    Ended {
        /// Element that was dragged.
        target: ElementRef,
        /// Whether its position changed at all.
        moved: bool,
    },
}

/// Pointer/touch drag tracking.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: DragState,
    space: CoordinateSpace,
}

impl InteractionController {
    /// Create an idle controller that writes positions in `space`.
    #[must_use]
    pub const fn new(space: CoordinateSpace) -> Self {
        Self {
            state: DragState::Idle,
            space,
        }
    }

    /// Current gesture.
    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Coordinate space positions are written in.
    #[must_use]
    pub const fn space(&self) -> CoordinateSpace {
        self.space
    }

    /// Begin dragging `target` from viewport position `pointer`.
    ///
    /// Header and footer bands are pinned and never start a drag; neither
    /// does a target missing from the scene.
    pub fn pointer_down(
        &mut self,
        scene: &Scene,
        surface: &dyn CanvasSurface,
        target: ElementRef,
        pointer: Point,
    ) -> DragOutcome {
        if !is_draggable(scene, target) {
            return DragOutcome::Ignored;
        }
        let Some(native) = scene.position(target) else {
            return DragOutcome::Ignored;
        };
        let center = self.space.to_viewport(native, surface.bounds());
        let offset = Point::new(pointer.x - center.x, pointer.y - center.y);
        self.state = DragState::Dragging {
            target,
            offset,
            moved: false,
        };
        tracing::debug!(%target, offset_x = offset.x, offset_y = offset.y, "drag start");
        DragOutcome::Started(target)
    }

    /// Move the dragged element so its center follows the pointer.
    pub fn pointer_move(&mut self, scene: &mut Scene, surface: &dyn CanvasSurface, pointer: Point) -> DragOutcome {
        let DragState::Dragging { target, offset, moved } = self.state else {
            return DragOutcome::Ignored;
        };
        let bounds = surface.bounds();
        let to = self.space.to_native(pointer, bounds, offset);
        let before = scene.position(target);
        if before.is_none() || !scene.set_position(target, to) {
            // target vanished mid-drag
            self.state = DragState::Idle;
            return DragOutcome::Ignored;
        }
        let changed = before != scene.position(target);
        self.state = DragState::Dragging {
            target,
            offset,
            moved: moved || changed,
        };
        DragOutcome::Moved(target)
    }

    /// Finish the drag; covers pointer up/leave and touch end/cancel.
    pub fn pointer_up(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { target, moved, .. } => {
                tracing::debug!(%target, moved, "drag end");
                DragOutcome::Ended { target, moved }
            }
            DragState::Idle => DragOutcome::Ignored,
        }
    }

    /// Drop any gesture without reporting it, e.g. after undo.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }
}

fn is_draggable(scene: &Scene, target: ElementRef) -> bool {
    match target.kind {
        ElementKind::Text => scene.text(target.id).is_some_and(|f| f.role == TextRole::Text),
        _ => scene.contains(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::element::{Element, ElementId, LineField, LineOrientation, TextField};

    const STAGE: Rect = Rect::new(0.0, 0.0, 200.0, 100.0);

    fn scene_with_text(role: TextRole) -> (Scene, ElementRef) {
        let mut scene = Scene::new();
        scene.insert(Element::Text(TextField::new(ElementId::new(1), role, 50.0, 50.0)));
        (scene, ElementRef::new(ElementKind::Text, ElementId::new(1)))
    }

    #[test]
    fn test_offset_keeps_grab_point() {
        let (mut scene, target) = scene_with_text(TextRole::Text);
        let mut controller = InteractionController::new(CoordinateSpace::PERCENT);

        // element center is (100, 50); grab 10px right of it
        assert_eq!(
            controller.pointer_down(&scene, &STAGE, target, Point::new(110.0, 50.0)),
            DragOutcome::Started(target)
        );
        controller.pointer_move(&mut scene, &STAGE, Point::new(130.0, 60.0));
        let moved = scene.text(target.id).expect("text");
        assert!((moved.x - 60.0).abs() < 1e-4, "x = {}", moved.x);
        assert!((moved.y - 60.0).abs() < 1e-4, "y = {}", moved.y);

        assert_eq!(controller.pointer_up(), DragOutcome::Ended { target, moved: true });
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_click_without_move() {
        let (scene, target) = scene_with_text(TextRole::Text);
        let mut controller = InteractionController::new(CoordinateSpace::PERCENT);
        controller.pointer_down(&scene, &STAGE, target, Point::new(100.0, 50.0));
        assert_eq!(controller.pointer_up(), DragOutcome::Ended { target, moved: false });
    }

    #[test]
    fn test_header_is_pinned() {
        let (scene, target) = scene_with_text(TextRole::Header);
        let mut controller = InteractionController::new(CoordinateSpace::PERCENT);
        assert_eq!(
            controller.pointer_down(&scene, &STAGE, target, Point::new(100.0, 50.0)),
            DragOutcome::Ignored
        );
    }

    #[test]
    fn test_move_while_idle_ignored() {
        let (mut scene, _) = scene_with_text(TextRole::Text);
        let mut controller = InteractionController::new(CoordinateSpace::PERCENT);
        let before = scene.clone();
        assert_eq!(
            controller.pointer_move(&mut scene, &STAGE, Point::new(5.0, 5.0)),
            DragOutcome::Ignored
        );
        assert_eq!(scene, before);
        assert_eq!(controller.pointer_up(), DragOutcome::Ignored);
    }

    #[test]
    fn test_line_drag_in_pixels() {
        let mut scene = Scene::new();
        let line = LineField::centered(ElementId::new(2), LineOrientation::Horizontal, 300.0, 200.0, 100.0);
        scene.insert(Element::Line(line));
        let target = ElementRef::new(ElementKind::Line, ElementId::new(2));
        let canvas = Rect::new(20.0, 10.0, 800.0, 600.0);
        let mut controller = InteractionController::new(CoordinateSpace::Pixel);

        controller.pointer_down(&scene, &canvas, target, Point::new(320.0, 210.0));
        controller.pointer_move(&mut scene, &canvas, Point::new(-80.0, 710.0));
        let moved = scene.line(target.id).expect("line");
        assert_eq!((moved.x1, moved.y1, moved.x2, moved.y2), (-200.0, 700.0, 0.0, 700.0));
    }

    #[test]
    fn test_bounds_reread_each_move() {
        use std::cell::Cell;

        #[derive(Debug)]
        struct Resizing(Cell<f32>);
        impl CanvasSurface for Resizing {
            fn bounds(&self) -> Rect {
                Rect::new(0.0, 0.0, self.0.get(), 100.0)
            }
        }

        let (mut scene, target) = scene_with_text(TextRole::Text);
        let surface = Resizing(Cell::new(200.0));
        let mut controller = InteractionController::new(CoordinateSpace::PERCENT);
        controller.pointer_down(&scene, &surface, target, Point::new(100.0, 50.0));

        surface.0.set(400.0);
        controller.pointer_move(&mut scene, &surface, Point::new(100.0, 50.0));
        assert_eq!(scene.text(target.id).map(|f| f.x), Some(25.0));
    }
}
