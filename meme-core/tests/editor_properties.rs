//! Editor Integration Tests
//!
//! Exercises the editor through its public surface:
//! - Header/footer uniqueness and id allocation
//! - Drag clamping and line rigidity
//! - Undo/redo round trips
//! - Rotate/scale bounds
//! - Auto-deselect timing

use std::time::Duration;

use meme_core::{
    Editor, EditorConfig, ElementKind, ElementPatch, ElementRef, ImageCategory, LineOrientation, ManualClock, Point,
    Rect, ShapeType, TextPatch, TextRole,
};
use proptest::prelude::*;

const STAGE: Rect = Rect::new(40.0, 20.0, 500.0, 400.0);

fn meme_editor() -> (Editor, ManualClock) {
    let clock = ManualClock::new();
    let editor = Editor::with_clock(EditorConfig::meme().without_seed_text(), Box::new(clock.clone()));
    (editor, clock)
}

/// One mutating toolbar action.
#[derive(Debug, Clone)]
enum Action {
    AddText(TextRole),
    AddImage,
    AddLine(LineOrientation),
    AddShape(ShapeType),
    Rotate,
    ScaleUp,
    ScaleDown,
    Recolor(u8),
}

fn arb_role() -> impl Strategy<Value = TextRole> {
    prop_oneof![Just(TextRole::Header), Just(TextRole::Footer), Just(TextRole::Text)]
}

fn arb_shape() -> impl Strategy<Value = ShapeType> {
    prop_oneof![
        Just(ShapeType::Circle),
        Just(ShapeType::Square),
        Just(ShapeType::Star),
        Just(ShapeType::Heart),
        Just(ShapeType::Triangle),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        arb_role().prop_map(Action::AddText),
        Just(Action::AddImage),
        prop_oneof![Just(LineOrientation::Horizontal), Just(LineOrientation::Vertical)].prop_map(Action::AddLine),
        arb_shape().prop_map(Action::AddShape),
        Just(Action::Rotate),
        Just(Action::ScaleUp),
        Just(Action::ScaleDown),
        any::<u8>().prop_map(Action::Recolor),
    ]
}

/// Apply an action; returns whether it committed a history entry.
fn perform(editor: &mut Editor, clock: &ManualClock, action: &Action) -> bool {
    // step past the coalesce window so every update is its own entry
    clock.advance(Duration::from_secs(1));
    match action {
        Action::AddText(role) => editor.add_text_field(*role).is_some(),
        Action::AddImage => editor.add_image_field("pic.png", ImageCategory::Upload).is_some(),
        Action::AddLine(orientation) => editor.add_line_field(*orientation).is_some(),
        Action::AddShape(shape) => editor.add_shape_field(*shape, "#000000", "#ffffff", 2.0).is_some(),
        Action::Rotate => editor.rotate_selected(),
        Action::ScaleUp => editor.scale_selected_up(),
        Action::ScaleDown => editor.scale_selected_down(),
        Action::Recolor(shade) => match editor.scene().texts.first().map(|f| f.id) {
            Some(id) => editor.update_field(
                id,
                &ElementPatch::Text(TextPatch {
                    color: Some(format!("#{shade:02x}{shade:02x}{shade:02x}")),
                    ..TextPatch::default()
                }),
            ),
            None => false,
        },
    }
}

proptest! {
    #[test]
    fn prop_header_footer_unique(roles in prop::collection::vec(arb_role(), 0..20)) {
        let (mut editor, _) = meme_editor();
        for role in roles {
            editor.add_text_field(role);
        }
        let scene = editor.scene();
        prop_assert!(scene.texts.iter().filter(|f| f.role == TextRole::Header).count() <= 1);
        prop_assert!(scene.texts.iter().filter(|f| f.role == TextRole::Footer).count() <= 1);
    }

    #[test]
    fn prop_ids_strictly_increase(steps in prop::collection::vec((arb_action(), any::<bool>()), 1..30)) {
        let (mut editor, clock) = meme_editor();
        let mut last = None;
        for (action, undo_after) in &steps {
            let before = editor.scene().max_id();
            let created = match action {
                Action::AddText(role) => editor.add_text_field(*role),
                Action::AddImage => editor.add_image_field("pic.png", ImageCategory::Emoji),
                Action::AddLine(orientation) => editor.add_line_field(*orientation),
                Action::AddShape(shape) => editor.add_shape_field(*shape, "#000000", "#ffffff", 2.0),
                other => {
                    perform(&mut editor, &clock, other);
                    None
                }
            };
            if let Some(id) = created {
                prop_assert!(before.map_or(true, |max| id > max), "id {} not above scene max", id);
                prop_assert!(last.map_or(true, |prev| id > prev), "id {} reused", id);
                last = Some(id);
            }
            if *undo_after {
                editor.undo();
            }
        }
    }

    #[test]
    fn prop_drag_clamped_to_stage(path in prop::collection::vec((-2000.0f32..2000.0, -2000.0f32..2000.0), 1..40)) {
        let (mut editor, _) = meme_editor();
        let id = editor.add_text_field(TextRole::Text).expect("text");
        let target = ElementRef::new(ElementKind::Text, id);
        editor.pointer_down(&STAGE, target, STAGE.center());
        for (x, y) in path {
            editor.pointer_move(&STAGE, Point::new(x, y));
            let field = editor.scene().text(id).expect("text");
            prop_assert!((5.0..=95.0).contains(&field.x), "x = {}", field.x);
            prop_assert!((5.0..=95.0).contains(&field.y), "y = {}", field.y);
        }
        editor.pointer_up();
    }

    #[test]
    fn prop_line_stays_rigid(path in prop::collection::vec((0.0f32..600.0, 0.0f32..500.0), 1..30)) {
        let (mut editor, _) = meme_editor();
        let id = editor.add_line_field(LineOrientation::Vertical).expect("line");
        let target = ElementRef::new(ElementKind::Line, id);
        let original = editor.scene().line(id).cloned().expect("line");
        let (dx, dy) = (original.x2 - original.x1, original.y2 - original.y1);

        editor.pointer_down(&STAGE, target, STAGE.center());
        let mut before = original;
        for (x, y) in path {
            editor.pointer_move(&STAGE, Point::new(x, y));
            let line = editor.scene().line(id).cloned().expect("line");
            prop_assert!(((line.x2 - line.x1) - dx).abs() < 1e-3);
            prop_assert!(((line.y2 - line.y1) - dy).abs() < 1e-3);

            // both endpoints shift by exactly the midpoint delta
            let (mx0, my0) = before.midpoint();
            let (mx1, my1) = line.midpoint();
            let (shift_x, shift_y) = (mx1 - mx0, my1 - my0);
            prop_assert!(((line.x1 - before.x1) - shift_x).abs() < 1e-3);
            prop_assert!(((line.y1 - before.y1) - shift_y).abs() < 1e-3);
            prop_assert!(((line.x2 - before.x2) - shift_x).abs() < 1e-3);
            prop_assert!(((line.y2 - before.y2) - shift_y).abs() < 1e-3);
            before = line;
        }
    }

    #[test]
    fn prop_undo_redo_roundtrip(actions in prop::collection::vec(arb_action(), 1..25)) {
        let (mut editor, clock) = meme_editor();
        let mut states = vec![editor.scene().clone()];
        for action in &actions {
            if perform(&mut editor, &clock, action) {
                states.push(editor.scene().clone());
            }
        }
        let committed = states.len() - 1;

        for expected in states.iter().rev().skip(1) {
            prop_assert!(editor.undo());
            prop_assert_eq!(editor.scene(), expected);
        }
        prop_assert!(!editor.can_undo());

        for _ in 0..committed {
            prop_assert!(editor.redo());
        }
        prop_assert!(!editor.can_redo());
        prop_assert_eq!(editor.scene(), states.last().expect("final state"));
    }

    #[test]
    fn prop_rotation_in_range(steps in 0usize..100) {
        let (mut editor, _) = meme_editor();
        let id = editor.add_image_field("pic.png", ImageCategory::Sticker).expect("image");
        for _ in 0..steps {
            editor.rotate_selected();
        }
        let rotation = editor.scene().image(id).expect("image").rotation;
        prop_assert!((0.0..360.0).contains(&rotation));
        #[allow(clippy::cast_precision_loss)]
        let expected = ((steps * 15) % 360) as f32;
        prop_assert!((rotation - expected).abs() < 1e-3, "rotation {} expected {}", rotation, expected);
    }

    #[test]
    fn prop_scale_clamped(ups in prop::collection::vec(any::<bool>(), 0..80)) {
        let (mut editor, _) = meme_editor();
        let id = editor.add_shape_field(ShapeType::Pentagon, "#000", "#fff", 1.0).expect("shape");
        for up in ups {
            if up {
                editor.scale_selected_up();
            } else {
                editor.scale_selected_down();
            }
            let scale = editor.scene().shape(id).expect("shape").scale;
            prop_assert!((0.3..=3.0).contains(&scale), "scale {}", scale);
        }
    }
}

#[test]
fn test_scale_holds_at_max() {
    let (mut editor, _) = meme_editor();
    let id = editor.add_text_field(TextRole::Text).expect("text");
    for _ in 0..50 {
        editor.scale_selected_up();
    }
    assert_eq!(editor.scene().text(id).map(|f| f.scale), Some(3.0));
    assert!(!editor.scale_selected_up());
}

#[test]
fn test_auto_deselect_after_three_seconds() {
    let (mut editor, clock) = meme_editor();
    let id = editor.add_text_field(TextRole::Text).expect("text");

    clock.advance(Duration::from_millis(2_900));
    assert!(editor.select_field(ElementKind::Text, id));

    // 2.9s after the second selection is 5.8s after the first
    clock.advance(Duration::from_millis(2_900));
    assert!(!editor.tick());
    assert!(editor.selected().is_some());

    clock.advance(Duration::from_millis(100));
    assert!(editor.tick());
    assert!(editor.selected().is_none());
}

#[test]
fn test_circle_scenario() {
    let (mut editor, _) = meme_editor();
    let id = editor
        .add_shape_field(ShapeType::Circle, "#000000", "#ffffff", 2.0)
        .expect("shape");
    let shape = editor.scene().shape(id).cloned().expect("shape");
    assert_eq!((shape.width, shape.height), (80.0, 80.0));
    assert_eq!((shape.x, shape.y), (50.0, 50.0));

    let target = ElementRef::new(ElementKind::Shape, id);
    editor.pointer_down(&STAGE, target, STAGE.center());
    // 10% of the stage on each axis, measured from the stage origin
    editor.pointer_move(&STAGE, Point::new(STAGE.x + 50.0, STAGE.y + 40.0));
    editor.pointer_up();

    let shape = editor.scene().shape(id).expect("shape");
    assert!((shape.x - 10.0).abs() < 1e-4);
    assert!((shape.y - 10.0).abs() < 1e-4);
}
