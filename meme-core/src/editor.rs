//! The editor facade.
//!
//! [`Editor`] owns the scene, the selection, the undo history, the drag
//! controller and the auto-deselect timer. Every mutation goes through one of
//! two commit points: `commit` for discrete actions and `commit_coalesced`
//! for rapid control updates such as slider drags.

use web_time::Instant;

use crate::command::{CommandOutcome, EditorCommand};
use crate::config::{EditorConfig, EditorVariant};
use crate::coords::CanvasSurface;
use crate::element::{
    Element, ElementId, ElementKind, ElementPatch, ElementRef, ImageCategory, ImageField, LineField, LineOrientation,
    LogoStyle, Point, ShapeField, ShapeMedia, ShapeType, TextField, TextRole,
};
use crate::error::EditorResult;
use crate::event::{InputEvent, PointerPhase, TouchPhase};
use crate::history::History;
use crate::interaction::{DragOutcome, InteractionController};
use crate::pending::PendingTemplateStore;
use crate::scene::{Background, Scene};
use crate::schema::{current_timestamp_ms, SceneDocument, ViewportDocument};
use crate::selection::Selection;
use crate::template::{TemplateLayout, SLOT_HEIGHT, SLOT_WIDTH};
use crate::timer::{Clock, DeselectTimer, SystemClock};
use crate::transform::{self, ScaleDirection};

/// Interactive meme/template editor.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    selection: Selection,
    history: History<Scene>,
    controller: InteractionController,
    timer: DeselectTimer,
    clock: Box<dyn Clock>,
    /// Next id to hand out. Lives outside history so undo never recycles ids.
    next_id: u64,
}

impl Editor {
    /// Create an editor using the wall clock.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Create an editor with an explicit time source.
    #[must_use]
    pub fn with_clock(config: EditorConfig, clock: Box<dyn Clock>) -> Self {
        let scene = if config.seed_default_text && config.variant == EditorVariant::Meme {
            seed_scene()
        } else {
            Scene::new()
        };
        Self::assemble(config, scene, clock)
    }

    /// Open an existing document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document's scene violates an invariant.
    pub fn from_document(config: EditorConfig, document: SceneDocument, clock: Box<dyn Clock>) -> EditorResult<Self> {
        let scene = document.into_scene()?;
        Ok(Self::assemble(config, scene, clock))
    }

    fn assemble(config: EditorConfig, scene: Scene, clock: Box<dyn Clock>) -> Self {
        let next_id = scene.max_id().map_or(1, |id| id.get() + 1);
        Self {
            controller: InteractionController::new(config.variant.coordinate_space()),
            timer: DeselectTimer::new(config.auto_deselect),
            history: History::new(scene.clone()),
            selection: Selection::none(),
            scene,
            clock,
            next_id,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Selected element.
    #[must_use]
    pub fn selected(&self) -> Option<ElementRef> {
        self.selection.current()
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    /// Number of history entries, including the base state.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Snapshot the scene as a document.
    #[must_use]
    pub fn document(&self, viewport: ViewportDocument) -> SceneDocument {
        SceneDocument::from_scene(self.config.variant, viewport, &self.scene, current_timestamp_ms())
    }

    // ------------------------------------------------------------------
    // Commit points
    // ------------------------------------------------------------------

    /// Record the current scene as one history entry.
    fn commit(&mut self) {
        self.history.snapshot(self.scene.clone());
    }

    /// Record the current scene, merging with the previous entry when it
    /// carried the same key inside the coalesce window.
    fn commit_coalesced(&mut self, key: &str) {
        let now = self.clock.now();
        self.history
            .commit_coalesced(self.scene.clone(), key, now, self.config.coalesce_window);
    }

    fn allocate_id(&mut self) -> ElementId {
        let floor = self.scene.max_id().map_or(1, |id| id.get() + 1);
        let id = self.next_id.max(floor);
        self.next_id = id + 1;
        ElementId::new(id)
    }

    fn select_target(&mut self, target: ElementRef) {
        self.selection.select(target);
        self.timer.arm(self.clock.now());
    }

    fn insert_new(&mut self, element: Element) -> Option<ElementId> {
        let target = element.as_ref();
        if !self.scene.insert(element) {
            return None;
        }
        tracing::debug!(%target, "element added");
        self.select_target(target);
        self.commit();
        Some(target.id)
    }

    // ------------------------------------------------------------------
    // Adding elements
    // ------------------------------------------------------------------

    /// Add a text field and select it.
    ///
    /// Returns `None` when the role is already present or disabled.
    pub fn add_text_field(&mut self, role: TextRole) -> Option<ElementId> {
        if role != TextRole::Text && (!self.config.features.header_footer || self.scene.has_role(role)) {
            tracing::debug!(?role, "text field rejected");
            return None;
        }
        let placement = self.config.placement;
        let y = match role {
            TextRole::Header => placement.header_y,
            TextRole::Footer => placement.footer_y,
            TextRole::Text => placement.text.y,
        };
        let id = self.allocate_id();
        let mut field = TextField::new(id, role, placement.text.x, y);
        if self.config.variant == EditorVariant::Template {
            field = field.with_text("Editable Text").with_font_size(24.0);
        }
        self.insert_new(Element::Text(field))
    }

    /// Add an image and select it.
    pub fn add_image_field(&mut self, src: impl Into<String>, category: ImageCategory) -> Option<ElementId> {
        let placement = self.config.placement;
        let (width, height) = placement
            .image_size
            .unwrap_or((category.default_size(), category.default_size()));
        let id = self.allocate_id();
        let field = ImageField::new(id, src, placement.image.x, placement.image.y, width, height);
        self.insert_new(Element::Image(field))
    }

    /// Add an image rendered as a circular logo and select it.
    pub fn add_logo(&mut self, src: impl Into<String>) -> Option<ElementId> {
        if !self.config.features.logos {
            return None;
        }
        let placement = self.config.placement;
        let size = ImageCategory::Upload.default_size();
        let id = self.allocate_id();
        let field = ImageField::new(id, src, placement.image.x, placement.image.y, size, size)
            .with_logo(LogoStyle::default());
        self.insert_new(Element::Image(field))
    }

    /// Add a line and select it.
    pub fn add_line_field(&mut self, orientation: LineOrientation) -> Option<ElementId> {
        if !self.config.features.lines {
            return None;
        }
        let placement = self.config.placement;
        let id = self.allocate_id();
        let line = LineField::centered(
            id,
            orientation,
            placement.line_center.x,
            placement.line_center.y,
            placement.line_half_length,
        );
        self.insert_new(Element::Line(line))
    }

    /// Add a shape at its default size and select it.
    pub fn add_shape_field(
        &mut self,
        shape_type: ShapeType,
        stroke_color: impl Into<String>,
        fill_color: impl Into<String>,
        stroke_width: f32,
    ) -> Option<ElementId> {
        if !self.config.features.shapes {
            return None;
        }
        let at = self.config.placement.shape;
        let id = self.allocate_id();
        let shape = ShapeField::new(id, shape_type, at.x, at.y, stroke_color, fill_color, stroke_width);
        self.insert_new(Element::Shape(shape))
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Patch an element. Unknown ids are a no-op returning `false`.
    ///
    /// Repeated patches of the same fields on the same element inside the
    /// coalesce window share one history entry.
    pub fn update_field(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        if !self.scene.update(id, patch) {
            return false;
        }
        self.commit_coalesced(&coalesce_key(id, patch));
        true
    }

    /// Remove an element.
    ///
    /// If the selected text field is removed, selection moves to the first
    /// remaining text field; any other removed selection is cleared.
    pub fn remove_field(&mut self, kind: ElementKind, id: ElementId) -> bool {
        let target = ElementRef::new(kind, id);
        if kind == ElementKind::Text && self.config.keep_last_text_field && self.scene.texts.len() <= 1 {
            tracing::debug!(%target, "refusing to remove last text field");
            return false;
        }
        if !self.scene.remove(target) {
            return false;
        }
        if self.selection.is_selected(target) {
            match self.scene.texts.first().map(|f| f.id) {
                Some(next) if kind == ElementKind::Text => {
                    self.select_target(ElementRef::new(ElementKind::Text, next));
                }
                _ => self.clear_selection(),
            }
        }
        self.commit();
        true
    }

    /// Select an element. Unknown targets are ignored.
    pub fn select_field(&mut self, kind: ElementKind, id: ElementId) -> bool {
        let target = ElementRef::new(kind, id);
        if !self.scene.contains(target) {
            return false;
        }
        self.select_target(target);
        true
    }

    /// Clear the selection.
    pub fn deselect_all(&mut self) {
        self.clear_selection();
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
        self.timer.disarm();
    }

    /// Rotate the selected text, image or shape by one step.
    pub fn rotate_selected(&mut self) -> bool {
        let Some(target) = self.selection.transform_target() else {
            return false;
        };
        if !transform::rotate(&mut self.scene, target) {
            return false;
        }
        self.commit();
        true
    }

    /// Grow the selected text, image or shape by one step.
    pub fn scale_selected_up(&mut self) -> bool {
        self.scale_selected(ScaleDirection::Up)
    }

    /// Shrink the selected text, image or shape by one step.
    pub fn scale_selected_down(&mut self) -> bool {
        self.scale_selected(ScaleDirection::Down)
    }

    fn scale_selected(&mut self, direction: ScaleDirection) -> bool {
        let Some(target) = self.selection.transform_target() else {
            return false;
        };
        if !transform::scale(&mut self.scene, target, direction) {
            return false;
        }
        self.commit();
        true
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Restore the previous history entry.
    pub fn undo(&mut self) -> bool {
        let Some(state) = self.history.undo() else {
            return false;
        };
        self.scene = state.clone();
        self.after_restore();
        true
    }

    /// Restore the next history entry.
    pub fn redo(&mut self) -> bool {
        let Some(state) = self.history.redo() else {
            return false;
        };
        self.scene = state.clone();
        self.after_restore();
        true
    }

    fn after_restore(&mut self) {
        self.controller.reset();
        if let Some(selected) = self.selection.current() {
            if !self.scene.contains(selected) {
                self.clear_selection();
            }
        }
    }

    /// Record the current scene as a history entry.
    pub fn snapshot_history(&mut self) {
        self.commit();
    }

    /// Whether [`Editor::undo`] would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`Editor::redo`] would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ------------------------------------------------------------------
    // Backdrop and template
    // ------------------------------------------------------------------

    /// Replace or clear the template image.
    pub fn set_template_image(&mut self, src: Option<String>) {
        self.scene.backdrop.template_image = src;
        self.commit();
    }

    /// Replace or clear the CSS filter on the template image.
    pub fn set_image_style(&mut self, filter: Option<String>) {
        self.scene.backdrop.image_style = filter.filter(|f| !f.trim().is_empty());
        self.commit_coalesced("backdrop:image_style");
    }

    /// Replace the canvas background.
    pub fn set_background(&mut self, background: Background) {
        self.scene.backdrop.background = background;
        self.commit_coalesced("backdrop:background");
    }

    /// Replace every element with a grid of empty image slots.
    ///
    /// Only meaningful on the pixel canvas; returns `false` for the meme
    /// variant.
    pub fn apply_layout(&mut self, layout: TemplateLayout) -> bool {
        if self.config.variant != EditorVariant::Template {
            return false;
        }
        let background = self.scene.backdrop.background.clone();
        self.scene = Scene::new();
        self.scene.backdrop.background = background;
        self.controller.reset();
        self.clear_selection();
        for slot in layout.slots() {
            let center = slot.center();
            let id = self.allocate_id();
            self.scene.insert(Element::Image(ImageField::new(
                id,
                String::new(),
                center.x,
                center.y,
                SLOT_WIDTH,
                SLOT_HEIGHT,
            )));
        }
        tracing::debug!(?layout, slots = self.scene.images.len(), "layout applied");
        self.commit();
        true
    }

    /// Consume a template chosen elsewhere and make it the base state.
    ///
    /// The history is rebased so the loaded template cannot be undone.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or cleared.
    pub fn consume_pending_template(&mut self, store: &mut dyn PendingTemplateStore) -> EditorResult<bool> {
        let Some(template) = store.take()? else {
            return Ok(false);
        };
        tracing::debug!(%template, "loading pending template");
        self.scene.backdrop.template_image = Some(template);
        self.history.reset(self.scene.clone());
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Shape media
    // ------------------------------------------------------------------

    /// Attach, replace or remove the media clipped into a shape.
    pub fn set_shape_media(&mut self, id: ElementId, media: Option<ShapeMedia>) -> bool {
        let Some(shape) = self.scene.shape_mut(id) else {
            return false;
        };
        shape.media = media.map(|mut m| {
            m.reposition(m.image_x, m.image_y, m.image_scale);
            m
        });
        self.commit();
        true
    }

    /// Pan and zoom a shape's media. Zoom is clamped to `[0.5, 3]`.
    pub fn move_shape_media(&mut self, id: ElementId, x: f32, y: f32, scale: f32) -> bool {
        let Some(media) = self.scene.shape_mut(id).and_then(|s| s.media.as_mut()) else {
            return false;
        };
        media.reposition(x, y, scale);
        self.commit_coalesced(&format!("shape#{id}:media"));
        true
    }

    // ------------------------------------------------------------------
    // Pointer and touch
    // ------------------------------------------------------------------

    /// Select `target` and start dragging it.
    ///
    /// Pinned header and footer bands are selected without starting a drag.
    pub fn pointer_down(&mut self, surface: &dyn CanvasSurface, target: ElementRef, pointer: Point) -> DragOutcome {
        if !self.scene.contains(target) {
            return DragOutcome::Ignored;
        }
        self.select_target(target);
        match self.controller.pointer_down(&self.scene, surface, target, pointer) {
            DragOutcome::Ignored => DragOutcome::Selected(target),
            outcome => outcome,
        }
    }

    /// Move the dragged element.
    pub fn pointer_move(&mut self, surface: &dyn CanvasSurface, pointer: Point) -> DragOutcome {
        self.controller.pointer_move(&mut self.scene, surface, pointer)
    }

    /// Finish a drag, committing one history entry if the element moved.
    pub fn pointer_up(&mut self) -> DragOutcome {
        let outcome = self.controller.pointer_up();
        if let DragOutcome::Ended { moved: true, .. } = outcome {
            self.commit();
        }
        outcome
    }

    /// Route a pointer or touch event.
    pub fn handle_input(&mut self, surface: &dyn CanvasSurface, event: &InputEvent) -> DragOutcome {
        match event {
            InputEvent::Pointer(pointer) => match pointer.phase {
                PointerPhase::Down => match pointer.target {
                    Some(target) => self.pointer_down(surface, target, pointer.position()),
                    None => DragOutcome::Ignored,
                },
                PointerPhase::Move => self.pointer_move(surface, pointer.position()),
                PointerPhase::Up | PointerPhase::Leave => self.pointer_up(),
            },
            InputEvent::Touch(touch) => match touch.phase {
                TouchPhase::Start => match (touch.target, touch.primary_touch()) {
                    (Some(target), Some(point)) => self.pointer_down(surface, target, point.position()),
                    _ => DragOutcome::Ignored,
                },
                TouchPhase::Move => match touch.primary_touch() {
                    Some(point) => self.pointer_move(surface, point.position()),
                    None => DragOutcome::Ignored,
                },
                TouchPhase::End | TouchPhase::Cancel => self.pointer_up(),
            },
        }
    }

    // ------------------------------------------------------------------
    // Timer
    // ------------------------------------------------------------------

    /// Clear the selection if the auto-deselect deadline has passed.
    ///
    /// Returns `true` when the selection was cleared by this call.
    pub fn tick(&mut self) -> bool {
        if !self.timer.poll(self.clock.now()) {
            return false;
        }
        tracing::debug!("auto-deselect fired");
        self.selection.clear();
        true
    }

    /// When the host should next call [`Editor::tick`].
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Apply a serialized command.
    pub fn apply(&mut self, surface: &dyn CanvasSurface, command: EditorCommand) -> CommandOutcome {
        tracing::trace!(?command, "apply command");
        match command {
            EditorCommand::AddText { role } => CommandOutcome::from_created(self.add_text_field(role)),
            EditorCommand::AddImage { src, category } => {
                CommandOutcome::from_created(self.add_image_field(src, category))
            }
            EditorCommand::AddLogo { src } => CommandOutcome::from_created(self.add_logo(src)),
            EditorCommand::AddLine { orientation } => CommandOutcome::from_created(self.add_line_field(orientation)),
            EditorCommand::AddShape {
                shape_type,
                stroke_color,
                fill_color,
                stroke_width,
            } => CommandOutcome::from_created(self.add_shape_field(shape_type, stroke_color, fill_color, stroke_width)),
            EditorCommand::Update { id, patch } => CommandOutcome::from_changed(self.update_field(id, &patch)),
            EditorCommand::Remove { kind, id } => CommandOutcome::from_changed(self.remove_field(kind, id)),
            EditorCommand::Select { kind, id } => CommandOutcome::from_changed(self.select_field(kind, id)),
            EditorCommand::DeselectAll => {
                self.deselect_all();
                CommandOutcome::Applied
            }
            EditorCommand::Rotate => CommandOutcome::from_changed(self.rotate_selected()),
            EditorCommand::ScaleUp => CommandOutcome::from_changed(self.scale_selected_up()),
            EditorCommand::ScaleDown => CommandOutcome::from_changed(self.scale_selected_down()),
            EditorCommand::Undo => CommandOutcome::from_changed(self.undo()),
            EditorCommand::Redo => CommandOutcome::from_changed(self.redo()),
            EditorCommand::Snapshot => {
                self.snapshot_history();
                CommandOutcome::Applied
            }
            EditorCommand::SetTemplateImage { src } => {
                self.set_template_image(src);
                CommandOutcome::Applied
            }
            EditorCommand::SetImageStyle { filter } => {
                self.set_image_style(filter);
                CommandOutcome::Applied
            }
            EditorCommand::SetBackground { background } => {
                self.set_background(background);
                CommandOutcome::Applied
            }
            EditorCommand::ApplyLayout { layout } => CommandOutcome::from_changed(self.apply_layout(layout)),
            EditorCommand::SetShapeMedia { id, media } => CommandOutcome::from_changed(self.set_shape_media(id, media)),
            EditorCommand::MoveShapeMedia { id, x, y, scale } => {
                CommandOutcome::from_changed(self.move_shape_media(id, x, y, scale))
            }
            EditorCommand::Input { event } => match self.handle_input(surface, &event) {
                DragOutcome::Ignored => CommandOutcome::Rejected,
                _ => CommandOutcome::Applied,
            },
            EditorCommand::Tick => CommandOutcome::from_changed(self.tick()),
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// History key for a patch: the element plus the set of fields it touches.
fn coalesce_key(id: ElementId, patch: &ElementPatch) -> String {
    let mut key = format!("{}#{id}", patch.kind());
    if let Ok(serde_json::Value::Object(fields)) = serde_json::to_value(patch) {
        for (name, value) in fields {
            if name != "kind" && !value.is_null() {
                key.push(':');
                key.push_str(&name);
            }
        }
    }
    key
}

/// The stock meme layout: header, caption, footer.
fn seed_scene() -> Scene {
    let mut scene = Scene::new();
    let header = TextField::new(ElementId::new(1), TextRole::Header, 50.0, 8.0)
        .with_text("Place your text here")
        .with_font_size(28.0)
        .with_font_family("Arial");
    let caption = TextField::new(ElementId::new(2), TextRole::Text, 50.0, 30.0).with_text("Meme text goes here");
    let footer = TextField::new(ElementId::new(3), TextRole::Footer, 50.0, 92.0)
        .with_text("Place your text here")
        .with_font_size(28.0)
        .with_font_family("Arial");
    for field in [header, caption, footer] {
        scene.insert(Element::Text(field));
    }
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::element::{ShapePatch, TextPatch};
    use crate::event::{PointerEvent, TouchEvent};
    use crate::pending::MemoryPendingTemplate;
    use crate::timer::ManualClock;
    use web_time::Duration;

    const STAGE: Rect = Rect::new(0.0, 0.0, 400.0, 300.0);

    fn build(config: EditorConfig) -> (Editor, ManualClock) {
        let clock = ManualClock::new();
        (Editor::with_clock(config, Box::new(clock.clone())), clock)
    }

    fn empty_meme() -> (Editor, ManualClock) {
        build(EditorConfig::meme().without_seed_text())
    }

    #[test]
    fn test_seeded_meme_scene() {
        let (editor, _) = build(EditorConfig::meme());
        let scene = editor.scene();
        assert_eq!(scene.texts.len(), 3);
        assert!(scene.header().is_some());
        assert!(scene.footer().is_some());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_add_selects_and_commits() {
        let (mut editor, _) = empty_meme();
        let id = editor.add_text_field(TextRole::Text).expect("added");
        assert_eq!(editor.selected(), Some(ElementRef::new(ElementKind::Text, id)));
        assert!(editor.can_undo());
        assert_eq!(editor.scene().text(id).map(|f| f.text.as_str()), Some("New text"));
    }

    #[test]
    fn test_header_rejected_twice() {
        let (mut editor, _) = empty_meme();
        assert!(editor.add_text_field(TextRole::Header).is_some());
        assert!(editor.add_text_field(TextRole::Header).is_none());
        assert_eq!(editor.history_len(), 2);
    }

    #[test]
    fn test_disabled_features_rejected() {
        let (mut editor, _) = build(EditorConfig::template());
        assert!(editor.add_shape_field(ShapeType::Star, "#000", "#fff", 2.0).is_none());
        assert!(editor.add_text_field(TextRole::Footer).is_none());
        assert!(editor.add_logo("logo.png").is_none());
        assert!(editor.add_line_field(LineOrientation::Vertical).is_some());
    }

    #[test]
    fn test_template_defaults() {
        let (mut editor, _) = build(EditorConfig::template());
        let text = editor.add_text_field(TextRole::Text).expect("text");
        let image = editor.add_image_field("cat.png", ImageCategory::Emoji).expect("image");
        let field = editor.scene().text(text).expect("text");
        assert_eq!((field.x, field.y, field.font_size), (100.0, 100.0, 24.0));
        assert_eq!(field.text, "Editable Text");
        let image = editor.scene().image(image).expect("image");
        assert_eq!((image.width, image.height), (200.0, 150.0));
    }

    #[test]
    fn test_emoji_size() {
        let (mut editor, _) = empty_meme();
        let id = editor.add_image_field("smile.png", ImageCategory::Emoji).expect("image");
        let image = editor.scene().image(id).expect("image");
        assert_eq!((image.width, image.height), (60.0, 60.0));
    }

    #[test]
    fn test_ids_never_recycled_after_undo() {
        let (mut editor, _) = empty_meme();
        let first = editor.add_line_field(LineOrientation::Horizontal).expect("line");
        assert!(editor.undo());
        let second = editor.add_line_field(LineOrientation::Horizontal).expect("line");
        assert!(second > first);
    }

    #[test]
    fn test_remove_selected_text_moves_selection() {
        let (mut editor, _) = build(EditorConfig::meme());
        let added = editor.add_text_field(TextRole::Text).expect("text");
        assert!(editor.remove_field(ElementKind::Text, added));
        assert_eq!(
            editor.selected(),
            Some(ElementRef::new(ElementKind::Text, ElementId::new(1)))
        );
    }

    #[test]
    fn test_last_text_field_kept() {
        let (mut editor, _) = empty_meme();
        let only = editor.add_text_field(TextRole::Text).expect("text");
        assert!(!editor.remove_field(ElementKind::Text, only));

        let (mut editor, _) = build(EditorConfig::template());
        let only = editor.add_text_field(TextRole::Text).expect("text");
        assert!(editor.remove_field(ElementKind::Text, only));
        assert!(editor.selected().is_none());
    }

    #[test]
    fn test_update_coalesces_same_field() {
        let (mut editor, clock) = empty_meme();
        let id = editor.add_text_field(TextRole::Text).expect("text");
        let len = editor.history_len();
        for opacity in [90.0, 80.0, 70.0] {
            clock.advance(Duration::from_millis(50));
            let patch = ElementPatch::Text(TextPatch {
                opacity: Some(opacity),
                ..TextPatch::default()
            });
            assert!(editor.update_field(id, &patch));
        }
        assert_eq!(editor.history_len(), len + 1);

        let color = ElementPatch::Text(TextPatch {
            color: Some("#ff0000".into()),
            ..TextPatch::default()
        });
        editor.update_field(id, &color);
        assert_eq!(editor.history_len(), len + 2);

        assert!(editor.undo());
        assert_eq!(editor.scene().text(id).map(|f| f.opacity), Some(70.0));
        assert!(editor.undo());
        assert_eq!(editor.scene().text(id).map(|f| f.opacity), Some(100.0));
    }

    #[test]
    fn test_update_unknown_id() {
        let (mut editor, _) = empty_meme();
        let patch = ElementPatch::Shape(ShapePatch::default());
        assert!(!editor.update_field(ElementId::new(77), &patch));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_rotate_and_scale_commit() {
        let (mut editor, _) = empty_meme();
        let id = editor.add_image_field("a.png", ImageCategory::Upload).expect("image");
        let len = editor.history_len();
        assert!(editor.rotate_selected());
        assert!(editor.scale_selected_up());
        assert_eq!(editor.history_len(), len + 2);
        let image = editor.scene().image(id).expect("image");
        assert_eq!(image.rotation, 15.0);
        assert!((image.scale - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_line_selection_not_transformable() {
        let (mut editor, _) = empty_meme();
        editor.add_line_field(LineOrientation::Horizontal).expect("line");
        assert!(!editor.rotate_selected());
        assert!(!editor.scale_selected_down());
    }

    #[test]
    fn test_drag_commits_once() {
        let (mut editor, _) = empty_meme();
        let id = editor.add_shape_field(ShapeType::Circle, "#000000", "#ffffff", 2.0).expect("shape");
        let target = ElementRef::new(ElementKind::Shape, id);
        let len = editor.history_len();

        editor.pointer_down(&STAGE, target, Point::new(200.0, 150.0));
        for step in 1..=5u8 {
            editor.pointer_move(&STAGE, Point::new(200.0 - f32::from(step) * 30.0, 150.0));
        }
        assert!(matches!(editor.pointer_up(), DragOutcome::Ended { moved: true, .. }));
        assert_eq!(editor.history_len(), len + 1);
        let shape = editor.scene().shape(id).expect("shape");
        assert!((shape.x - 12.5).abs() < 1e-4, "x = {}", shape.x);
        assert!((shape.y - 50.0).abs() < 1e-4, "y = {}", shape.y);
    }

    #[test]
    fn test_click_without_move_does_not_commit() {
        let (mut editor, _) = empty_meme();
        let id = editor.add_text_field(TextRole::Text).expect("text");
        editor.deselect_all();
        let len = editor.history_len();
        let target = ElementRef::new(ElementKind::Text, id);
        editor.pointer_down(&STAGE, target, Point::new(200.0, 150.0));
        assert_eq!(editor.selected(), Some(target));
        editor.pointer_up();
        assert_eq!(editor.history_len(), len);
    }

    #[test]
    fn test_pinned_header_selected_without_drag() {
        let (mut editor, _) = empty_meme();
        let id = editor.add_text_field(TextRole::Header).expect("header");
        editor.deselect_all();
        let len = editor.history_len();
        let target = ElementRef::new(ElementKind::Text, id);

        let down = EditorCommand::Input {
            event: InputEvent::Pointer(PointerEvent {
                phase: PointerPhase::Down,
                x: 200.0,
                y: 20.0,
                target: Some(target),
            }),
        };
        assert_eq!(editor.apply(&STAGE, down), CommandOutcome::Applied);
        assert_eq!(editor.selected(), Some(target));
        assert!(!editor.is_dragging());
        assert_eq!(editor.pointer_down(&STAGE, target, Point::new(200.0, 20.0)), DragOutcome::Selected(target));
        assert_eq!(editor.pointer_up(), DragOutcome::Ignored);
        assert_eq!(editor.history_len(), len);
    }

    #[test]
    fn test_touch_drag() {
        let (mut editor, _) = empty_meme();
        let id = editor.add_text_field(TextRole::Text).expect("text");
        let target = ElementRef::new(ElementKind::Text, id);
        editor.handle_input(
            &STAGE,
            &InputEvent::Touch(TouchEvent::single(TouchPhase::Start, 200.0, 150.0).with_target(target)),
        );
        editor.handle_input(&STAGE, &InputEvent::Touch(TouchEvent::single(TouchPhase::Move, 40.0, 30.0)));
        editor.handle_input(&STAGE, &InputEvent::Touch(TouchEvent::single(TouchPhase::Cancel, 0.0, 0.0)));
        assert!(!editor.is_dragging());
        let text = editor.scene().text(id).expect("text");
        assert!((text.x - 10.0).abs() < 1e-4, "x = {}", text.x);
        assert!((text.y - 10.0).abs() < 1e-4, "y = {}", text.y);
    }

    #[test]
    fn test_pointer_leave_ends_drag() {
        let (mut editor, _) = empty_meme();
        let id = editor.add_text_field(TextRole::Text).expect("text");
        let target = ElementRef::new(ElementKind::Text, id);
        editor.handle_input(&STAGE, &InputEvent::Pointer(PointerEvent::down(target, 200.0, 150.0)));
        assert!(editor.is_dragging());
        editor.handle_input(&STAGE, &InputEvent::Pointer(PointerEvent::new(PointerPhase::Leave, 0.0, 0.0)));
        assert!(!editor.is_dragging());
    }

    #[test]
    fn test_auto_deselect() {
        let (mut editor, clock) = empty_meme();
        editor.add_text_field(TextRole::Text).expect("text");
        clock.advance(Duration::from_millis(2_999));
        assert!(!editor.tick());
        assert!(editor.selected().is_some());
        clock.advance(Duration::from_millis(1));
        assert!(editor.tick());
        assert!(editor.selected().is_none());
        assert!(editor.next_deadline().is_none());
    }

    #[test]
    fn test_undo_clears_dangling_selection() {
        let (mut editor, _) = empty_meme();
        editor.add_image_field("a.png", ImageCategory::Sticker).expect("image");
        assert!(editor.undo());
        assert!(editor.selected().is_none());
        assert!(editor.redo());
        assert_eq!(editor.scene().images.len(), 1);
    }

    #[test]
    fn test_apply_layout() {
        let (mut editor, _) = build(EditorConfig::template());
        editor.add_text_field(TextRole::Text).expect("text");
        assert!(editor.apply_layout(TemplateLayout::Triple));
        let scene = editor.scene();
        assert!(scene.texts.is_empty());
        assert_eq!(scene.images.len(), 3);
        assert!(scene.images.iter().all(ImageField::is_placeholder));
        assert_eq!((scene.images[1].x, scene.images[1].y), (475.0, 125.0));
        assert!(editor.undo());
        assert_eq!(editor.scene().texts.len(), 1);
    }

    #[test]
    fn test_layout_rejected_for_meme() {
        let (mut editor, _) = empty_meme();
        assert!(!editor.apply_layout(TemplateLayout::Single));
    }

    #[test]
    fn test_shape_media() {
        let (mut editor, _) = empty_meme();
        let id = editor.add_shape_field(ShapeType::Heart, "#000", "#fff", 2.0).expect("shape");
        assert!(!editor.move_shape_media(id, 1.0, 1.0, 1.0));
        assert!(editor.set_shape_media(id, Some(ShapeMedia::image("cat.png"))));
        assert!(editor.move_shape_media(id, 5.0, -5.0, 9.0));
        let media = editor.scene().shape(id).and_then(|s| s.media.clone()).expect("media");
        assert_eq!((media.image_x, media.image_y, media.image_scale), (5.0, -5.0, 3.0));
    }

    #[test]
    fn test_pending_template_rebases_history() {
        let (mut editor, _) = empty_meme();
        let mut store = MemoryPendingTemplate::with("templates/drake.jpg");
        assert!(editor.consume_pending_template(&mut store).expect("consume"));
        assert_eq!(editor.scene().backdrop.template_image.as_deref(), Some("templates/drake.jpg"));
        assert!(!editor.can_undo());
        assert!(!editor.consume_pending_template(&mut store).expect("consume"));
    }

    #[test]
    fn test_template_image_undoable() {
        let (mut editor, _) = empty_meme();
        editor.set_template_image(Some("a.png".into()));
        editor.set_template_image(Some("b.png".into()));
        assert!(editor.undo());
        assert_eq!(editor.scene().backdrop.template_image.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_apply_commands() {
        let (mut editor, _) = empty_meme();
        let outcome = editor.apply(
            &STAGE,
            EditorCommand::AddShape {
                shape_type: ShapeType::Square,
                stroke_color: "#000".into(),
                fill_color: "#fff".into(),
                stroke_width: 1.0,
            },
        );
        assert!(matches!(outcome, CommandOutcome::Created(_)));
        assert_eq!(editor.apply(&STAGE, EditorCommand::Rotate), CommandOutcome::Applied);
        assert_eq!(editor.apply(&STAGE, EditorCommand::Redo), CommandOutcome::Rejected);
        assert_eq!(editor.apply(&STAGE, EditorCommand::Undo), CommandOutcome::Applied);
    }

    #[test]
    fn test_coalesce_key_lists_touched_fields() {
        let patch = ElementPatch::Text(TextPatch {
            x: Some(1.0),
            color: Some("#fff".into()),
            ..TextPatch::default()
        });
        assert_eq!(coalesce_key(ElementId::new(4), &patch), "text#4:color:x");
    }
}
