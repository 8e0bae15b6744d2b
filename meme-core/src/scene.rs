//! Scene state - the four element collections plus the backdrop.
//!
//! Insertion order within each collection is paint order. The scene enforces
//! structural invariants (one header, one footer) but knows nothing about
//! selection, history or id allocation; those live in [`crate::Editor`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::element::{
    clamp_opacity, clamp_scale, normalize_rotation, Element, ElementId, ElementKind, ElementPatch, ElementRef,
    ImageField, LineField, Point, ShapeField, TextField, TextRole,
};
use crate::error::{EditorError, EditorResult};

/// Canvas background behind the template image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Background {
    /// Solid fill.
    Color(String),
    /// Bitmap stretched over the canvas.
    Image(String),
}

impl Default for Background {
    fn default() -> Self {
        Self::Color("#ffffff".to_string())
    }
}

/// Everything painted beneath the elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backdrop {
    /// Template image reference.
    pub template_image: Option<String>,
    /// CSS filter applied to the template image, e.g. `grayscale(100%)`.
    pub image_style: Option<String>,
    /// Canvas background.
    pub background: Background,
}

/// The complete editable content of a canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Text fields in paint order.
    pub texts: Vec<TextField>,
    /// Images in paint order.
    pub images: Vec<ImageField>,
    /// Lines in paint order.
    pub lines: Vec<LineField>,
    /// Shapes in paint order.
    pub shapes: Vec<ShapeField>,
    /// Template image and background.
    pub backdrop: Backdrop,
}

impl Scene {
    /// An empty scene with the default backdrop.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element.
    ///
    /// Returns `false` (and leaves the scene unchanged) for a second header or
    /// footer, or an id already in use.
    pub fn insert(&mut self, element: Element) -> bool {
        if self.contains_id(element.id()) {
            tracing::debug!(id = %element.id(), "insert rejected: duplicate id");
            return false;
        }
        match element {
            Element::Text(field) => {
                if field.role != TextRole::Text && self.has_role(field.role) {
                    tracing::debug!(role = ?field.role, "insert rejected: role already present");
                    return false;
                }
                self.texts.push(field);
            }
            Element::Image(field) => self.images.push(field),
            Element::Line(field) => self.lines.push(field),
            Element::Shape(field) => self.shapes.push(field),
        }
        true
    }

    /// Apply a patch to the element with `id` in the patch's collection.
    ///
    /// Unknown ids are a no-op returning `false`.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        match patch {
            ElementPatch::Text(p) => apply_to(self.text_mut(id), |f| f.apply(p)),
            ElementPatch::Image(p) => apply_to(self.image_mut(id), |f| f.apply(p)),
            ElementPatch::Line(p) => apply_to(self.line_mut(id), |f| f.apply(p)),
            ElementPatch::Shape(p) => apply_to(self.shape_mut(id), |f| f.apply(p)),
        }
    }

    /// Remove an element. Returns `false` when it does not exist.
    pub fn remove(&mut self, target: ElementRef) -> bool {
        fn remove_by<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
            let before = items.len();
            items.retain(|item| !matches(item));
            items.len() != before
        }
        let id = target.id;
        match target.kind {
            ElementKind::Text => remove_by(&mut self.texts, |f| f.id == id),
            ElementKind::Image => remove_by(&mut self.images, |f| f.id == id),
            ElementKind::Line => remove_by(&mut self.lines, |f| f.id == id),
            ElementKind::Shape => remove_by(&mut self.shapes, |f| f.id == id),
        }
    }

    /// Whether `target` exists.
    #[must_use]
    pub fn contains(&self, target: ElementRef) -> bool {
        match target.kind {
            ElementKind::Text => self.text(target.id).is_some(),
            ElementKind::Image => self.image(target.id).is_some(),
            ElementKind::Line => self.line(target.id).is_some(),
            ElementKind::Shape => self.shape(target.id).is_some(),
        }
    }

    /// Whether any collection holds `id`.
    #[must_use]
    pub fn contains_id(&self, id: ElementId) -> bool {
        self.ids().any(|existing| existing == id)
    }

    /// Clone out the element behind `target`.
    #[must_use]
    pub fn get(&self, target: ElementRef) -> Option<Element> {
        match target.kind {
            ElementKind::Text => self.text(target.id).cloned().map(Element::Text),
            ElementKind::Image => self.image(target.id).cloned().map(Element::Image),
            ElementKind::Line => self.line(target.id).cloned().map(Element::Line),
            ElementKind::Shape => self.shape(target.id).cloned().map(Element::Shape),
        }
    }

    /// Find which collection holds `id`.
    #[must_use]
    pub fn resolve(&self, id: ElementId) -> Option<ElementRef> {
        ElementKind::ALL
            .into_iter()
            .map(|kind| ElementRef::new(kind, id))
            .find(|target| self.contains(*target))
    }

    /// Text field by id.
    #[must_use]
    pub fn text(&self, id: ElementId) -> Option<&TextField> {
        self.texts.iter().find(|f| f.id == id)
    }

    /// Mutable text field by id.
    pub fn text_mut(&mut self, id: ElementId) -> Option<&mut TextField> {
        self.texts.iter_mut().find(|f| f.id == id)
    }

    /// Image by id.
    #[must_use]
    pub fn image(&self, id: ElementId) -> Option<&ImageField> {
        self.images.iter().find(|f| f.id == id)
    }

    /// Mutable image by id.
    pub fn image_mut(&mut self, id: ElementId) -> Option<&mut ImageField> {
        self.images.iter_mut().find(|f| f.id == id)
    }

    /// Line by id.
    #[must_use]
    pub fn line(&self, id: ElementId) -> Option<&LineField> {
        self.lines.iter().find(|f| f.id == id)
    }

    /// Mutable line by id.
    pub fn line_mut(&mut self, id: ElementId) -> Option<&mut LineField> {
        self.lines.iter_mut().find(|f| f.id == id)
    }

    /// Shape by id.
    #[must_use]
    pub fn shape(&self, id: ElementId) -> Option<&ShapeField> {
        self.shapes.iter().find(|f| f.id == id)
    }

    /// Mutable shape by id.
    pub fn shape_mut(&mut self, id: ElementId) -> Option<&mut ShapeField> {
        self.shapes.iter_mut().find(|f| f.id == id)
    }

    /// Whether a text field with `role` exists.
    #[must_use]
    pub fn has_role(&self, role: TextRole) -> bool {
        self.texts.iter().any(|f| f.role == role)
    }

    /// The header field, if any.
    #[must_use]
    pub fn header(&self) -> Option<&TextField> {
        self.texts.iter().find(|f| f.role == TextRole::Header)
    }

    /// The footer field, if any.
    #[must_use]
    pub fn footer(&self) -> Option<&TextField> {
        self.texts.iter().find(|f| f.role == TextRole::Footer)
    }

    /// Native center of an element; the midpoint for lines.
    #[must_use]
    pub fn position(&self, target: ElementRef) -> Option<Point> {
        match target.kind {
            ElementKind::Text => self.text(target.id).map(|f| Point::new(f.x, f.y)),
            ElementKind::Image => self.image(target.id).map(|f| Point::new(f.x, f.y)),
            ElementKind::Line => self.line(target.id).map(|f| {
                let (x, y) = f.midpoint();
                Point::new(x, y)
            }),
            ElementKind::Shape => self.shape(target.id).map(|f| Point::new(f.x, f.y)),
        }
    }

    /// Move an element's center to `to`. Lines move rigidly.
    pub fn set_position(&mut self, target: ElementRef, to: Point) -> bool {
        let id = target.id;
        match target.kind {
            ElementKind::Text => apply_to(self.text_mut(id), |f| (f.x, f.y) = (to.x, to.y)),
            ElementKind::Image => apply_to(self.image_mut(id), |f| (f.x, f.y) = (to.x, to.y)),
            ElementKind::Line => apply_to(self.line_mut(id), |f| f.recenter(to.x, to.y)),
            ElementKind::Shape => apply_to(self.shape_mut(id), |f| (f.x, f.y) = (to.x, to.y)),
        }
    }

    /// Every element id, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.texts
            .iter()
            .map(|f| f.id)
            .chain(self.images.iter().map(|f| f.id))
            .chain(self.lines.iter().map(|f| f.id))
            .chain(self.shapes.iter().map(|f| f.id))
    }

    /// Largest id in the scene.
    #[must_use]
    pub fn max_id(&self) -> Option<ElementId> {
        self.ids().max()
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len() + self.images.len() + self.lines.len() + self.shapes.len()
    }

    /// Whether the scene holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check invariants of a scene that came from outside the editor.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidDocument`] on duplicate ids or more than
    /// one header or footer.
    pub fn validate(&self) -> EditorResult<()> {
        let mut seen = HashSet::new();
        for id in self.ids() {
            if !seen.insert(id) {
                return Err(EditorError::InvalidDocument(format!("duplicate element id {id}")));
            }
        }
        for role in [TextRole::Header, TextRole::Footer] {
            let count = self.texts.iter().filter(|f| f.role == role).count();
            if count > 1 {
                return Err(EditorError::InvalidDocument(format!("{count} text fields with role {role:?}")));
            }
        }
        Ok(())
    }

    /// Pull attribute values back into range.
    ///
    /// Opacity is clamped to `[0, 100]`, rotation wrapped into `[0, 360)`,
    /// scale and media zoom clamped to their limits.
    pub fn normalize(&mut self) {
        for field in &mut self.texts {
            field.opacity = clamp_opacity(field.opacity);
            field.rotation = normalize_rotation(field.rotation);
            field.scale = clamp_scale(field.scale);
        }
        for field in &mut self.images {
            field.opacity = clamp_opacity(field.opacity);
            field.rotation = normalize_rotation(field.rotation);
            field.scale = clamp_scale(field.scale);
        }
        for field in &mut self.lines {
            field.opacity = clamp_opacity(field.opacity);
        }
        for field in &mut self.shapes {
            field.opacity = clamp_opacity(field.opacity);
            field.rotation = normalize_rotation(field.rotation);
            field.scale = clamp_scale(field.scale);
            if let Some(media) = &mut field.media {
                let (x, y, scale) = (media.image_x, media.image_y, media.image_scale);
                media.reposition(x, y, scale);
            }
        }
    }
}

fn apply_to<T>(target: Option<&mut T>, f: impl FnOnce(&mut T)) -> bool {
    match target {
        Some(item) => {
            f(item);
            true
        }
        None => false,
    }
}
