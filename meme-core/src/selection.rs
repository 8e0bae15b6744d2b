//! Which element, if any, is selected.

use serde::{Deserialize, Serialize};

use crate::element::{ElementId, ElementKind, ElementRef};

/// At most one selected element across all kinds.
///
/// Selecting an element of one kind implicitly clears whatever other kind was
/// selected before.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    current: Option<ElementRef>,
}

impl Selection {
    /// Nothing selected.
    #[must_use]
    pub const fn none() -> Self {
        Self { current: None }
    }

    /// Select `target`, replacing any previous selection.
    pub fn select(&mut self, target: ElementRef) {
        self.current = Some(target);
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// The selected element.
    #[must_use]
    pub const fn current(&self) -> Option<ElementRef> {
        self.current
    }

    /// Selected id of the given kind.
    #[must_use]
    pub fn of_kind(&self, kind: ElementKind) -> Option<ElementId> {
        self.current.filter(|r| r.kind == kind).map(|r| r.id)
    }

    /// Whether `target` is the selected element.
    #[must_use]
    pub fn is_selected(&self, target: ElementRef) -> bool {
        self.current == Some(target)
    }

    /// Whether anything is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// The element rotate/scale act on.
    ///
    /// Candidates are checked text first, then image, then shape. Lines are
    /// never transformable.
    #[must_use]
    pub fn transform_target(&self) -> Option<ElementRef> {
        [ElementKind::Text, ElementKind::Image, ElementKind::Shape]
            .into_iter()
            .find_map(|kind| self.of_kind(kind).map(|id| ElementRef::new(kind, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selecting_clears_other_kinds() {
        let mut selection = Selection::none();
        selection.select(ElementRef::new(ElementKind::Text, ElementId::new(1)));
        selection.select(ElementRef::new(ElementKind::Image, ElementId::new(2)));
        assert_eq!(selection.of_kind(ElementKind::Text), None);
        assert_eq!(selection.of_kind(ElementKind::Image), Some(ElementId::new(2)));
    }

    #[test]
    fn test_lines_not_transformable() {
        let mut selection = Selection::none();
        selection.select(ElementRef::new(ElementKind::Line, ElementId::new(3)));
        assert!(selection.transform_target().is_none());
        assert!(!selection.is_empty());

        selection.select(ElementRef::new(ElementKind::Shape, ElementId::new(4)));
        assert_eq!(
            selection.transform_target(),
            Some(ElementRef::new(ElementKind::Shape, ElementId::new(4)))
        );
    }
}
