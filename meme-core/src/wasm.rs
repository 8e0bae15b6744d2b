//! WebAssembly bindings for meme-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! Everything crosses the boundary as JSON.

use wasm_bindgen::prelude::*;

use crate::{EditorCommand, EditorConfig, Editor, Rect, ViewportDocument};

/// Initialize the editor WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create a meme editor with the default configuration.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            editor: Editor::new(EditorConfig::meme()),
        }
    }

    /// Create an editor from a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error string if the configuration cannot be parsed.
    #[wasm_bindgen(js_name = fromConfigJson)]
    pub fn from_config_json(json: &str) -> Result<WasmEditor, String> {
        let config: EditorConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(Self {
            editor: Editor::new(config),
        })
    }

    /// Apply one JSON command against the canvas bounds read just now.
    ///
    /// Returns the command outcome as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the command cannot be parsed.
    #[wasm_bindgen(js_name = applyCommand)]
    pub fn apply_command(&mut self, json: &str, left: f32, top: f32, width: f32, height: f32) -> Result<String, String> {
        let command: EditorCommand = serde_json::from_str(json).map_err(|e| e.to_string())?;
        let outcome = self.editor.apply(&Rect::new(left, top, width, height), command);
        serde_json::to_string(&outcome).map_err(|e| e.to_string())
    }

    /// Fire the auto-deselect timer if due. Returns whether it fired.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> bool {
        self.editor.tick()
    }

    /// Get the current scene as JSON.
    #[wasm_bindgen(js_name = getSceneJson)]
    #[must_use]
    pub fn get_scene_json(&self) -> String {
        serde_json::to_string(self.editor.scene()).unwrap_or_default()
    }

    /// Get the current scene as a canonical document.
    #[wasm_bindgen(js_name = getDocumentJson)]
    #[must_use]
    pub fn get_document_json(&self, width: f32, height: f32) -> String {
        let document = self.editor.document(ViewportDocument { width, height });
        serde_json::to_string(&document).unwrap_or_default()
    }

    /// Get the selected element reference as JSON (`null` when empty).
    #[wasm_bindgen(js_name = getSelectionJson)]
    #[must_use]
    pub fn get_selection_json(&self) -> String {
        serde_json::to_string(&self.editor.selected()).unwrap_or_default()
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasm_editor_starts_seeded() {
        let editor = WasmEditor::new();
        let scene: serde_json::Value = serde_json::from_str(&editor.get_scene_json()).expect("valid json");
        assert_eq!(scene["texts"].as_array().map(Vec::len), Some(3));
        assert!(!editor.can_undo());
    }

    #[test]
    fn apply_command_returns_outcome() {
        let mut editor = WasmEditor::default();
        let outcome = editor
            .apply_command(r#"{"op":"add_text","role":"text"}"#, 0.0, 0.0, 400.0, 300.0)
            .expect("command");
        assert!(outcome.contains("created"));
        assert!(editor.can_undo());
        assert!(editor.get_selection_json().contains("text"));
    }

    #[test]
    fn apply_command_rejects_bad_json() {
        let mut editor = WasmEditor::default();
        assert!(editor.apply_command("{", 0.0, 0.0, 1.0, 1.0).is_err());
    }
}
