//! Canonical serialized representation of an editor canvas.
//!
//! A document carries the scene and enough context (variant, viewport) to
//! rebuild or render it elsewhere. Selection and history are never part of a
//! document.

use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::config::EditorVariant;
use crate::error::EditorResult;
use crate::scene::Scene;

/// Viewport information.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportDocument {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Default for ViewportDocument {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Canonical scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Editor flavour the positions are expressed in.
    #[serde(default)]
    pub variant: EditorVariant,
    /// Viewport metadata.
    #[serde(default)]
    pub viewport: ViewportDocument,
    /// Elements and backdrop.
    pub scene: Scene,
    /// Timestamp in milliseconds.
    #[serde(default)]
    pub timestamp: u64,
}

impl SceneDocument {
    /// Build a document from a scene.
    #[must_use]
    pub fn from_scene(variant: EditorVariant, viewport: ViewportDocument, scene: &Scene, timestamp: u64) -> Self {
        Self {
            variant,
            viewport,
            scene: scene.clone(),
            timestamp,
        }
    }

    /// Take the scene out, checking its invariants.
    ///
    /// Out-of-range attribute values are normalized rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene has duplicate ids or more than one
    /// header or footer.
    pub fn into_scene(self) -> EditorResult<Scene> {
        self.scene.validate()?;
        let mut scene = self.scene;
        scene.normalize();
        Ok(scene)
    }

    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a document.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Get the current Unix timestamp in milliseconds.
#[must_use]
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}
