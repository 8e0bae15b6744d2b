//! Editor configuration.
//!
//! The meme and template editors share one implementation; everything that
//! differs between them lives here. Configs are plain serde data so hosts can
//! load them from JSON.

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::coords::CoordinateSpace;
use crate::element::Point;
use crate::timer::DEFAULT_DESELECT_AFTER;

/// Which editor flavour is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorVariant {
    /// Percent positions over a responsive template image.
    #[default]
    Meme,
    /// Pixel positions on a fixed-size canvas.
    Template,
}

impl EditorVariant {
    /// Native coordinate space for element positions.
    #[must_use]
    pub const fn coordinate_space(self) -> CoordinateSpace {
        match self {
            Self::Meme => CoordinateSpace::PERCENT,
            Self::Template => CoordinateSpace::Pixel,
        }
    }
}

/// Element kinds and roles a variant offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureSet {
    /// Shapes can be added.
    pub shapes: bool,
    /// Lines can be added.
    pub lines: bool,
    /// Header/footer text roles can be added.
    pub header_footer: bool,
    /// Images can be added as logos.
    pub logos: bool,
}

impl FeatureSet {
    /// Everything enabled.
    pub const ALL: Self = Self {
        shapes: true,
        lines: true,
        header_footer: true,
        logos: true,
    };
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::ALL
    }
}

/// Where freshly added elements land, in native coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultPlacement {
    /// Center of a new floating text field.
    pub text: Point,
    /// Vertical center of a new header.
    pub header_y: f32,
    /// Vertical center of a new footer.
    pub footer_y: f32,
    /// Center of a new image.
    pub image: Point,
    /// Size of a new image; `None` uses the image category's default.
    pub image_size: Option<(f32, f32)>,
    /// Center of a new line.
    pub line_center: Point,
    /// Half the length of a new line.
    pub line_half_length: f32,
    /// Center of a new shape.
    pub shape: Point,
}

impl DefaultPlacement {
    /// Placement for the percent-based meme stage.
    #[must_use]
    pub const fn meme() -> Self {
        Self {
            text: Point::new(50.0, 50.0),
            header_y: 10.0,
            footer_y: 90.0,
            image: Point::new(50.0, 50.0),
            image_size: None,
            line_center: Point::new(50.0, 50.0),
            line_half_length: 20.0,
            shape: Point::new(50.0, 50.0),
        }
    }

    /// Placement for the fixed pixel canvas.
    #[must_use]
    pub const fn template() -> Self {
        Self {
            text: Point::new(100.0, 100.0),
            header_y: 40.0,
            footer_y: 560.0,
            image: Point::new(150.0, 150.0),
            image_size: Some((200.0, 150.0)),
            line_center: Point::new(300.0, 200.0),
            line_half_length: 100.0,
            shape: Point::new(300.0, 200.0),
        }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Editor flavour.
    pub variant: EditorVariant,
    /// Enabled element kinds.
    pub features: FeatureSet,
    /// Selection is cleared after this long without a selection event.
    #[serde(with = "millis")]
    pub auto_deselect: Duration,
    /// Consecutive updates to the same element and field within this window
    /// share one history entry. Zero disables coalescing.
    #[serde(with = "millis")]
    pub coalesce_window: Duration,
    /// Fixed canvas size `(width, height)` for the template variant.
    pub canvas_size: (f32, f32),
    /// Where new elements land.
    pub placement: DefaultPlacement,
    /// Refuse to remove the last remaining text field.
    pub keep_last_text_field: bool,
    /// Seed a new editor with the stock header/caption/footer texts.
    pub seed_default_text: bool,
}

impl EditorConfig {
    /// Meme editor: percent positions, every feature on.
    #[must_use]
    pub fn meme() -> Self {
        Self {
            variant: EditorVariant::Meme,
            features: FeatureSet::ALL,
            auto_deselect: DEFAULT_DESELECT_AFTER,
            coalesce_window: Duration::from_millis(400),
            canvas_size: (800.0, 600.0),
            placement: DefaultPlacement::meme(),
            keep_last_text_field: true,
            seed_default_text: true,
        }
    }

    /// Template editor: 800x600 pixel canvas, text/image/line only.
    #[must_use]
    pub fn template() -> Self {
        Self {
            variant: EditorVariant::Template,
            features: FeatureSet {
                shapes: false,
                lines: true,
                header_footer: false,
                logos: false,
            },
            placement: DefaultPlacement::template(),
            keep_last_text_field: false,
            seed_default_text: false,
            ..Self::meme()
        }
    }

    /// Builder: override the feature set.
    #[must_use]
    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    /// Builder: override the coalesce window.
    #[must_use]
    pub fn with_coalesce_window(mut self, window: Duration) -> Self {
        self.coalesce_window = window;
        self
    }

    /// Builder: start with an empty scene.
    #[must_use]
    pub fn without_seed_text(mut self) -> Self {
        self.seed_default_text = false;
        self
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::meme()
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use web_time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
