//! Canvas elements - the four kinds of objects placed on a meme or template.
//!
//! Every element kind has its own attribute struct; [`Element`] is the tagged
//! union over them. Partial updates are expressed as patch structs whose
//! `Some` fields overwrite the element and are clamped back into the
//! element's invariants on the way in.

use serde::{Deserialize, Serialize};

/// Degrees added by a single rotate step.
pub const ROTATION_STEP: f32 = 15.0;
/// Scale delta applied by a single scale step.
pub const SCALE_STEP: f32 = 0.1;
/// Smallest allowed element scale.
pub const MIN_SCALE: f32 = 0.3;
/// Largest allowed element scale.
pub const MAX_SCALE: f32 = 3.0;
/// Smallest zoom for media embedded in a shape.
pub const MIN_MEDIA_SCALE: f32 = 0.5;
/// Largest zoom for media embedded in a shape.
pub const MAX_MEDIA_SCALE: f32 = 3.0;
/// Fully opaque, on the 0-100 opacity scale.
pub const MAX_OPACITY: f32 = 100.0;

/// Unique identifier for an element.
///
/// Ids come from one counter shared by every element kind, so an id never
/// identifies two elements at once even across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discriminant of the four element collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A [`TextField`].
    Text,
    /// An [`ImageField`].
    Image,
    /// A [`LineField`].
    Line,
    /// A [`ShapeField`].
    Shape,
}

impl ElementKind {
    /// All kinds, in selection priority order.
    pub const ALL: [Self; 4] = [Self::Text, Self::Image, Self::Shape, Self::Line];
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Line => "line",
            Self::Shape => "shape",
        };
        f.write_str(name)
    }
}

/// A typed reference to an element: which collection, which id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    /// Collection the element lives in.
    pub kind: ElementKind,
    /// Element id.
    pub id: ElementId,
}

impl ElementRef {
    /// Create a new reference.
    #[must_use]
    pub const fn new(kind: ElementKind, id: ElementId) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Wrap a rotation into `[0, 360)`.
#[must_use]
pub fn normalize_rotation(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 || !wrapped.is_finite() {
        0.0
    } else {
        wrapped
    }
}

/// Clamp a scale multiplier into `[MIN_SCALE, MAX_SCALE]`.
#[must_use]
pub fn clamp_scale(scale: f32) -> f32 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Clamp an opacity into `[0, 100]`.
#[must_use]
pub fn clamp_opacity(opacity: f32) -> f32 {
    opacity.clamp(0.0, MAX_OPACITY)
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Where a text field is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextRole {
    /// Full-width band above the template image. At most one per scene.
    Header,
    /// Full-width band below the template image. At most one per scene.
    Footer,
    /// Floating overlay on top of the template image.
    #[default]
    Text,
}

impl TextRole {
    /// Text given to a freshly added field of this role.
    #[must_use]
    pub const fn default_text(self) -> &'static str {
        match self {
            Self::Header => "Header text",
            Self::Footer => "Footer text",
            Self::Text => "New text",
        }
    }
}

/// A text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextField {
    /// Element id.
    pub id: ElementId,
    /// Text content; newlines are preserved when rendered.
    pub text: String,
    /// Horizontal center.
    pub x: f32,
    /// Vertical center.
    pub y: f32,
    /// Font size in CSS pixels, before the renderer's text scale.
    pub font_size: f32,
    /// Fill color.
    pub color: String,
    /// CSS font weight.
    pub font_weight: String,
    /// CSS font family.
    pub font_family: String,
    /// Opacity on a 0-100 scale.
    pub opacity: f32,
    /// Rotation in degrees, `[0, 360)`.
    pub rotation: f32,
    /// Scale multiplier, `[0.3, 3]`.
    pub scale: f32,
    /// Layout role.
    pub role: TextRole,
}

impl TextField {
    /// Create a text field with the editor's default styling.
    #[must_use]
    pub fn new(id: ElementId, role: TextRole, x: f32, y: f32) -> Self {
        Self {
            id,
            text: role.default_text().to_string(),
            x,
            y,
            font_size: 32.0,
            color: "#000000".to_string(),
            font_weight: "bold".to_string(),
            font_family: "Impact".to_string(),
            opacity: MAX_OPACITY,
            rotation: 0.0,
            scale: 1.0,
            role,
        }
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the font size.
    #[must_use]
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the font family.
    #[must_use]
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Whether the field currently shows only the editor placeholder.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: &TextPatch) {
        if let Some(text) = &patch.text {
            self.text.clone_from(text);
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(size) = patch.font_size {
            self.font_size = size.max(1.0);
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
        if let Some(weight) = &patch.font_weight {
            self.font_weight.clone_from(weight);
        }
        if let Some(family) = &patch.font_family {
            self.font_family.clone_from(family);
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = clamp_opacity(opacity);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = normalize_rotation(rotation);
        }
        if let Some(scale) = patch.scale {
            self.scale = clamp_scale(scale);
        }
    }
}

/// Partial update for a [`TextField`]. The role is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPatch {
    /// New text content.
    pub text: Option<String>,
    /// New horizontal center.
    pub x: Option<f32>,
    /// New vertical center.
    pub y: Option<f32>,
    /// New font size.
    pub font_size: Option<f32>,
    /// New fill color.
    pub color: Option<String>,
    /// New font weight.
    pub font_weight: Option<String>,
    /// New font family.
    pub font_family: Option<String>,
    /// New opacity.
    pub opacity: Option<f32>,
    /// New rotation.
    pub rotation: Option<f32>,
    /// New scale.
    pub scale: Option<f32>,
}

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

/// Where an added image came from; decides its initial size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCategory {
    /// User upload.
    #[default]
    Upload,
    /// Emoji glyph rendered as a bitmap.
    Emoji,
    /// Sticker from the built-in pack.
    Sticker,
    /// Bundled asset.
    Asset,
}

impl ImageCategory {
    /// Initial edge length in pixels.
    #[must_use]
    pub const fn default_size(self) -> f32 {
        match self {
            Self::Emoji => 60.0,
            Self::Upload | Self::Sticker | Self::Asset => 100.0,
        }
    }
}

/// Circular logo decoration for an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoStyle {
    /// Border stroke color.
    pub border_color: String,
    /// Border stroke width in pixels; zero draws no border.
    pub border_width: f32,
    /// Whether to draw a drop shadow.
    pub shadow: bool,
}

impl Default for LogoStyle {
    fn default() -> Self {
        Self {
            border_color: "#000000".to_string(),
            border_width: 0.0,
            shadow: false,
        }
    }
}

/// An image element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageField {
    /// Element id.
    pub id: ElementId,
    /// Bitmap reference: data URI or a path relative to the resources dir.
    /// Empty means "not uploaded yet".
    pub src: String,
    /// Horizontal center.
    pub x: f32,
    /// Vertical center.
    pub y: f32,
    /// Unscaled width in pixels.
    pub width: f32,
    /// Unscaled height in pixels.
    pub height: f32,
    /// Opacity on a 0-100 scale.
    pub opacity: f32,
    /// Rotation in degrees, `[0, 360)`.
    pub rotation: f32,
    /// Scale multiplier, `[0.3, 3]`.
    pub scale: f32,
    /// Logo decoration; `Some` renders the image as a circular logo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoStyle>,
}

impl ImageField {
    /// Create an image field.
    #[must_use]
    pub fn new(id: ElementId, src: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            src: src.into(),
            x,
            y,
            width,
            height,
            opacity: MAX_OPACITY,
            rotation: 0.0,
            scale: 1.0,
            logo: None,
        }
    }

    /// Turn the image into a circular logo.
    #[must_use]
    pub fn with_logo(mut self, logo: LogoStyle) -> Self {
        self.logo = Some(logo);
        self
    }

    /// Whether the image renders as a circular logo.
    #[must_use]
    pub fn is_logo(&self) -> bool {
        self.logo.is_some()
    }

    /// Whether the slot is still waiting for a bitmap.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.src.is_empty()
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: &ImagePatch) {
        if let Some(src) = &patch.src {
            self.src.clone_from(src);
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width.max(1.0);
        }
        if let Some(height) = patch.height {
            self.height = height.max(1.0);
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = clamp_opacity(opacity);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = normalize_rotation(rotation);
        }
        if let Some(scale) = patch.scale {
            self.scale = clamp_scale(scale);
        }
        match patch.is_logo {
            Some(true) if self.logo.is_none() => self.logo = Some(LogoStyle::default()),
            Some(false) => self.logo = None,
            _ => {}
        }
        if let Some(logo) = self.logo.as_mut() {
            if let Some(color) = &patch.border_color {
                logo.border_color.clone_from(color);
            }
            if let Some(width) = patch.border_width {
                logo.border_width = width.max(0.0);
            }
            if let Some(shadow) = patch.shadow {
                logo.shadow = shadow;
            }
        }
    }
}

/// Partial update for an [`ImageField`].
///
/// Border and shadow settings only take effect while the image is a logo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagePatch {
    /// New bitmap reference.
    pub src: Option<String>,
    /// New horizontal center.
    pub x: Option<f32>,
    /// New vertical center.
    pub y: Option<f32>,
    /// New width.
    pub width: Option<f32>,
    /// New height.
    pub height: Option<f32>,
    /// New opacity.
    pub opacity: Option<f32>,
    /// New rotation.
    pub rotation: Option<f32>,
    /// New scale.
    pub scale: Option<f32>,
    /// Turn logo rendering on or off.
    pub is_logo: Option<bool>,
    /// New logo border color.
    pub border_color: Option<String>,
    /// New logo border width.
    pub border_width: Option<f32>,
    /// Toggle the logo drop shadow.
    pub shadow: Option<bool>,
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// Initial direction of a line. Informational once the line exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineOrientation {
    /// Left-to-right segment.
    #[default]
    Horizontal,
    /// Top-to-bottom segment.
    Vertical,
}

/// A straight line segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineField {
    /// Element id.
    pub id: ElementId,
    /// First endpoint, x.
    pub x1: f32,
    /// First endpoint, y.
    pub y1: f32,
    /// Second endpoint, x.
    pub x2: f32,
    /// Second endpoint, y.
    pub y2: f32,
    /// Stroke color.
    pub color: String,
    /// Stroke width in pixels.
    pub thickness: f32,
    /// Opacity on a 0-100 scale.
    pub opacity: f32,
    /// Initial direction.
    pub orientation: LineOrientation,
}

impl LineField {
    /// Create a line of `2 * half_length` centered on `(cx, cy)`.
    #[must_use]
    pub fn centered(id: ElementId, orientation: LineOrientation, cx: f32, cy: f32, half_length: f32) -> Self {
        let (x1, y1, x2, y2) = match orientation {
            LineOrientation::Horizontal => (cx - half_length, cy, cx + half_length, cy),
            LineOrientation::Vertical => (cx, cy - half_length, cx, cy + half_length),
        };
        Self {
            id,
            x1,
            y1,
            x2,
            y2,
            color: "#000000".to_string(),
            thickness: 2.0,
            opacity: MAX_OPACITY,
            orientation,
        }
    }

    /// Midpoint of the segment.
    #[must_use]
    pub fn midpoint(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Move both endpoints by the same delta.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x1 += dx;
        self.y1 += dy;
        self.x2 += dx;
        self.y2 += dy;
    }

    /// Move the segment so its midpoint lands on `(cx, cy)`.
    pub fn recenter(&mut self, cx: f32, cy: f32) {
        let (mx, my) = self.midpoint();
        self.translate(cx - mx, cy - my);
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: &LinePatch) {
        if let Some(x1) = patch.x1 {
            self.x1 = x1;
        }
        if let Some(y1) = patch.y1 {
            self.y1 = y1;
        }
        if let Some(x2) = patch.x2 {
            self.x2 = x2;
        }
        if let Some(y2) = patch.y2 {
            self.y2 = y2;
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
        if let Some(thickness) = patch.thickness {
            self.thickness = thickness.max(0.0);
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = clamp_opacity(opacity);
        }
    }
}

/// Partial update for a [`LineField`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinePatch {
    /// New first endpoint x.
    pub x1: Option<f32>,
    /// New first endpoint y.
    pub y1: Option<f32>,
    /// New second endpoint x.
    pub x2: Option<f32>,
    /// New second endpoint y.
    pub y2: Option<f32>,
    /// New stroke color.
    pub color: Option<String>,
    /// New stroke width.
    pub thickness: Option<f32>,
    /// New opacity.
    pub opacity: Option<f32>,
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Outline of a shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeType {
    /// Thin horizontal bar.
    Line,
    /// Ellipse inscribed in the box.
    Circle,
    /// Square box.
    Square,
    /// Rectangular box.
    Rectangle,
    /// Rectangle with 12px rounded corners.
    RoundedRectangle,
    /// Isoceles triangle, apex at the top.
    Triangle,
    /// Regular pentagon, apex at the top.
    Pentagon,
    /// Five-pointed star.
    Star,
    /// Heart built from two cubic curves.
    Heart,
    /// User-supplied polygon.
    Custom,
}

impl ShapeType {
    /// Initial `(width, height)` in pixels.
    #[must_use]
    pub const fn default_size(self) -> (f32, f32) {
        match self {
            Self::Line => (100.0, 4.0),
            Self::Circle | Self::Square | Self::Pentagon | Self::Star | Self::Heart => (80.0, 80.0),
            Self::Rectangle | Self::RoundedRectangle => (120.0, 60.0),
            Self::Triangle => (80.0, 70.0),
            Self::Custom => (100.0, 100.0),
        }
    }
}

/// A 2D point in a shape's local box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Media clipped into a shape's outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeMedia {
    /// Bitmap or video reference.
    pub src: String,
    /// Whether `src` is a video.
    #[serde(default)]
    pub is_video: bool,
    /// Horizontal pan inside the shape, in pixels.
    #[serde(default)]
    pub image_x: f32,
    /// Vertical pan inside the shape, in pixels.
    #[serde(default)]
    pub image_y: f32,
    /// Zoom around the shape center, `[0.5, 3]`.
    #[serde(default = "ShapeMedia::default_scale")]
    pub image_scale: f32,
}

impl ShapeMedia {
    const fn default_scale() -> f32 {
        1.0
    }

    /// Still image media at the default position.
    #[must_use]
    pub fn image(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            is_video: false,
            image_x: 0.0,
            image_y: 0.0,
            image_scale: 1.0,
        }
    }

    /// Video media at the default position.
    #[must_use]
    pub fn video(src: impl Into<String>) -> Self {
        Self {
            is_video: true,
            ..Self::image(src)
        }
    }

    /// Pan and zoom the media, clamping the zoom.
    pub fn reposition(&mut self, x: f32, y: f32, scale: f32) {
        self.image_x = x;
        self.image_y = y;
        self.image_scale = scale.clamp(MIN_MEDIA_SCALE, MAX_MEDIA_SCALE);
    }
}

/// A geometric shape element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeField {
    /// Element id.
    pub id: ElementId,
    /// Outline.
    pub shape_type: ShapeType,
    /// Horizontal center.
    pub x: f32,
    /// Vertical center.
    pub y: f32,
    /// Box width in pixels.
    pub width: f32,
    /// Box height in pixels.
    pub height: f32,
    /// Outline color.
    pub stroke_color: String,
    /// Interior color.
    pub fill_color: String,
    /// Outline width in pixels.
    pub stroke_width: f32,
    /// Opacity on a 0-100 scale.
    pub opacity: f32,
    /// Rotation in degrees, `[0, 360)`.
    pub rotation: f32,
    /// Scale multiplier, `[0.3, 3]`.
    pub scale: f32,
    /// Polygon for [`ShapeType::Custom`], in the shape's local box.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    /// Media clipped into the outline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<ShapeMedia>,
}

impl ShapeField {
    /// Create a shape with its type's default size.
    #[must_use]
    pub fn new(
        id: ElementId,
        shape_type: ShapeType,
        x: f32,
        y: f32,
        stroke_color: impl Into<String>,
        fill_color: impl Into<String>,
        stroke_width: f32,
    ) -> Self {
        let (width, height) = shape_type.default_size();
        Self {
            id,
            shape_type,
            x,
            y,
            width,
            height,
            stroke_color: stroke_color.into(),
            fill_color: fill_color.into(),
            stroke_width: stroke_width.max(0.0),
            opacity: MAX_OPACITY,
            rotation: 0.0,
            scale: 1.0,
            points: Vec::new(),
            media: None,
        }
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: &ShapePatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width.max(1.0);
        }
        if let Some(height) = patch.height {
            self.height = height.max(1.0);
        }
        if let Some(color) = &patch.stroke_color {
            self.stroke_color.clone_from(color);
        }
        if let Some(color) = &patch.fill_color {
            self.fill_color.clone_from(color);
        }
        if let Some(width) = patch.stroke_width {
            self.stroke_width = width.max(0.0);
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = clamp_opacity(opacity);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = normalize_rotation(rotation);
        }
        if let Some(scale) = patch.scale {
            self.scale = clamp_scale(scale);
        }
        if let Some(points) = &patch.points {
            self.points.clone_from(points);
        }
    }
}

/// Partial update for a [`ShapeField`]. Media has its own operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapePatch {
    /// New horizontal center.
    pub x: Option<f32>,
    /// New vertical center.
    pub y: Option<f32>,
    /// New box width.
    pub width: Option<f32>,
    /// New box height.
    pub height: Option<f32>,
    /// New outline color.
    pub stroke_color: Option<String>,
    /// New interior color.
    pub fill_color: Option<String>,
    /// New outline width.
    pub stroke_width: Option<f32>,
    /// New opacity.
    pub opacity: Option<f32>,
    /// New rotation.
    pub rotation: Option<f32>,
    /// New scale.
    pub scale: Option<f32>,
    /// New custom polygon.
    pub points: Option<Vec<Point>>,
}

// ---------------------------------------------------------------------------
// Unions
// ---------------------------------------------------------------------------

/// Any element, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    /// Text element.
    Text(TextField),
    /// Image element.
    Image(ImageField),
    /// Line element.
    Line(LineField),
    /// Shape element.
    Shape(ShapeField),
}

impl Element {
    /// Element id.
    #[must_use]
    pub fn id(&self) -> ElementId {
        match self {
            Self::Text(f) => f.id,
            Self::Image(f) => f.id,
            Self::Line(f) => f.id,
            Self::Shape(f) => f.id,
        }
    }

    /// Element kind.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::Image(_) => ElementKind::Image,
            Self::Line(_) => ElementKind::Line,
            Self::Shape(_) => ElementKind::Shape,
        }
    }

    /// Typed reference to this element.
    #[must_use]
    pub fn as_ref(&self) -> ElementRef {
        ElementRef::new(self.kind(), self.id())
    }
}

/// A partial update for any element kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementPatch {
    /// Update a text field.
    Text(TextPatch),
    /// Update an image field.
    Image(ImagePatch),
    /// Update a line field.
    Line(LinePatch),
    /// Update a shape field.
    Shape(ShapePatch),
}

impl ElementPatch {
    /// Kind of element this patch targets.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::Image(_) => ElementKind::Image,
            Self::Line(_) => ElementKind::Line,
            Self::Shape(_) => ElementKind::Shape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(0.0), 0.0);
        assert_eq!(normalize_rotation(360.0), 0.0);
        assert_eq!(normalize_rotation(375.0), 15.0);
        assert_eq!(normalize_rotation(-15.0), 345.0);
        assert_eq!(normalize_rotation(f32::NAN), 0.0);
    }

    #[test]
    fn test_text_patch_clamps() {
        let mut field = TextField::new(ElementId::new(1), TextRole::Text, 50.0, 50.0);
        field.apply(&TextPatch {
            opacity: Some(150.0),
            scale: Some(10.0),
            rotation: Some(-30.0),
            ..TextPatch::default()
        });
        assert_eq!(field.opacity, 100.0);
        assert_eq!(field.scale, MAX_SCALE);
        assert_eq!(field.rotation, 330.0);
        assert_eq!(field.role, TextRole::Text);
    }

    #[test]
    fn test_image_logo_toggle() {
        let mut image = ImageField::new(ElementId::new(2), "logo.png", 50.0, 50.0, 100.0, 100.0);
        image.apply(&ImagePatch {
            border_width: Some(4.0),
            ..ImagePatch::default()
        });
        assert!(image.logo.is_none(), "border ignored until the image is a logo");

        image.apply(&ImagePatch {
            is_logo: Some(true),
            border_width: Some(4.0),
            shadow: Some(true),
            ..ImagePatch::default()
        });
        let logo = image.logo.as_ref().expect("logo enabled");
        assert_eq!(logo.border_width, 4.0);
        assert!(logo.shadow);

        image.apply(&ImagePatch {
            is_logo: Some(false),
            ..ImagePatch::default()
        });
        assert!(!image.is_logo());
    }

    #[test]
    fn test_line_recenter_keeps_length() {
        let mut line = LineField::centered(ElementId::new(3), LineOrientation::Horizontal, 50.0, 50.0, 20.0);
        assert_eq!((line.x1, line.x2), (30.0, 70.0));
        line.recenter(20.0, 10.0);
        assert_eq!(line.midpoint(), (20.0, 10.0));
        assert_eq!(line.x2 - line.x1, 40.0);
        assert_eq!(line.y1, line.y2);
    }

    #[test]
    fn test_vertical_line() {
        let line = LineField::centered(ElementId::new(4), LineOrientation::Vertical, 300.0, 200.0, 100.0);
        assert_eq!((line.x1, line.y1, line.x2, line.y2), (300.0, 100.0, 300.0, 300.0));
    }

    #[test]
    fn test_shape_default_sizes() {
        assert_eq!(ShapeType::Circle.default_size(), (80.0, 80.0));
        assert_eq!(ShapeType::Line.default_size(), (100.0, 4.0));
        assert_eq!(ShapeType::RoundedRectangle.default_size(), (120.0, 60.0));
        assert_eq!(ShapeType::Triangle.default_size(), (80.0, 70.0));
    }

    #[test]
    fn test_media_scale_clamped() {
        let mut media = ShapeMedia::image("cat.png");
        media.reposition(4.0, -2.0, 10.0);
        assert_eq!(media.image_scale, MAX_MEDIA_SCALE);
        media.reposition(0.0, 0.0, 0.1);
        assert_eq!(media.image_scale, MIN_MEDIA_SCALE);
    }

    #[test]
    fn test_element_serde_tagging() {
        let element = Element::Shape(ShapeField::new(
            ElementId::new(9),
            ShapeType::RoundedRectangle,
            50.0,
            50.0,
            "#000000",
            "#ffffff",
            2.0,
        ));
        let json = serde_json::to_value(&element).expect("serialize");
        assert_eq!(json["kind"], "shape");
        assert_eq!(json["shape_type"], "rounded-rectangle");
        assert_eq!(json["id"], 9);

        let back: Element = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, element);
    }

    #[test]
    fn test_patch_deserializes_sparse() {
        let patch: ElementPatch =
            serde_json::from_str(r##"{"kind":"text","color":"#ff0000"}"##).expect("patch");
        assert_eq!(patch.kind(), ElementKind::Text);
        match patch {
            ElementPatch::Text(p) => {
                assert_eq!(p.color.as_deref(), Some("#ff0000"));
                assert!(p.x.is_none());
            }
            _ => panic!("wrong patch kind"),
        }
    }
}
