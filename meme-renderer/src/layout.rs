//! Render tree for the live canvas.
//!
//! Layout turns a scene into a tree of named nodes carrying pixel bounds and
//! SVG markup. Preview and export walk the same tree; export skips every node
//! that carries a decoration [`Marker`].
//!
//! ```text
//! meme-container
//! ├── header-band      (meme only, when the header has text)
//! ├── stage            backdrop + elements, sorted by z
//! │   ├── image-4
//! │   │   ├── selection-ring   [selection-ring]
//! │   │   └── resize-handle    [resize-handle] x4
//! │   └── text-2               [placeholder] when empty
//! └── footer-band      (meme only)
//! ```

use std::fmt::Write;
use std::path::PathBuf;

use meme_core::{
    Background, CanvasSurface, CoordinateSpace, Editor, EditorConfig, EditorVariant, ElementKind, ElementRef,
    ImageField, LineField, LogoStyle, Point, Rect, Scene, Selection, ShapeField, TextField, TextRole,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::image::{ResolvedImage, ResourceResolver};
use crate::shapes::Outline;
use crate::svg::escape_xml;

/// Name of the node export captures.
pub const CAPTURE_ROOT: &str = "meme-container";
/// Name of the node pointer coordinates are mapped against.
pub const STAGE: &str = "stage";
/// Shown in place of an empty text field.
pub const TEXT_PLACEHOLDER: &str = "Place your text here";

const Z_BACKDROP: i32 = 0;
const Z_BASE: i32 = 1;
const Z_LINE: i32 = 2;
const Z_SELECTED: i32 = 10;

const RING_STROKE: &str = "#60a5fa";
const ACCENT: &str = "#3b82f6";
const PLACEHOLDER_INK: &str = "#9ca3af";
const HANDLE_SIZE: f32 = 8.0;
const KNOB_OFFSET: f32 = 16.0;
const KNOB_RADIUS: f32 = 5.0;
const ENDPOINT_RADIUS: f32 = 4.0;
const OUTLINE_WIDTH: f32 = 4.0;
const MIN_TEXT_WIDTH: f32 = 60.0;
// Average advance of a bold display face, as a fraction of the font size
const GLYPH_ADVANCE: f32 = 0.6;

const FILTER_FUNCTIONS: [&str; 9] = [
    "blur",
    "brightness",
    "contrast",
    "grayscale",
    "hue-rotate",
    "invert",
    "opacity",
    "saturate",
    "sepia",
];

/// Editor-only decoration carried by a render node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Marker {
    /// Outline around the selected element.
    SelectionRing,
    /// Stand-in for content that has not been provided yet.
    Placeholder,
    /// Rotate knob or line endpoint grip.
    ControlHandle,
    /// Corner grip on a resizable element.
    ResizeHandle,
}

impl Marker {
    /// Marker name as it appears in the tree.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelectionRing => "selection-ring",
            Self::Placeholder => "placeholder",
            Self::ControlHandle => "control-handle",
            Self::ResizeHandle => "resize-handle",
        }
    }
}

/// A node of the render tree.
///
/// `open` is written before the children and `close` after them, so a node
/// can wrap its children in a transformed group.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    /// Node name; capture looks nodes up by it.
    pub name: String,
    /// Axis-aligned pixel bounds in viewport coordinates, before rotation.
    pub bounds: Rect,
    /// Element this node paints, if any.
    pub target: Option<ElementRef>,
    /// Decoration markers.
    pub markers: Vec<Marker>,
    /// Stacking order among siblings.
    pub z_index: i32,
    /// Markup written before the children.
    pub open: String,
    /// Markup written after the children.
    pub close: String,
    /// Child nodes in paint order.
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    /// Create an empty node.
    #[must_use]
    pub fn new(name: impl Into<String>, bounds: Rect) -> Self {
        Self {
            name: name.into(),
            bounds,
            target: None,
            markers: Vec::new(),
            z_index: 0,
            open: String::new(),
            close: String::new(),
            children: Vec::new(),
        }
    }

    fn markup(mut self, open: String, close: &str) -> Self {
        self.open = open;
        self.close = close.to_string();
        self
    }

    fn target(mut self, target: ElementRef) -> Self {
        self.target = Some(target);
        self
    }

    fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    fn z(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Whether this node carries the given marker.
    #[must_use]
    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }

    /// Depth-first search by name, including this node.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RenderNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// This node and all descendants in paint order.
    #[must_use]
    pub fn descendants(&self) -> Vec<&RenderNode> {
        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }
}

fn collect<'a>(node: &'a RenderNode, out: &mut Vec<&'a RenderNode>) {
    out.push(node);
    for child in &node.children {
        collect(child, out);
    }
}

/// Layout settings for the live canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Width of the meme container in pixels.
    pub viewport_width: f32,
    /// Top-left of the container in viewport pixels.
    pub origin: Point,
    /// Font pixels per unit of element font size in the meme editor.
    pub text_scale: f32,
    /// Stage height over width when no template image is available.
    pub fallback_aspect: f32,
    /// Container background.
    pub background: String,
    /// Directory relative image references resolve against.
    pub resources_dir: Option<PathBuf>,
    /// Draw rotate knobs and resize grips around the selection.
    pub show_handles: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport_width: 600.0,
            origin: Point::default(),
            text_scale: 0.4,
            fallback_aspect: 0.75,
            background: "#ffffff".to_string(),
            resources_dir: None,
            show_handles: true,
        }
    }
}

/// The laid-out canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDocument {
    root: RenderNode,
    stage: Rect,
}

impl RenderDocument {
    /// Lay out a scene.
    #[must_use]
    pub fn build(scene: &Scene, selection: Selection, editor: &EditorConfig, config: &RenderConfig) -> Self {
        let layout = Layout {
            scene,
            selection,
            config,
            space: editor.variant.coordinate_space(),
            resolver: ResourceResolver::new(config.resources_dir.clone()),
        };
        let document = match editor.variant {
            EditorVariant::Meme => layout.meme(),
            EditorVariant::Template => layout.template(editor.canvas_size),
        };
        debug!(
            "Laid out {} nodes, stage {}x{}",
            document.root.descendants().len(),
            document.stage.width,
            document.stage.height
        );
        document
    }

    /// Lay out an editor's current scene and selection.
    #[must_use]
    pub fn from_editor(editor: &Editor, config: &RenderConfig) -> Self {
        Self::build(editor.scene(), editor.selection(), editor.config(), config)
    }

    /// Root node.
    #[must_use]
    pub fn root(&self) -> &RenderNode {
        &self.root
    }

    /// Find a node by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RenderNode> {
        self.root.find(name)
    }

    /// Stage bounds.
    #[must_use]
    pub fn stage(&self) -> Rect {
        self.stage
    }

    /// Topmost element under a viewport point.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<ElementRef> {
        self.root
            .descendants()
            .into_iter()
            .rev()
            .find(|node| node.target.is_some() && node.bounds.contains(point))
            .and_then(|node| node.target)
    }

    /// Nodes carrying any decoration marker.
    #[must_use]
    pub fn decorations(&self) -> Vec<&RenderNode> {
        self.root
            .descendants()
            .into_iter()
            .filter(|node| !node.markers.is_empty())
            .collect()
    }
}

impl CanvasSurface for RenderDocument {
    fn bounds(&self) -> Rect {
        self.stage
    }
}

struct Layout<'a> {
    scene: &'a Scene,
    selection: Selection,
    config: &'a RenderConfig,
    space: CoordinateSpace,
    resolver: ResourceResolver,
}

impl Layout<'_> {
    fn meme(&self) -> RenderDocument {
        let width = self.config.viewport_width.max(1.0);
        let origin = self.config.origin;
        let template = self
            .scene
            .backdrop
            .template_image
            .as_deref()
            .and_then(|src| self.resolver.resolve(src));
        let aspect = template.as_ref().map_or(self.config.fallback_aspect, ResolvedImage::aspect);

        let mut y = origin.y;
        let header = self.band("header-band", self.scene.header(), origin.x, y, width);
        if let Some(node) = &header {
            y += node.bounds.height;
        }

        let stage = Rect::new(origin.x, y, width, width * aspect);
        y += stage.height;
        let stage_node = self.stage(stage, template.as_ref());

        let footer = self.band("footer-band", self.scene.footer(), origin.x, y, width);
        if let Some(node) = &footer {
            y += node.bounds.height;
        }

        let bounds = Rect::new(origin.x, origin.y, width, y - origin.y);
        let mut root = self.root(bounds);
        root.children.extend(header);
        root.children.push(stage_node);
        root.children.extend(footer);
        RenderDocument { root, stage }
    }

    fn template(&self, canvas_size: (f32, f32)) -> RenderDocument {
        let origin = self.config.origin;
        let stage = Rect::new(origin.x, origin.y, canvas_size.0.max(1.0), canvas_size.1.max(1.0));
        let template = self
            .scene
            .backdrop
            .template_image
            .as_deref()
            .and_then(|src| self.resolver.resolve(src));
        let mut root = self.root(stage);
        root.children.push(self.stage(stage, template.as_ref()));
        RenderDocument { root, stage }
    }

    fn root(&self, bounds: Rect) -> RenderNode {
        let open = format!(
            r#"<g id="{CAPTURE_ROOT}"><rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            escape_xml(&self.config.background)
        );
        RenderNode::new(CAPTURE_ROOT, bounds).markup(open, "</g>")
    }

    fn is_meme(&self) -> bool {
        self.space.is_percent()
    }

    fn z(&self, target: ElementRef) -> i32 {
        if self.selection.is_selected(target) {
            Z_SELECTED
        } else if target.kind == ElementKind::Line {
            Z_LINE
        } else {
            Z_BASE
        }
    }

    fn center(&self, x: f32, y: f32, stage: Rect) -> Point {
        self.space.to_viewport(Point::new(x, y), stage)
    }

    // ---------------------------------------------------------------
    // Stage
    // ---------------------------------------------------------------

    fn stage(&self, stage: Rect, template: Option<&ResolvedImage>) -> RenderNode {
        let mut open = format!(r#"<g id="{STAGE}">"#);
        open.push_str(&self.background(stage));
        if let Some(image) = template {
            let _ = write!(
                open,
                r#"<image href="{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid meet"{}/>"#,
                image.href,
                stage.x,
                stage.y,
                stage.width,
                stage.height,
                filter_attr(self.scene.backdrop.image_style.as_deref())
            );
        }
        let mut node = RenderNode::new(STAGE, stage).markup(open, "</g>").z(Z_BACKDROP);

        if template.is_none() && self.is_meme() {
            node.children.push(
                placeholder(
                    "template-placeholder",
                    Rect::new(0.0, 0.0, stage.width, stage.height),
                    stage,
                    "Choose a template to get started",
                )
                .markup_at(stage.x, stage.y),
            );
        }

        let mut elements = Vec::with_capacity(self.scene.len());
        for field in &self.scene.images {
            elements.push(self.image(field, self.center(field.x, field.y, stage)));
        }
        for shape in &self.scene.shapes {
            elements.push(self.shape(shape, self.center(shape.x, shape.y, stage)));
        }
        for line in &self.scene.lines {
            elements.push(self.line(line, stage));
        }
        for field in &self.scene.texts {
            // Meme header and footer live in their own bands
            if self.is_meme() && field.role != TextRole::Text {
                continue;
            }
            elements.push(self.text(field, self.center(field.x, field.y, stage)));
        }
        elements.sort_by_key(|node| node.z_index);
        node.children.extend(elements);
        node
    }

    fn background(&self, stage: Rect) -> String {
        let fill = |color: &str| {
            format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                stage.x,
                stage.y,
                stage.width,
                stage.height,
                escape_xml(color)
            )
        };
        match &self.scene.backdrop.background {
            Background::Color(color) => fill(color),
            Background::Image(src) => match self.resolver.resolve(src) {
                Some(image) => format!(
                    r#"<image href="{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid slice"/>"#,
                    image.href, stage.x, stage.y, stage.width, stage.height
                ),
                None => fill("#ffffff"),
            },
        }
    }

    // ---------------------------------------------------------------
    // Text
    // ---------------------------------------------------------------

    /// Full-width header or footer band. Empty bands are not rendered.
    fn band(&self, name: &str, field: Option<&TextField>, x: f32, y: f32, width: f32) -> Option<RenderNode> {
        let field = field.filter(|f| !f.is_empty())?;
        let size = field.font_size * self.config.text_scale;
        let line_height = size * 1.1;
        let text = field.text.to_uppercase();
        let lines: Vec<&str> = text.split('\n').collect();
        #[allow(clippy::cast_precision_loss)]
        let height = lines.len() as f32 * line_height + size;

        let bounds = Rect::new(x, y, width, height);
        let target = ElementRef::new(ElementKind::Text, field.id);
        let mut open = group_open(bounds.center(), field.rotation, field.scale, field.opacity);
        let _ = write!(
            open,
            r##"<rect x="{}" y="{}" width="{width}" height="{height}" fill="#ffffff"/>"##,
            -width / 2.0,
            -height / 2.0
        );
        open.push_str(&text_markup(
            &lines,
            &TextStyle {
                family: &field.font_family,
                weight: &field.font_weight,
                size,
                line_height,
                color: &field.color,
                outline: is_white(&field.color),
            },
        ));

        let mut node = RenderNode::new(name, bounds)
            .target(target)
            .z(self.z(target))
            .markup(open, "</g>");
        self.decorate(&mut node, target, (width / 2.0, height / 2.0), field.scale, false);
        Some(node)
    }

    fn text(&self, field: &TextField, center: Point) -> RenderNode {
        let meme = self.is_meme();
        let size = field.font_size * if meme { self.config.text_scale } else { 1.0 };
        let line_height = size * 1.2;
        let empty = field.is_empty();
        let shown = if empty { TEXT_PLACEHOLDER } else { field.text.as_str() };
        let lines: Vec<&str> = shown.split('\n').collect();
        let (width, height) = text_box(&lines, size, line_height);

        let target = ElementRef::new(ElementKind::Text, field.id);
        let mut open = group_open(center, field.rotation, field.scale, field.opacity);
        open.push_str(&text_markup(
            &lines,
            &TextStyle {
                family: &field.font_family,
                weight: &field.font_weight,
                size,
                line_height,
                color: if empty { PLACEHOLDER_INK } else { field.color.as_str() },
                outline: meme || is_white(&field.color),
            },
        ));

        let mut node = RenderNode::new(
            format!("text-{}", field.id),
            Rect::centered(center, width * field.scale, height * field.scale),
        )
        .target(target)
        .z(self.z(target))
        .markup(open, "</g>");
        if empty {
            node = node.marker(Marker::Placeholder);
        }
        self.decorate(&mut node, target, (width / 2.0, height / 2.0), field.scale, false);
        node
    }

    // ---------------------------------------------------------------
    // Images
    // ---------------------------------------------------------------

    fn image(&self, field: &ImageField, center: Point) -> RenderNode {
        let (w, h) = (field.width * field.scale, field.height * field.scale);
        let bounds = Rect::centered(center, w, h);
        let target = ElementRef::new(ElementKind::Image, field.id);
        let mut open = group_open(center, field.rotation, 1.0, field.opacity);
        let mut node = RenderNode::new(format!("image-{}", field.id), bounds)
            .target(target)
            .z(self.z(target));

        if field.is_placeholder() {
            node.children
                .push(placeholder("image-placeholder", Rect::centered(Point::default(), w, h), bounds, "Upload image"));
        } else if let Some(image) = self.resolver.resolve(&field.src) {
            match &field.logo {
                Some(logo) => open.push_str(&logo_markup(field, &image.href, w, h, logo)),
                None => {
                    let _ = write!(
                        open,
                        r#"<image href="{}" x="{}" y="{}" width="{w}" height="{h}" preserveAspectRatio="xMidYMid slice"/>"#,
                        image.href,
                        -w / 2.0,
                        -h / 2.0
                    );
                }
            }
        }

        node = node.markup(open, "</g>");
        self.decorate(&mut node, target, (w / 2.0, h / 2.0), 1.0, true);
        node
    }

    // ---------------------------------------------------------------
    // Lines
    // ---------------------------------------------------------------

    fn line(&self, line: &LineField, stage: Rect) -> RenderNode {
        let p1 = self.center(line.x1, line.y1, stage);
        let p2 = self.center(line.x2, line.y2, stage);
        let pad = line.thickness / 2.0 + ENDPOINT_RADIUS;
        let bounds = Rect::new(
            p1.x.min(p2.x) - pad,
            p1.y.min(p2.y) - pad,
            (p1.x - p2.x).abs() + 2.0 * pad,
            (p1.y - p2.y).abs() + 2.0 * pad,
        );
        let target = ElementRef::new(ElementKind::Line, line.id);
        let open = format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-linecap="round" opacity="{}"/>"#,
            p1.x,
            p1.y,
            p2.x,
            p2.y,
            escape_xml(&line.color),
            line.thickness,
            opacity(line.opacity)
        );
        let mut node = RenderNode::new(format!("line-{}", line.id), bounds)
            .target(target)
            .z(self.z(target))
            .markup(open, "");

        if self.selection.is_selected(target) {
            let halo = format!(
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{ACCENT}" stroke-width="{}" stroke-linecap="round" opacity="0.3"/>"#,
                p1.x,
                p1.y,
                p2.x,
                p2.y,
                line.thickness + 2.0
            );
            node.children
                .push(RenderNode::new("selection-ring", bounds).marker(Marker::SelectionRing).markup(halo, ""));
            for end in [p1, p2] {
                let grip = format!(r#"<circle cx="{}" cy="{}" r="{ENDPOINT_RADIUS}" fill="{ACCENT}"/>"#, end.x, end.y);
                node.children.push(
                    RenderNode::new("control-handle", Rect::centered(end, 2.0 * ENDPOINT_RADIUS, 2.0 * ENDPOINT_RADIUS))
                        .marker(Marker::ControlHandle)
                        .markup(grip, ""),
                );
            }
        }
        node
    }

    // ---------------------------------------------------------------
    // Shapes
    // ---------------------------------------------------------------

    fn shape(&self, shape: &ShapeField, center: Point) -> RenderNode {
        let (w, h) = (shape.width, shape.height);
        let outline = Outline::of(shape);
        let target = ElementRef::new(ElementKind::Shape, shape.id);

        let mut open = group_open(center, shape.rotation, shape.scale, shape.opacity);
        let _ = write!(open, r#"<g transform="translate({} {})">"#, -w / 2.0, -h / 2.0);
        open.push_str(&outline.to_svg(&format!(
            r#"fill="{}" stroke="{}" stroke-width="{}""#,
            escape_xml(&shape.fill_color),
            escape_xml(&shape.stroke_color),
            shape.stroke_width
        )));
        if let Some(media) = &shape.media {
            if media.is_video {
                warn!("Shape {} holds video media, which is not rasterized", shape.id);
            } else if let Some(image) = self.resolver.resolve(&media.src) {
                let clip = format!("shape-clip-{}", shape.id);
                let _ = write!(
                    open,
                    r#"<defs><clipPath id="{clip}">{}</clipPath></defs><g clip-path="url(#{clip})"><image href="{}" x="0" y="0" width="{w}" height="{h}" preserveAspectRatio="xMidYMid slice" transform="translate({} {}) translate({} {}) scale({}) translate({} {})"/></g>"#,
                    outline.to_svg(""),
                    image.href,
                    media.image_x,
                    media.image_y,
                    w / 2.0,
                    h / 2.0,
                    media.image_scale,
                    -w / 2.0,
                    -h / 2.0
                );
            }
        }
        open.push_str("</g>");

        let mut node = RenderNode::new(
            format!("shape-{}", shape.id),
            Rect::centered(center, w * shape.scale, h * shape.scale),
        )
        .target(target)
        .z(self.z(target))
        .markup(open, "</g>");
        self.decorate(&mut node, target, (w / 2.0, h / 2.0), shape.scale, true);
        node
    }

    // ---------------------------------------------------------------
    // Decoration
    // ---------------------------------------------------------------

    /// Selection ring and handles in the element's centered local frame.
    fn decorate(&self, node: &mut RenderNode, target: ElementRef, half: (f32, f32), scale: f32, resizable: bool) {
        if !self.selection.is_selected(target) {
            return;
        }
        let (hw, hh) = half;
        let center = node.bounds.center();
        let ring = format!(
            r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#eff6ff" fill-opacity="0.2" stroke="{RING_STROKE}" stroke-opacity="0.5" stroke-width="{}"/>"##,
            -hw,
            -hh,
            2.0 * hw,
            2.0 * hh,
            2.0 / scale
        );
        node.children
            .push(RenderNode::new("selection-ring", node.bounds).marker(Marker::SelectionRing).markup(ring, ""));

        if !self.config.show_handles {
            return;
        }
        // Handles keep a constant on-screen size whatever the element scale
        let size = HANDLE_SIZE / scale;
        if resizable {
            for (sx, sy) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let grip = format!(
                    r##"<rect x="{}" y="{}" width="{size}" height="{size}" fill="#ffffff" stroke="{ACCENT}" stroke-width="{}"/>"##,
                    sx * hw - size / 2.0,
                    sy * hh - size / 2.0,
                    1.0 / scale
                );
                let at = Point::new(center.x + sx * hw * scale, center.y + sy * hh * scale);
                node.children.push(
                    RenderNode::new("resize-handle", Rect::centered(at, HANDLE_SIZE, HANDLE_SIZE))
                        .marker(Marker::ResizeHandle)
                        .markup(grip, ""),
                );
            }
        }
        let knob_y = -hh - KNOB_OFFSET / scale;
        let knob = format!(
            r##"<line x1="0" y1="{}" x2="0" y2="{knob_y}" stroke="{ACCENT}" stroke-width="{}"/><circle cx="0" cy="{knob_y}" r="{}" fill="#ffffff" stroke="{ACCENT}" stroke-width="{}"/>"##,
            -hh,
            1.0 / scale,
            KNOB_RADIUS / scale,
            1.0 / scale
        );
        let at = Point::new(center.x, center.y - hh * scale - KNOB_OFFSET);
        node.children.push(
            RenderNode::new("control-handle", Rect::centered(at, 2.0 * KNOB_RADIUS, 2.0 * KNOB_RADIUS))
                .marker(Marker::ControlHandle)
                .markup(knob, ""),
        );
    }
}

impl RenderNode {
    /// Wrap the node's markup in a translation.
    fn markup_at(mut self, x: f32, y: f32) -> Self {
        self.open = format!(r#"<g transform="translate({x} {y})">{}"#, self.open);
        self.close.push_str("</g>");
        self
    }
}

/// Dashed stand-in drawn in `local` coordinates.
fn placeholder(name: &str, local: Rect, bounds: Rect, label: &str) -> RenderNode {
    let size = (local.height / 8.0).clamp(10.0, 18.0);
    let center = local.center();
    let open = format!(
        r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#f3f4f6" stroke="{PLACEHOLDER_INK}" stroke-width="2" stroke-dasharray="6 4"/><text x="{}" y="{}" text-anchor="middle" font-family="Arial, sans-serif" font-size="{size}" fill="{PLACEHOLDER_INK}">{}</text>"##,
        local.x,
        local.y,
        local.width,
        local.height,
        center.x,
        center.y + size * 0.35,
        escape_xml(label)
    );
    RenderNode::new(name, bounds).marker(Marker::Placeholder).markup(open, "")
}

fn logo_markup(field: &ImageField, href: &str, w: f32, h: f32, logo: &LogoStyle) -> String {
    let r = w.min(h) / 2.0;
    let id = field.id;
    let mut svg = format!(r#"<defs><clipPath id="logo-clip-{id}"><circle cx="0" cy="0" r="{r}"/></clipPath>"#);
    if logo.shadow {
        let _ = write!(
            svg,
            r##"<filter id="logo-shadow-{id}" x="-50%" y="-50%" width="200%" height="200%"><feDropShadow dx="0" dy="4" stdDeviation="4" flood-color="#000000" flood-opacity="0.3"/></filter>"##
        );
    }
    svg.push_str("</defs>");
    if logo.shadow {
        let _ = write!(svg, r#"<g filter="url(#logo-shadow-{id})">"#);
    } else {
        svg.push_str("<g>");
    }
    let _ = write!(
        svg,
        r#"<image href="{href}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid slice" clip-path="url(#logo-clip-{id})"/>"#,
        -r,
        -r,
        2.0 * r,
        2.0 * r
    );
    if logo.border_width > 0.0 {
        let _ = write!(
            svg,
            r#"<circle cx="0" cy="0" r="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            r - logo.border_width / 2.0,
            escape_xml(&logo.border_color),
            logo.border_width
        );
    }
    svg.push_str("</g>");
    svg
}

struct TextStyle<'a> {
    family: &'a str,
    weight: &'a str,
    size: f32,
    line_height: f32,
    color: &'a str,
    outline: bool,
}

/// Centered multi-line text around the local origin.
fn text_markup(lines: &[&str], style: &TextStyle<'_>) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<text xml:space="preserve" text-anchor="middle" font-family="{}, Impact, Arial, sans-serif" font-weight="{}" font-size="{}" fill="{}""#,
        escape_xml(style.family),
        escape_xml(style.weight),
        style.size,
        escape_xml(style.color)
    );
    if style.outline {
        let _ = write!(
            svg,
            r##" stroke="#000000" stroke-width="{OUTLINE_WIDTH}" stroke-linejoin="round" paint-order="stroke""##
        );
    }
    svg.push('>');
    #[allow(clippy::cast_precision_loss)]
    let first = -(lines.len().saturating_sub(1) as f32) * style.line_height / 2.0;
    for (i, line) in lines.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let y = (i as f32).mul_add(style.line_height, first) + style.size * 0.35;
        let _ = write!(svg, r#"<tspan x="0" y="{y}">{}</tspan>"#, escape_xml(line));
    }
    svg.push_str("</text>");
    svg
}

#[allow(clippy::cast_precision_loss)]
fn text_box(lines: &[&str], size: f32, line_height: f32) -> (f32, f32) {
    let longest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    let width = (longest as f32 * size * GLYPH_ADVANCE).max(MIN_TEXT_WIDTH);
    (width, lines.len().max(1) as f32 * line_height)
}

fn group_open(center: Point, rotation: f32, scale: f32, opacity_percent: f32) -> String {
    format!(
        r#"<g transform="translate({} {}) rotate({rotation}) scale({scale})" opacity="{}">"#,
        center.x,
        center.y,
        opacity(opacity_percent)
    )
}

fn opacity(percent: f32) -> f32 {
    (percent / 100.0).clamp(0.0, 1.0)
}

fn is_white(color: &str) -> bool {
    matches!(color.trim().to_ascii_lowercase().as_str(), "#ffffff" | "#fff" | "white")
}

/// `filter` attribute for a CSS filter list, or nothing when the list holds
/// anything but known filter functions.
fn filter_attr(style: Option<&str>) -> String {
    let Some(style) = style.map(str::trim).filter(|s| !s.is_empty() && *s != "none") else {
        return String::new();
    };
    let known = style
        .split(')')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .all(|part| {
            part.split_once('(')
                .is_some_and(|(name, _)| FILTER_FUNCTIONS.contains(&name.trim()))
        });
    if known {
        format!(r#" filter="{}""#, escape_xml(style))
    } else {
        warn!("Ignoring unsupported image filter {style:?}");
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meme_core::{ElementId, ImageCategory, LineOrientation, ShapeType};

    fn meme_editor() -> Editor {
        Editor::new(EditorConfig::meme().without_seed_text())
    }

    fn layout(editor: &Editor) -> RenderDocument {
        RenderDocument::from_editor(editor, &RenderConfig::default())
    }

    #[test]
    fn test_meme_stage_uses_fallback_aspect() {
        let doc = layout(&meme_editor());
        assert_eq!(doc.stage(), Rect::new(0.0, 0.0, 600.0, 450.0));
        assert_eq!(doc.root().name, CAPTURE_ROOT);
        assert!(doc.find("template-placeholder").is_some());
    }

    #[test]
    fn test_bands_stack_around_stage() {
        let mut editor = meme_editor();
        editor.add_text_field(TextRole::Header);
        editor.add_text_field(TextRole::Footer);
        let doc = layout(&editor);

        let header = doc.find("header-band").expect("header");
        let footer = doc.find("footer-band").expect("footer");
        let stage = doc.stage();
        assert!((header.bounds.bottom() - stage.y).abs() < 1e-3);
        assert!((footer.bounds.y - stage.bottom()).abs() < 1e-3);
        assert!((doc.root().bounds.height - (header.bounds.height + stage.height + footer.bounds.height)).abs() < 1e-3);
    }

    #[test]
    fn test_empty_header_not_rendered() {
        let mut editor = meme_editor();
        let id = editor.add_text_field(TextRole::Header).expect("header");
        editor.update_field(
            id,
            &meme_core::ElementPatch::Text(meme_core::TextPatch {
                text: Some("   ".into()),
                ..meme_core::TextPatch::default()
            }),
        );
        let doc = layout(&editor);
        assert!(doc.find("header-band").is_none());
        assert_eq!(doc.stage().y, 0.0);
    }

    #[test]
    fn test_empty_text_is_placeholder() {
        let mut editor = meme_editor();
        let id = editor.add_text_field(TextRole::Text).expect("text");
        editor.update_field(
            id,
            &meme_core::ElementPatch::Text(meme_core::TextPatch {
                text: Some(String::new()),
                ..meme_core::TextPatch::default()
            }),
        );
        let doc = layout(&editor);
        let node = doc.find(&format!("text-{id}")).expect("text node");
        assert!(node.has_marker(Marker::Placeholder));
        assert!(node.open.contains(TEXT_PLACEHOLDER));
    }

    #[test]
    fn test_selected_element_on_top() {
        let mut editor = meme_editor();
        let first = editor.add_shape_field(ShapeType::Circle, "#000", "#fff", 2.0).expect("shape");
        editor.add_image_field("", ImageCategory::Upload);
        editor.select_field(ElementKind::Shape, first);
        let doc = layout(&editor);

        let stage = doc.find(STAGE).expect("stage");
        let last = stage.children.last().expect("children");
        assert_eq!(last.target, Some(ElementRef::new(ElementKind::Shape, first)));
        assert_eq!(last.z_index, Z_SELECTED);
    }

    #[test]
    fn test_selection_decorations() {
        let mut editor = meme_editor();
        editor.add_shape_field(ShapeType::Square, "#000", "#fff", 2.0);
        let doc = layout(&editor);
        let markers: Vec<Marker> = doc.decorations().iter().flat_map(|n| n.markers.clone()).collect();
        assert_eq!(markers.iter().filter(|m| **m == Marker::SelectionRing).count(), 1);
        assert_eq!(markers.iter().filter(|m| **m == Marker::ResizeHandle).count(), 4);
        assert_eq!(markers.iter().filter(|m| **m == Marker::ControlHandle).count(), 1);

        editor.deselect_all();
        let doc = layout(&editor);
        // only the missing-template placeholder remains
        assert_eq!(doc.decorations().len(), 1);
    }

    #[test]
    fn test_line_selection_has_endpoint_grips() {
        let mut editor = meme_editor();
        let id = editor.add_line_field(LineOrientation::Horizontal).expect("line");
        let doc = layout(&editor);
        let node = doc.find(&format!("line-{id}")).expect("line");
        assert_eq!(node.z_index, Z_SELECTED);
        assert_eq!(node.children.iter().filter(|c| c.has_marker(Marker::ControlHandle)).count(), 2);
    }

    #[test]
    fn test_element_center_matches_surface_mapping() {
        let mut editor = meme_editor();
        let id = editor.add_shape_field(ShapeType::Circle, "#000", "#fff", 2.0).expect("shape");
        let doc = layout(&editor);
        let node = doc.find(&format!("shape-{id}")).expect("shape");
        let expected = CoordinateSpace::PERCENT.to_viewport(Point::new(50.0, 50.0), doc.bounds());
        assert!((node.bounds.center().x - expected.x).abs() < 1e-3);
        assert!((node.bounds.center().y - expected.y).abs() < 1e-3);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut editor = meme_editor();
        let below = editor.add_shape_field(ShapeType::Square, "#000", "#fff", 2.0).expect("shape");
        let above = editor.add_shape_field(ShapeType::Square, "#000", "#fff", 2.0).expect("shape");
        editor.deselect_all();
        let doc = layout(&editor);
        let center = doc.stage().center();
        assert_eq!(doc.hit_test(center), Some(ElementRef::new(ElementKind::Shape, above)));

        editor.select_field(ElementKind::Shape, below);
        let doc = layout(&editor);
        assert_eq!(doc.hit_test(center), Some(ElementRef::new(ElementKind::Shape, below)));
        assert_eq!(doc.hit_test(Point::new(-10.0, -10.0)), None);
    }

    #[test]
    fn test_template_canvas_is_fixed_size() {
        let mut editor = Editor::new(EditorConfig::template());
        editor.add_text_field(TextRole::Text);
        let doc = layout(&editor);
        assert_eq!(doc.stage(), Rect::new(0.0, 0.0, 800.0, 600.0));
        assert!(doc.find("template-placeholder").is_none());
        let text = doc
            .root()
            .descendants()
            .into_iter()
            .find(|n| n.name.starts_with("text-"))
            .expect("text");
        assert!(!text.open.contains("stroke=\"#000000\""));
    }

    #[test]
    fn test_origin_offsets_everything() {
        let config = RenderConfig {
            origin: Point::new(30.0, 40.0),
            ..RenderConfig::default()
        };
        let doc = RenderDocument::from_editor(&meme_editor(), &config);
        assert_eq!(doc.stage().x, 30.0);
        assert_eq!(doc.stage().y, 40.0);
        assert_eq!(doc.root().bounds.x, 30.0);
    }

    #[test]
    fn test_filter_attr_whitelist() {
        assert_eq!(filter_attr(Some("grayscale(100%)")), r#" filter="grayscale(100%)""#);
        assert_eq!(
            filter_attr(Some("sepia(50%) brightness(1.2)")),
            r#" filter="sepia(50%) brightness(1.2)""#
        );
        assert_eq!(filter_attr(Some("none")), "");
        assert_eq!(filter_attr(Some("url(#evil)")), "");
        assert_eq!(filter_attr(None), "");
    }

    #[test]
    fn test_logo_markup_clips_to_circle() {
        let field = ImageField::new(ElementId::new(7), "logo.png", 0.0, 0.0, 100.0, 80.0);
        let style = LogoStyle {
            border_color: "#ff0000".into(),
            border_width: 4.0,
            shadow: true,
        };
        let svg = logo_markup(&field, "data:,", 100.0, 80.0, &style);
        assert!(svg.contains(r#"<clipPath id="logo-clip-7"><circle cx="0" cy="0" r="40"/>"#));
        assert!(svg.contains("feDropShadow"));
        assert!(svg.contains(r#"r="38""#));
    }

    #[test]
    fn test_white_detection() {
        assert!(is_white("#FFFFFF"));
        assert!(is_white(" white "));
        assert!(!is_white("#fffffe"));
    }
}
