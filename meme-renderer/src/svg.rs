//! SVG serialization of the render tree.
//!
//! One serializer serves both preview and export; the only difference is the
//! exclusion predicate handed to [`render_svg`].

use std::fmt::Write;

use crate::layout::{RenderDocument, RenderNode};

/// Export-side exclusion predicate: true for every editor-only node.
#[must_use]
pub fn is_editor_decoration(node: &RenderNode) -> bool {
    !node.markers.is_empty()
}

/// Output raster size for a capture of `node` at `scale`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn output_size(node: &RenderNode, scale: f32) -> (u32, u32) {
    let w = (node.bounds.width * scale).ceil().max(1.0) as u32;
    let h = (node.bounds.height * scale).ceil().max(1.0) as u32;
    (w, h)
}

/// Serialize `node` and its subtree as a standalone SVG document.
///
/// The view box is the node's bounds, so the document crops to the node.
/// Subtrees for which `exclude` returns true are skipped entirely.
#[must_use]
pub fn render_svg(
    node: &RenderNode,
    scale: f32,
    background: Option<&str>,
    exclude: &dyn Fn(&RenderNode) -> bool,
) -> String {
    let (width, height) = output_size(node, scale);
    let b = node.bounds;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{height}" viewBox="{} {} {} {}">"#,
        b.x, b.y, b.width, b.height
    );
    if let Some(color) = background {
        let _ = write!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            b.x,
            b.y,
            b.width,
            b.height,
            escape_xml(color)
        );
    }
    write_node(&mut svg, node, exclude);
    svg.push_str("</svg>");
    svg
}

/// Preview of the whole document, decorations included.
#[must_use]
pub fn preview_svg(document: &RenderDocument) -> String {
    render_svg(document.root(), 1.0, None, &|_| false)
}

fn write_node(out: &mut String, node: &RenderNode, exclude: &dyn Fn(&RenderNode) -> bool) {
    if exclude(node) {
        return;
    }
    // Decorations are tagged so the preview can be styled or inspected
    let tagged = !node.markers.is_empty();
    if tagged {
        let classes: Vec<&str> = node.markers.iter().map(|m| m.as_str()).collect();
        let _ = write!(out, r#"<g class="{}">"#, classes.join(" "));
    }
    out.push_str(&node.open);
    for child in &node.children {
        write_node(out, child, exclude);
    }
    out.push_str(&node.close);
    if tagged {
        out.push_str("</g>");
    }
}

/// Escape special XML characters.
#[must_use]
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
