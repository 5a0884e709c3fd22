// src/render/svg.rs

use super::color::Color;
use super::scene::{Scene, Shape, ShapeGroup, TextItem};
use bevy::math::{Rect, Vec2};
use svg::node::element::{Element, Group, Line, Polyline, Rectangle, Text, Title};
use svg::node::{Node, Text as TextNode};
use svg::Document;

const FONT_FAMILY: &str = "Arial, sans-serif";

// ===================================================================================
// HILFS-STRUCT für die SVG-Erstellung
// ===================================================================================
/// Übersetzt eine [`Scene`] Element für Element in ein SVG-Dokument.
struct SvgBuilder {
    document: Document,
}

impl SvgBuilder {
    /// Grundgerüst mit Größe, ViewBox, optionalem Titel, Metadaten und Hintergrund.
    fn new(scene: &Scene) -> Self {
        let mut document = Document::new()
            .set("width", scene.width)
            .set("height", scene.height)
            .set("viewBox", (0.0, 0.0, scene.width, scene.height))
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("version", "1.1");

        if let Some(title) = &scene.title {
            document = document.add(Title::new(title.as_str()));
        }
        if let Some(metadata) = &scene.metadata {
            let mut node = Element::new("metadata");
            node.append(TextNode::new(metadata.as_str()));
            document = document.add(node);
        }
        if let Some(background) = scene.background {
            document = document.add(
                Rectangle::new()
                    .set("width", scene.width)
                    .set("height", scene.height)
                    .set("fill", background.hex()),
            );
        }
        Self { document }
    }

    fn add_group(self, group: &ShapeGroup) -> Self {
        if group.is_empty() {
            return self;
        }
        let mut node = Group::new().set("class", group.class);
        for shape in &group.shapes {
            node = match shape {
                // Ohne Kantenglättung schließen Nachbarzellen lückenlos
                Shape::FillRect { rect, color } => node.add(fill(
                    rect_element(rect).set("shape-rendering", "crispEdges"),
                    *color,
                )),
                Shape::StrokeRect { rect, color, width } => {
                    node.add(stroke(rect_element(rect).set("fill", "none"), *color, *width))
                }
                Shape::Line {
                    from,
                    to,
                    color,
                    width,
                } => node.add(stroke(
                    Line::new()
                        .set("x1", from.x)
                        .set("y1", from.y)
                        .set("x2", to.x)
                        .set("y2", to.y),
                    *color,
                    *width,
                )),
                Shape::Polyline {
                    points,
                    color,
                    width,
                } => node.add(stroke(
                    Polyline::new()
                        .set("points", points_attr(points))
                        .set("fill", "none"),
                    *color,
                    *width,
                )),
                Shape::Text(item) => {
                    // Kontur als eigenes Element unter der Füllung
                    if let Some((outline, outline_width)) = item.outline {
                        node = node.add(stroke(
                            text_element(item).set("fill", "none"),
                            outline,
                            outline_width,
                        ));
                    }
                    node.add(fill(text_element(item), item.fill))
                }
            };
        }
        Self {
            document: self.document.add(node),
        }
    }

    fn finish(self) -> Document {
        self.document
    }
}

fn rect_element(rect: &Rect) -> Rectangle {
    Rectangle::new()
        .set("x", rect.min.x)
        .set("y", rect.min.y)
        .set("width", rect.width())
        .set("height", rect.height())
}

fn text_element(item: &TextItem) -> Text {
    let mut text = Text::new(item.content.as_str())
        .set("x", item.position.x)
        .set("y", item.position.y)
        .set("font-family", FONT_FAMILY)
        .set("font-size", item.font_size)
        .set("text-anchor", item.anchor.as_svg());
    if item.bold {
        text = text.set("font-weight", "bold");
    }
    if item.is_rotated() {
        text = text.set(
            "transform",
            format!(
                "rotate({} {} {})",
                item.rotation_deg, item.position.x, item.position.y
            ),
        );
    }
    text
}

fn fill<N: Node>(mut node: N, color: Color) -> N {
    node.assign("fill", color.hex());
    if !color.is_opaque() {
        node.assign("fill-opacity", color.alpha);
    }
    node
}

fn stroke<N: Node>(mut node: N, color: Color, width: f32) -> N {
    node.assign("stroke", color.hex());
    node.assign("stroke-width", width);
    if !color.is_opaque() {
        node.assign("stroke-opacity", color.alpha);
    }
    node
}

fn points_attr(points: &[Vec2]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Erzeugt das SVG-Dokument zu einer Szene.
pub fn scene_to_document(scene: &Scene) -> Document {
    scene
        .groups
        .iter()
        .fold(SvgBuilder::new(scene), SvgBuilder::add_group)
        .finish()
}

/// Wie [`scene_to_document`], serialisiert als UTF-8 mit XML-Kopf.
pub fn scene_to_svg_string(scene: &Scene) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}",
        scene_to_document(scene)
    )
}
