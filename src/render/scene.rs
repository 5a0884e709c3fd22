// src/render/scene.rs
//
// Auflösungsunabhängige Zeichenliste. Heatmap und Diagramm erzeugen beide eine
// `Scene`; sie wird 1:1 in ein SVG-Dokument übersetzt, aus dem auch die
// Pixelflächen gerendert werden.

use super::color::Color;
use bevy::math::{Rect, Vec2};

/// Horizontale Ausrichtung eines Textes relativ zu seinem Ankerpunkt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Ein Textelement. `position` ist der Ankerpunkt auf der Grundlinie.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub position: Vec2,
    pub content: String,
    pub font_size: f32,
    pub bold: bool,
    pub fill: Color,
    /// Kontur unter der Füllung (Farbe, Breite).
    pub outline: Option<(Color, f32)>,
    pub anchor: TextAnchor,
    /// Drehung in Grad um `position`, gegen den Uhrzeigersinn negativ.
    pub rotation_deg: f32,
}

impl TextItem {
    pub fn new(position: Vec2, content: impl Into<String>, font_size: f32) -> Self {
        Self {
            position,
            content: content.into(),
            font_size,
            bold: false,
            fill: Color::BLACK,
            outline: None,
            anchor: TextAnchor::Start,
            rotation_deg: 0.0,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_outline(mut self, color: Color, width: f32) -> Self {
        self.outline = Some((color, width));
        self
    }

    pub fn with_anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation_deg = degrees;
        self
    }

    pub fn is_rotated(&self) -> bool {
        self.rotation_deg != 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    FillRect {
        rect: Rect,
        color: Color,
    },
    /// Kontur mittig auf dem Rechteckrand, wie bei SVG `stroke`.
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
    },
    Polyline {
        points: Vec<Vec2>,
        color: Color,
        width: f32,
    },
    Text(TextItem),
}

/// Benannte Gruppe von Formen; der Name wird im SVG zur `class` der `<g>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeGroup {
    pub class: &'static str,
    pub shapes: Vec<Shape>,
}

impl ShapeGroup {
    pub fn new(class: &'static str) -> Self {
        Self {
            class,
            shapes: Vec::new(),
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) -> &mut Self {
        self.shapes.push(Shape::FillRect { rect, color });
        self
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) -> &mut Self {
        self.shapes.push(Shape::StrokeRect { rect, color, width });
        self
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) -> &mut Self {
        self.shapes.push(Shape::Line {
            from,
            to,
            color,
            width,
        });
        self
    }

    pub fn polyline(&mut self, points: Vec<Vec2>, color: Color, width: f32) -> &mut Self {
        self.shapes.push(Shape::Polyline {
            points,
            color,
            width,
        });
        self
    }

    pub fn text(&mut self, item: TextItem) -> &mut Self {
        self.shapes.push(Shape::Text(item));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Vollständige Zeichenliste einer Fläche.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub background: Option<Color>,
    pub title: Option<String>,
    /// Freitext für `<metadata>`.
    pub metadata: Option<String>,
    pub groups: Vec<ShapeGroup>,
}

impl Scene {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background: None,
            title: None,
            metadata: None,
            groups: Vec::new(),
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Hängt eine neue Gruppe an und gibt sie zum Befüllen zurück.
    pub fn group(&mut self, class: &'static str) -> &mut ShapeGroup {
        self.groups.push(ShapeGroup::new(class));
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    pub fn find_group(&self, class: &str) -> Option<&ShapeGroup> {
        self.groups.iter().find(|g| g.class == class)
    }
}
