// src/render/heatmap.rs

use super::color::Color;
use super::color_scale::{ColorScale, HueFamily};
use super::scene::{Scene, TextItem};
use crate::grid::coords::{GridCell, cell_rect};
use crate::grid::field::{GridField, ScalarField2D};
use crate::grid::selection::BrushSelection;
use crate::grid::tracking::TrackedCell;
use bevy::math::{Rect, Vec2};

pub const CELLS_CLASS: &str = "heatmap-cells";
pub const SELECTION_CLASS: &str = "brush-selection";
pub const TRACKED_CLASS: &str = "tracked-cells";
pub const STATUS_CLASS: &str = "heatmap-text";

// Overlay-Konstanten (Pixel)
const SELECTION_FILL_ALPHA: f32 = 0.3;
const SELECTION_STROKE_ALPHA: f32 = 0.8;
const SELECTION_STROKE_WIDTH: f32 = 0.3;
const TRACKED_OUTER_WIDTH: f32 = 4.0;
const TRACKED_OUTER_GROW: f32 = 2.0;
const TRACKED_INNER_WIDTH: f32 = 1.0;
const LABEL_OFFSET: Vec2 = Vec2::new(2.0, 12.0);
const LABEL_SIZE: f32 = 12.0;
const LABEL_OUTLINE: f32 = 3.0;
const STATUS_ORIGIN: Vec2 = Vec2::new(10.0, 10.0);
const STATUS_SIZE: Vec2 = Vec2::new(320.0, 80.0);

/// Alles, was ein Heatmap-Bild bestimmt.
#[derive(Debug, Clone, Copy)]
pub struct HeatmapFrame<'a> {
    pub field: &'a GridField,
    pub family: HueFamily,
    pub selection: &'a BrushSelection,
    pub tracked: &'a [TrackedCell],
    pub iteration: u64,
    pub time_step: f64,
}

impl HeatmapFrame<'_> {
    pub fn time(&self) -> f64 {
        self.iteration as f64 * self.time_step
    }

    /// Die vier Zeilen des Statusblocks.
    pub fn status_lines(&self, scale: &ColorScale) -> [String; 4] {
        [
            format!("Iteration: {} | Time: {:.2}", self.iteration, self.time()),
            format!(
                "Range: {} - {}",
                exponential(scale.min_value),
                exponential(scale.max_value)
            ),
            format!("Brush selected (input): {} cells", self.selection.len()),
            format!("Tracked cells (plot): {}", self.tracked.len()),
        ]
    }
}

/// Wissenschaftliche Schreibweise mit zwei Nachkommastellen und explizitem
/// Vorzeichen im Exponenten (`1.50e+0`, `1.28e-2`).
fn exponential(value: f64) -> String {
    let text = format!("{value:.2e}");
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => text,
    }
}

/// Rechteck, das auf allen Seiten um `by` wächst.
fn grow(rect: Rect, by: f32) -> Rect {
    Rect::from_corners(rect.min - Vec2::splat(by), rect.max + Vec2::splat(by))
}

/// Baut die Heatmap-Szene für eine quadratische Fläche der Kantenlänge `size`.
#[derive(Debug, Clone, Copy)]
pub struct HeatmapRenderer {
    pub size: f32,
}

impl HeatmapRenderer {
    pub fn new(size: f32) -> Self {
        Self { size }
    }

    pub fn render(&self, frame: &HeatmapFrame) -> Scene {
        let scale = ColorScale::from_field(frame.field);
        let n = frame.field.size();
        let mut scene = Scene::new(self.size, self.size).with_background(Color::BLACK);

        // 1. Zellen
        let cells = scene.group(CELLS_CLASS);
        for row in 0..n {
            for col in 0..n {
                let cell = GridCell::new(row, col);
                let color = scale.color(frame.field.value(row, col), frame.family);
                cells.fill_rect(cell_rect(cell, self.size, n), color);
            }
        }

        // 2. Pinsel-Auswahl
        if !frame.selection.is_empty() {
            let overlay = scene.group(SELECTION_CLASS);
            for cell in frame.selection.iter() {
                let rect = cell_rect(cell, self.size, n);
                overlay
                    .fill_rect(rect, Color::WHITE.with_alpha(SELECTION_FILL_ALPHA))
                    .stroke_rect(
                        rect,
                        Color::WHITE.with_alpha(SELECTION_STROKE_ALPHA),
                        SELECTION_STROKE_WIDTH,
                    );
            }
        }

        // 3. Beobachtete Zellen mit Rahmen und Nummer
        if !frame.tracked.is_empty() {
            let group = scene.group(TRACKED_CLASS);
            for (index, tracked) in frame.tracked.iter().enumerate() {
                let rect = cell_rect(tracked.cell, self.size, n);
                group
                    .stroke_rect(
                        grow(rect, TRACKED_OUTER_GROW),
                        tracked.color,
                        TRACKED_OUTER_WIDTH,
                    )
                    .stroke_rect(rect, Color::WHITE, TRACKED_INNER_WIDTH)
                    .text(
                        TextItem::new(rect.min + LABEL_OFFSET, (index + 1).to_string(), LABEL_SIZE)
                            .bold()
                            .with_fill(Color::WHITE)
                            .with_outline(Color::BLACK, LABEL_OUTLINE),
                    );
            }
        }

        // 4. Statusblock
        let [first, rest @ ..] = frame.status_lines(&scale);
        let status = scene.group(STATUS_CLASS);
        status
            .fill_rect(
                Rect::from_corners(STATUS_ORIGIN, STATUS_ORIGIN + STATUS_SIZE),
                Color::WHITE,
            )
            .text(TextItem::new(Vec2::new(15.0, 30.0), first, 16.0));
        for (i, line) in rest.into_iter().enumerate() {
            status.text(TextItem::new(
                Vec2::new(15.0, 50.0 + 20.0 * i as f32),
                line,
                12.0,
            ));
        }

        scene
    }
}
