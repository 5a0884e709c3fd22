// src/render/timeseries.rs

use super::color::Color;
use super::scene::{Scene, TextAnchor, TextItem};
use crate::grid::tracking::CellTracker;
use bevy::math::Vec2;

pub const AXES_CLASS: &str = "chart-axes";
pub const SERIES_CLASS: &str = "chart-series";
pub const LEGEND_CLASS: &str = "chart-legend";
pub const LABEL_CLASS: &str = "chart-labels";

const GRID_DIVISIONS: usize = 10;
const GRIDLINE_WIDTH: f32 = 0.5;
const AXIS_WIDTH: f32 = 1.0;
const SERIES_WIDTH: f32 = 2.0;
const LEGEND_ENTRIES: usize = 8;
const LEGEND_ROW: f32 = 18.0;
const LEGEND_SWATCH_WIDTH: f32 = 3.0;

/// Mehrfach-Liniendiagramm der beobachteten Zellen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesRenderer {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
}

impl Default for TimeSeriesRenderer {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 300.0,
            padding: 40.0,
        }
    }
}

impl TimeSeriesRenderer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn plot_width(&self) -> f32 {
        self.width - 2.0 * self.padding
    }

    pub fn plot_height(&self) -> f32 {
        self.height - 2.0 * self.padding
    }

    /// Gemeinsames Maximum aller Zeitreihen; 1, wenn keines > 0 existiert.
    pub fn max_value(tracker: &CellTracker) -> f64 {
        let max = tracker
            .series()
            .filter_map(|(_, history)| history.and_then(|h| h.max()))
            .fold(0.0_f64, f64::max);
        if max > 0.0 { max } else { 1.0 }
    }

    /// Position der Probe `index` von `len` mit Wert `value`.
    pub fn sample_point(&self, index: usize, len: usize, value: f64, max_value: f64) -> Vec2 {
        let t = if len > 1 {
            index as f32 / (len - 1) as f32
        } else {
            0.0
        };
        Vec2::new(
            self.padding + t * self.plot_width(),
            self.padding + self.plot_height() - (value / max_value) as f32 * self.plot_height(),
        )
    }

    pub fn render(&self, tracker: &CellTracker) -> Scene {
        let pad = self.padding;
        let plot_w = self.plot_width();
        let plot_h = self.plot_height();
        let max_value = Self::max_value(tracker);
        let mut scene = Scene::new(self.width, self.height).with_background(Color::WHITE);

        // Gitterlinien zuerst, damit die Achsen darüber liegen
        let axes = scene.group(AXES_CLASS);
        for i in 0..=GRID_DIVISIONS {
            let y = pad + plot_h - i as f32 * plot_h / GRID_DIVISIONS as f32;
            axes.line(
                Vec2::new(pad, y),
                Vec2::new(pad + plot_w, y),
                Color::GRIDLINE,
                GRIDLINE_WIDTH,
            );
        }
        axes.polyline(
            vec![
                Vec2::new(pad, pad),
                Vec2::new(pad, pad + plot_h),
                Vec2::new(pad + plot_w, pad + plot_h),
            ],
            Color::INK,
            AXIS_WIDTH,
        );

        let series = scene.group(SERIES_CLASS);
        for (tracked, history) in tracker.series() {
            let Some(history) = history.filter(|h| h.len() >= 2) else {
                continue;
            };
            let len = history.len();
            let points = history
                .iter()
                .enumerate()
                .map(|(i, v)| self.sample_point(i, len, v, max_value))
                .collect();
            series.polyline(points, tracked.color, SERIES_WIDTH);
        }

        let legend_x = pad + plot_w - 70.0;
        let legend_y = pad + 10.0;
        let legend = scene.group(LEGEND_CLASS);
        for (index, tracked) in tracker.cells().iter().take(LEGEND_ENTRIES).enumerate() {
            let y = legend_y + index as f32 * LEGEND_ROW;
            legend
                .text(TextItem::new(
                    Vec2::new(legend_x, y + 14.0),
                    format!("Cell {}", index + 1),
                    11.0,
                ))
                .line(
                    Vec2::new(legend_x + 35.0, y + 10.0),
                    Vec2::new(legend_x + 55.0, y + 10.0),
                    tracked.color,
                    LEGEND_SWATCH_WIDTH,
                );
        }

        scene
            .group(LABEL_CLASS)
            .text(
                TextItem::new(Vec2::new(pad + plot_w / 2.0, self.height - 10.0), "Iterations", 12.0)
                    .with_anchor(TextAnchor::Middle),
            )
            .text(
                TextItem::new(Vec2::new(pad - 5.0, pad + plot_h + 3.0), "0", 12.0)
                    .with_anchor(TextAnchor::End),
            )
            .text(
                TextItem::new(Vec2::new(pad - 5.0, pad + 3.0), format!("{max_value:.3}"), 12.0)
                    .with_anchor(TextAnchor::End),
            )
            .text(
                TextItem::new(Vec2::new(10.0, pad + plot_h / 2.0), "Concentration", 12.0)
                    .with_anchor(TextAnchor::Middle)
                    .rotated(-90.0),
            );

        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::coords::GridCell;
    use crate::grid::field::GridField;
    use crate::render::scene::Shape;
    use approx::assert_relative_eq;

    fn polylines(scene: &Scene) -> Vec<&Vec<Vec2>> {
        scene
            .find_group(SERIES_CLASS)
            .map(|g| {
                g.shapes
                    .iter()
                    .filter_map(|s| match s {
                        Shape::Polyline { points, .. } => Some(points),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn labels(scene: &Scene) -> Vec<String> {
        scene
            .groups
            .iter()
            .flat_map(|g| g.shapes.iter())
            .filter_map(|s| match s {
                Shape::Text(t) => Some(t.content.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_tracker_draws_axes_only() {
        let tracker = CellTracker::new(8, 300);
        let scene = TimeSeriesRenderer::default().render(&tracker);
        let axes = scene.find_group(AXES_CLASS).unwrap();
        // 11 Gitterlinien + Achsen
        assert_eq!(axes.shapes.len(), 12);
        assert!(polylines(&scene).is_empty());
        assert_eq!(labels(&scene), vec!["Iterations", "0", "1.000", "Concentration"]);
    }

    #[test]
    fn test_all_zero_series_scale_to_one() {
        let zeros = GridField::zeros(4);
        let mut tracker = CellTracker::new(8, 300);
        tracker.toggle(GridCell::new(2, 1));
        tracker.record(&zeros);
        tracker.record(&zeros);
        tracker.record(&zeros);

        assert_eq!(TimeSeriesRenderer::max_value(&tracker), 1.0);
        let scene = TimeSeriesRenderer::default().render(&tracker);
        assert!(labels(&scene).contains(&"1.000".to_string()));

        let lines = polylines(&scene);
        assert_eq!(lines.len(), 1);
        for point in lines[0] {
            assert!(point.x.is_finite() && point.y.is_finite());
            // Nulllinie: padding + plotHeight
            assert_relative_eq!(point.y, 260.0);
        }
    }

    #[test]
    fn test_series_need_two_samples() {
        let field = GridField::from_fn(4, |row, col| (row + col) as f64);
        let mut tracker = CellTracker::new(8, 300);
        tracker.toggle(GridCell::new(1, 1));
        tracker.record(&field);
        let scene = TimeSeriesRenderer::default().render(&tracker);
        assert!(polylines(&scene).is_empty());

        tracker.record(&field);
        let scene = TimeSeriesRenderer::default().render(&tracker);
        assert_eq!(polylines(&scene).len(), 1);
    }

    #[test]
    fn test_polyline_geometry_uses_shared_max() {
        let low = GridField::from_fn(4, |_, _| 1.0);
        let high = GridField::from_fn(4, |row, _| if row == 0 { 4.0 } else { 1.0 });
        let mut tracker = CellTracker::new(8, 300);
        tracker.toggle(GridCell::new(0, 0));
        tracker.toggle(GridCell::new(3, 3));
        tracker.record(&low);
        tracker.record(&high);

        let renderer = TimeSeriesRenderer::default();
        assert_eq!(TimeSeriesRenderer::max_value(&tracker), 4.0);
        let scene = renderer.render(&tracker);
        let lines = polylines(&scene);
        assert_eq!(lines.len(), 2);

        // plotWidth 620, plotHeight 220
        let first = lines[0];
        assert_relative_eq!(first[0].x, 40.0);
        assert_relative_eq!(first[0].y, 40.0 + 220.0 - 0.25 * 220.0);
        assert_relative_eq!(first[1].x, 660.0);
        assert_relative_eq!(first[1].y, 40.0);
        assert_relative_eq!(lines[1][1].y, 40.0 + 220.0 - 0.25 * 220.0);

        let text = labels(&scene);
        assert!(text.contains(&"4.000".to_string()));
        assert!(text.contains(&"Cell 1".to_string()));
        assert!(text.contains(&"Cell 2".to_string()));
    }

    #[test]
    fn test_legend_layout() {
        let mut tracker = CellTracker::new(8, 300);
        tracker.toggle(GridCell::new(0, 0));
        tracker.toggle(GridCell::new(0, 1));
        let scene = TimeSeriesRenderer::default().render(&tracker);
        let legend = scene.find_group(LEGEND_CLASS).unwrap();
        // legendX = 40 + 620 - 70 = 590, legendY = 50
        match &legend.shapes[2] {
            Shape::Text(t) => assert_eq!(t.position, Vec2::new(590.0, 50.0 + 18.0 + 14.0)),
            other => panic!("unexpected shape {other:?}"),
        }
        match &legend.shapes[3] {
            Shape::Line { from, to, width, .. } => {
                assert_eq!(*from, Vec2::new(625.0, 78.0));
                assert_eq!(*to, Vec2::new(645.0, 78.0));
                assert_eq!(*width, 3.0);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }
}
