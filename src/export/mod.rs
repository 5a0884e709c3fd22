// src/export/mod.rs
//
// Schnappschüsse der Heatmap und des Diagramms als SVG oder PNG.

pub mod png;

use crate::engine::{EngineError, MoleculeId, SimulationEngine, lease};
use crate::grid::selection::BrushSelection;
use crate::grid::tracking::{CellTracker, TrackedCell};
use crate::render::heatmap::{HeatmapFrame, HeatmapRenderer};
use crate::render::raster::{RasterError, Surface};
use crate::render::scene::Scene;
use crate::render::svg;
use crate::render::timeseries::TimeSeriesRenderer;
use bevy::log::info;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Engine error while reading the field: {0}")]
    Engine(#[from] EngineError),

    #[error("Rendering failed: {0}")]
    Raster(#[from] RasterError),

    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] image::ImageError),

    #[error("Surface is empty ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    #[error("Could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportTarget {
    Heatmap,
    LinePlot,
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportTarget::Heatmap => write!(f, "heatmap"),
            ExportTarget::LinePlot => write!(f, "line plot"),
        }
    }
}

/// Ein fertiges Exportdokument im Speicher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub target: ExportTarget,
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Snapshot {
    /// Schreibt das Dokument nach `dir/<file_name>`.
    pub fn save(&self, dir: impl AsRef<Path>) -> ExportResult<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Export '{}' written ({} bytes).", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Was der Vektor-Export der Heatmap außer dem frisch gelesenen Feld braucht.
#[derive(Debug, Clone, Copy)]
pub struct HeatmapExport<'a> {
    pub molecule: MoleculeId,
    pub selection: &'a BrushSelection,
    pub tracked: &'a [TrackedCell],
    pub iteration: u64,
    pub time_step: f64,
}

/// Erzeugt Exportdokumente in kanonischer Auflösung.
/// Liest nur; der Live-Zustand wird nie verändert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotExporter {
    /// Kantenlänge der Heatmap-Exporte.
    pub heatmap_size: u32,
    pub chart: TimeSeriesRenderer,
}

impl Default for SnapshotExporter {
    fn default() -> Self {
        Self {
            heatmap_size: 600,
            chart: TimeSeriesRenderer::default(),
        }
    }
}

impl SnapshotExporter {
    pub fn new(heatmap_size: u32, chart: TimeSeriesRenderer) -> Self {
        Self {
            heatmap_size,
            chart,
        }
    }

    pub fn file_name(&self, target: ExportTarget, format: ExportFormat, iteration: u64) -> String {
        let ext = format.extension();
        match target {
            ExportTarget::Heatmap => format!(
                "ecm-heatmap-{iteration}-{0}x{0}.{ext}",
                self.heatmap_size
            ),
            ExportTarget::LinePlot => format!("ecm-lineplot-{iteration}.{ext}"),
        }
    }

    fn snapshot(
        &self,
        target: ExportTarget,
        format: ExportFormat,
        iteration: u64,
        bytes: Vec<u8>,
    ) -> Snapshot {
        Snapshot {
            target,
            format,
            file_name: self.file_name(target, format, iteration),
            bytes,
        }
    }

    /// Vektor-Heatmap aus einem frisch gelesenen Feld.
    pub fn heatmap_svg(
        &self,
        engine: &mut dyn SimulationEngine,
        input: HeatmapExport<'_>,
    ) -> ExportResult<Snapshot> {
        let field = lease::read_field(engine, input.molecule)?;
        let frame = HeatmapFrame {
            field: &field,
            family: input.molecule.hue(),
            selection: input.selection,
            tracked: input.tracked,
            iteration: input.iteration,
            time_step: input.time_step,
        };
        let scene = HeatmapRenderer::new(self.heatmap_size as f32)
            .render(&frame)
            .with_title(format!("ECMSim - Iteration {}", input.iteration))
            .with_metadata(format!(
                "Created by ECM Simulation - Iteration {}",
                input.iteration
            ));
        let document = svg::scene_to_svg_string(&scene);
        Ok(self.snapshot(
            ExportTarget::Heatmap,
            ExportFormat::Svg,
            input.iteration,
            document.into_bytes(),
        ))
    }

    /// Raster-Heatmap: die Live-Szene, in Exportgröße gerendert.
    pub fn heatmap_png(&self, live: &Scene, iteration: u64) -> ExportResult<Snapshot> {
        ensure_not_empty(live.width as u32, live.height as u32)?;
        let surface = Surface::from_scene_scaled(live, self.heatmap_size, self.heatmap_size)?;
        let bytes = png::encode(surface.image())?;
        Ok(self.snapshot(ExportTarget::Heatmap, ExportFormat::Png, iteration, bytes))
    }

    pub fn lineplot_svg(&self, tracker: &CellTracker, iteration: u64) -> ExportResult<Snapshot> {
        let scene = self.chart.render(tracker);
        let document = svg::scene_to_svg_string(&scene);
        Ok(self.snapshot(
            ExportTarget::LinePlot,
            ExportFormat::Svg,
            iteration,
            document.into_bytes(),
        ))
    }

    /// Raster-Diagramm: die Live-Fläche unverändert.
    pub fn lineplot_png(&self, live: &Surface, iteration: u64) -> ExportResult<Snapshot> {
        ensure_not_empty(live.width(), live.height())?;
        let bytes = png::encode(live.image())?;
        Ok(self.snapshot(ExportTarget::LinePlot, ExportFormat::Png, iteration, bytes))
    }
}

fn ensure_not_empty(width: u32, height: u32) -> ExportResult<()> {
    if width == 0 || height == 0 {
        return Err(ExportError::EmptySurface { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DiffusionEngine;
    use crate::grid::coords::{GridCell, GridIndex};
    use crate::grid::field::GridField;
    use crate::render::color::Color;
    use crate::render::color_scale::HueFamily;

    fn exporter() -> SnapshotExporter {
        SnapshotExporter::default()
    }

    #[test]
    fn test_file_names_embed_iteration() {
        let e = exporter();
        assert_eq!(
            e.file_name(ExportTarget::Heatmap, ExportFormat::Svg, 17),
            "ecm-heatmap-17-600x600.svg"
        );
        assert_eq!(
            e.file_name(ExportTarget::Heatmap, ExportFormat::Png, 0),
            "ecm-heatmap-0-600x600.png"
        );
        assert_eq!(
            e.file_name(ExportTarget::LinePlot, ExportFormat::Png, 5),
            "ecm-lineplot-5.png"
        );
    }

    #[test]
    fn test_heatmap_svg_has_one_rect_per_cell() {
        let mut engine = DiffusionEngine::with_seed(10, 3);
        engine.initialize_grid().unwrap();
        let mut selection = BrushSelection::new();
        selection.stamp(GridIndex::new(5, 5), 0, 10);
        let mut tracker = CellTracker::new(8, 10);
        tracker.toggle(GridCell::new(2, 2));

        let snapshot = exporter()
            .heatmap_svg(
                &mut engine,
                HeatmapExport {
                    molecule: MoleculeId::primary(0),
                    selection: &selection,
                    tracked: tracker.cells(),
                    iteration: 9,
                    time_step: 0.1,
                },
            )
            .unwrap();
        assert_eq!(snapshot.file_name, "ecm-heatmap-9-600x600.svg");
        assert_eq!(engine.outstanding_handles(), 0);

        let text = String::from_utf8(snapshot.bytes).unwrap();
        // Hintergrund + 100 Zellen + Auswahl (Füllung, Kontur) + 2 Rahmen + Statusblock
        assert_eq!(text.matches("<rect").count(), 1 + 100 + 2 + 2 + 1);
        assert!(text.contains("<title>ECMSim - Iteration 9</title>"));
        assert!(text.contains("<metadata>Created by ECM Simulation - Iteration 9</metadata>"));
        assert!(text.contains("Iteration: 9 | Time: 0.90"));
        assert!(text.contains("class=\"heatmap-cells\""));
        assert!(text.contains("class=\"tracked-cells\""));
    }

    #[test]
    fn test_heatmap_svg_fails_without_ready_engine() {
        let mut engine = DiffusionEngine::with_seed(10, 3);
        let selection = BrushSelection::new();
        let result = exporter().heatmap_svg(
            &mut engine,
            HeatmapExport {
                molecule: MoleculeId::primary(0),
                selection: &selection,
                tracked: &[],
                iteration: 0,
                time_step: 0.1,
            },
        );
        assert!(matches!(result, Err(ExportError::Engine(EngineError::NotReady))));
    }

    fn heatmap_scene(size: f32) -> Scene {
        let field = GridField::from_fn(10, |row, col| (row * 10 + col) as f64 * 0.01);
        let selection = BrushSelection::new();
        let mut tracker = CellTracker::new(8, 10);
        tracker.toggle(GridCell::new(6, 6));
        HeatmapRenderer::new(size)
            .render(&HeatmapFrame {
                field: &field,
                family: HueFamily::Warm,
                selection: &selection,
                tracked: tracker.cells(),
                iteration: 1,
                time_step: 0.1,
            })
    }

    #[test]
    fn test_heatmap_png_contains_status_text() {
        let snapshot = exporter().heatmap_png(&heatmap_scene(500.0), 1).unwrap();
        assert_eq!(snapshot.file_name, "ecm-heatmap-1-600x600.png");
        let decoded = image::load_from_memory(&snapshot.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (600, 600));

        // Statusblock (10,10)-(330,90) bei Faktor 1.2: weiß bis auf die Schrift
        let ink = (14..394)
            .flat_map(|x| (14..106).map(move |y| (x, y)))
            .filter(|&(x, y)| decoded.get_pixel(x, y).0 != [255, 255, 255, 255])
            .count();
        assert!(ink > 100, "only {ink} text pixels in the status block");
    }

    #[test]
    fn test_lineplot_png_contains_labels() {
        let mut tracker = CellTracker::new(8, 10);
        tracker.toggle(GridCell::new(0, 0));
        let e = exporter();
        let chart = Surface::from_scene(&e.chart.render(&tracker)).unwrap();
        let snapshot = e.lineplot_png(&chart, 4).unwrap();
        let decoded = image::load_from_memory(&snapshot.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (700, 300));

        // "1.000" rechtsbündig vor der y-Achse
        assert!(chart.count_differing(0, 28, 38, 46, Color::WHITE) > 10);
        // Legende "Cell 1"
        assert!(chart.count_differing(588, 50, 622, 70, Color::WHITE) > 10);
    }

    #[test]
    fn test_empty_png_exports_fail() {
        let e = exporter();
        assert!(matches!(
            e.heatmap_png(&Scene::new(0.0, 0.0), 4),
            Err(ExportError::EmptySurface { .. })
        ));
        assert!(matches!(
            e.lineplot_png(&Surface::new(0, 0, Color::WHITE), 4),
            Err(ExportError::EmptySurface { .. })
        ));
    }

    #[test]
    fn test_lineplot_svg() {
        let mut tracker = CellTracker::new(8, 10);
        tracker.toggle(GridCell::new(0, 0));
        let snapshot = exporter().lineplot_svg(&tracker, 12).unwrap();
        assert_eq!(snapshot.file_name, "ecm-lineplot-12.svg");
        let text = String::from_utf8(snapshot.bytes).unwrap();
        assert!(text.contains("Cell 1"));
        assert!(text.contains("Iterations"));
    }
}
