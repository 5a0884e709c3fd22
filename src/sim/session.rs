// src/sim/session.rs
//
// Der komplette Sitzungszustand als eine Ressource: Engine-Anbindung, aktives
// Molekül, Pinselauswahl, beobachtete Zellen, Uhr und die Live-Flächen.

use super::pointer::{InteractionModes, PointerAction, PointerEvent, PointerState, SurfaceGeometry};
use crate::config::VisualizerConfig;
use crate::engine::molecules::INPUT_COUNT;
use crate::engine::{
    EngineError, EngineResult, FieldLease, MoleculeId, RateConstants, SimulationEngine, lease,
};
use crate::export::{
    ExportFormat, ExportResult, ExportTarget, HeatmapExport, Snapshot, SnapshotExporter,
};
use crate::grid::{BrushSelection, CellTracker, GridCell, ToggleOutcome, TrackedCell};
use crate::render::{Color, HeatmapFrame, HeatmapRenderer, Scene, Surface, TimeSeriesRenderer};
use bevy::log::{debug, error, info, warn};
use bevy::prelude::Resource;
use std::fmt;

// ===================================================================================
// ENGINE-ANBINDUNG
// ===================================================================================
/// Optionale Engine. Solange keine bereite Engine angebunden ist, sind alle
/// Engine-Aufrufe der Sitzung stille No-ops.
#[derive(Default)]
pub struct EngineLink {
    engine: Option<Box<dyn SimulationEngine>>,
}

impl EngineLink {
    pub fn new(engine: Box<dyn SimulationEngine>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.engine.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.engine.as_ref().is_some_and(|engine| engine.is_ready())
    }

    pub fn grid_size(&self) -> Option<usize> {
        self.engine.as_ref().map(|engine| engine.grid_size())
    }

    /// Die Engine, falls angebunden und bereit.
    pub fn ready_mut(&mut self) -> Option<&mut (dyn SimulationEngine + 'static)> {
        match self.engine.as_deref_mut() {
            Some(engine) if engine.is_ready() => Some(engine),
            _ => None,
        }
    }
}

impl fmt::Debug for EngineLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineLink")
            .field("attached", &self.is_attached())
            .field("ready", &self.is_ready())
            .finish()
    }
}

// ===================================================================================
// LIVE-FLÄCHEN
// ===================================================================================
/// Ergebnis des letzten Redraws. `revision` steigt bei jedem Redraw, der Host
/// lädt die Texturen nur bei einer Änderung neu hoch.
#[derive(Debug, Clone)]
pub struct LiveFrame {
    pub heatmap: Surface,
    /// Quelle des PNG-Exports der Heatmap.
    pub heatmap_scene: Scene,
    pub chart: Surface,
    pub revision: u64,
}

impl LiveFrame {
    fn blank(heatmap_size: u32, chart: &TimeSeriesRenderer) -> Self {
        let size = heatmap_size as f32;
        Self {
            heatmap: Surface::new(heatmap_size, heatmap_size, Color::BLACK),
            heatmap_scene: Scene::new(size, size).with_background(Color::BLACK),
            chart: Surface::new(chart.width as u32, chart.height as u32, Color::WHITE),
            revision: 0,
        }
    }
}

/// Rastert eine Szene; scheitert das, bleibt die Fläche leer und der Fehler im Log.
fn rasterize(scene: &Scene, background: Color) -> Surface {
    Surface::from_scene(scene).unwrap_or_else(|err| {
        error!("Rendering a {}x{} surface failed: {err}", scene.width, scene.height);
        Surface::new(scene.width as u32, scene.height as u32, background)
    })
}

/// Ergebnis von [`Session::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced,
    /// Keine bereite Engine.
    Skipped,
}

// ===================================================================================
// SITZUNG
// ===================================================================================
#[derive(Resource, Debug)]
pub struct Session {
    config: VisualizerConfig,
    engine: EngineLink,
    molecule: MoleculeId,
    selection: BrushSelection,
    tracker: CellTracker,
    iteration: u64,
    time_step: f64,
    rates: RateConstants,
    input_values: [f64; INPUT_COUNT],
    brush_radius: u32,
    modes: InteractionModes,
    pointer: PointerState,
    heatmap: HeatmapRenderer,
    chart: TimeSeriesRenderer,
    exporter: SnapshotExporter,
    live: LiveFrame,
}

impl Session {
    pub fn new(config: VisualizerConfig) -> Self {
        let chart = TimeSeriesRenderer::new(config.chart_width as f32, config.chart_height as f32);
        Self {
            engine: EngineLink::default(),
            molecule: MoleculeId::default(),
            selection: BrushSelection::new(),
            tracker: CellTracker::new(config.tracker_capacity, config.history_len),
            iteration: 0,
            time_step: config.time_step,
            rates: config.rates,
            input_values: [0.0; INPUT_COUNT],
            brush_radius: config.brush_radius,
            modes: InteractionModes::default(),
            pointer: PointerState::Idle,
            heatmap: HeatmapRenderer::new(config.heatmap_size as f32),
            chart,
            exporter: SnapshotExporter::new(config.export_size, chart),
            live: LiveFrame::blank(config.heatmap_size, &chart),
            config,
        }
    }

    /// Bindet eine Engine an. Ein nicht initialisiertes Gitter wird
    /// initialisiert, danach bekommt die Engine Ratenkonstanten und Zeitschritt.
    pub fn attach_engine(&mut self, mut engine: Box<dyn SimulationEngine>) -> EngineResult<()> {
        if !engine.is_ready() {
            engine
                .initialize_grid()
                .inspect_err(|err| error!("Engine initialization failed: {err}"))?;
        }
        engine.set_rate_constants(&self.rates)?;
        engine.set_time_step(self.time_step)?;
        if engine.grid_size() != self.config.grid_size {
            warn!(
                "Engine grid is {0}x{0}, configuration says {1}x{1}; using the engine size.",
                engine.grid_size(),
                self.config.grid_size
            );
        }
        info!("Engine attached ({0}x{0} grid).", engine.grid_size());
        self.engine = EngineLink::new(engine);
        self.redraw()
    }

    // --- Zugriff -------------------------------------------------------------

    pub fn is_ready(&self) -> bool {
        self.engine.is_ready()
    }

    /// Gitterkantenlänge: die der Engine, sonst die konfigurierte.
    pub fn grid_n(&self) -> usize {
        self.engine.grid_size().unwrap_or(self.config.grid_size)
    }

    pub fn molecule(&self) -> MoleculeId {
        self.molecule
    }

    pub fn selection(&self) -> &BrushSelection {
        &self.selection
    }

    pub fn tracker(&self) -> &CellTracker {
        &self.tracker
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn time(&self) -> f64 {
        self.iteration as f64 * self.time_step
    }

    pub fn rates(&self) -> &RateConstants {
        &self.rates
    }

    pub fn input_values(&self) -> &[f64; INPUT_COUNT] {
        &self.input_values
    }

    pub fn brush_radius(&self) -> u32 {
        self.brush_radius
    }

    pub fn modes(&self) -> InteractionModes {
        self.modes
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer
    }

    pub fn live(&self) -> &LiveFrame {
        &self.live
    }

    // --- Simulation ----------------------------------------------------------

    /// Ein Schritt: Overrides neu setzen, Engine rechnen lassen, Uhr weiter,
    /// neu zeichnen.
    pub fn step(&mut self) -> EngineResult<StepOutcome> {
        let Some(engine) = self.engine.ready_mut() else {
            debug!("Step ignored: engine not ready.");
            return Ok(StepOutcome::Skipped);
        };
        push_overrides(engine, &self.selection, &self.input_values)
            .inspect_err(|err| error!("Applying input overrides failed: {err}"))?;
        engine
            .simulate_step(self.time_step)
            .inspect_err(|err| error!("Simulation step failed: {err}"))?;
        self.iteration += 1;
        self.redraw()?;
        Ok(StepOutcome::Advanced)
    }

    /// Setzt Uhr, Auswahl, Eingabewerte und Zeitreihen zurück und
    /// initialisiert das Gitter neu. Beobachtete Zellen bleiben erhalten.
    pub fn reset(&mut self) -> EngineResult<()> {
        let Some(engine) = self.engine.ready_mut() else {
            debug!("Reset ignored: engine not ready.");
            return Ok(());
        };
        engine
            .clear_all_input_overrides()
            .inspect_err(|err| error!("Clearing input overrides failed: {err}"))?;
        // Die Engine hat keine Overrides mehr, die Auswahl folgt sofort
        self.selection.clear();
        self.input_values = [0.0; INPUT_COUNT];
        self.pointer = PointerState::Idle;
        engine
            .initialize_grid()
            .inspect_err(|err| error!("Resetting the engine failed: {err}"))?;

        self.iteration = 0;
        self.tracker.clear_histories();
        info!("Simulation reset.");
        self.redraw()
    }

    /// Liest das aktive Feld frisch, hängt je beobachteter Zelle eine Probe
    /// an und baut Heatmap und Diagramm neu.
    pub fn redraw(&mut self) -> EngineResult<()> {
        let Some(engine) = self.engine.ready_mut() else {
            return Ok(());
        };
        let field = lease::read_field(engine, self.molecule)
            .inspect_err(|err| error!("Reading {} failed: {err}", self.molecule))?;
        self.tracker.record(&field);

        let heatmap_scene = self.heatmap.render(&HeatmapFrame {
            field: &field,
            family: self.molecule.hue(),
            selection: &self.selection,
            tracked: self.tracker.cells(),
            iteration: self.iteration,
            time_step: self.time_step,
        });
        let chart_scene = self.chart.render(&self.tracker);
        self.live = LiveFrame {
            heatmap: rasterize(&heatmap_scene, Color::BLACK),
            heatmap_scene,
            chart: rasterize(&chart_scene, Color::WHITE),
            revision: self.live.revision + 1,
        };
        Ok(())
    }

    /// Löscht alle Overrides der Engine und setzt sie für die aktuelle
    /// Auswahl komplett neu.
    pub fn apply_input_overrides(&mut self) -> EngineResult<()> {
        let Some(engine) = self.engine.ready_mut() else {
            return Ok(());
        };
        push_overrides(engine, &self.selection, &self.input_values)
            .inspect_err(|err| error!("Applying input overrides failed: {err}"))?;
        debug!("Applied input values to {} selected cells.", self.selection.len());
        Ok(())
    }

    // --- Parameter -----------------------------------------------------------

    pub fn set_molecule(&mut self, molecule: MoleculeId) -> EngineResult<()> {
        if !molecule.is_known() {
            return Err(EngineError::UnknownMolecule {
                family: molecule.family,
                index: molecule.index,
            });
        }
        self.molecule = molecule;
        self.redraw()
    }

    /// Übernimmt alle acht Konstanten und schickt sie vollständig an die Engine.
    pub fn set_rate_constants(&mut self, rates: RateConstants) -> EngineResult<()> {
        rates.validate()?;
        self.rates = rates;
        if let Some(engine) = self.engine.ready_mut() {
            engine
                .set_rate_constants(&self.rates)
                .inspect_err(|err| error!("Updating rate constants failed: {err}"))?;
        }
        Ok(())
    }

    pub fn set_time_step(&mut self, dt: f64) -> EngineResult<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(EngineError::InvalidParameter {
                name: "time_step",
                value: dt,
            });
        }
        self.time_step = dt;
        if let Some(engine) = self.engine.ready_mut() {
            engine
                .set_time_step(dt)
                .inspect_err(|err| error!("Updating time step failed: {err}"))?;
        }
        Ok(())
    }

    /// Neuer Wert eines Eingangsmoleküls in [0, 1]; wirkt sofort auf die Auswahl.
    pub fn set_input_value(&mut self, input: usize, value: f64) -> EngineResult<()> {
        let slot = self
            .input_values
            .get_mut(input)
            .ok_or(EngineError::UnknownInput { index: input })?;
        *slot = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
        self.apply_input_overrides()
    }

    pub fn set_brush_radius(&mut self, radius: u32) {
        let range = VisualizerConfig::BRUSH_RADIUS_RANGE;
        self.brush_radius = radius.clamp(*range.start(), *range.end());
    }

    pub fn set_brush_mode(&mut self, enabled: bool) {
        self.modes.brush = enabled;
        if !enabled {
            self.pointer = PointerState::Idle;
        }
    }

    pub fn set_track_mode(&mut self, enabled: bool) {
        self.modes.track = enabled;
    }

    // --- Auswahl & Beobachtung -----------------------------------------------

    /// Leert die Pinselauswahl und entfernt alle Overrides in der Engine.
    pub fn clear_selection(&mut self) -> EngineResult<()> {
        if let Some(engine) = self.engine.ready_mut() {
            engine
                .clear_all_input_overrides()
                .inspect_err(|err| error!("Clearing input overrides failed: {err}"))?;
        }
        self.selection.clear();
        self.redraw()
    }

    pub fn toggle_tracked(&mut self, cell: GridCell) -> EngineResult<ToggleOutcome> {
        let outcome = self.tracker.toggle(cell);
        match outcome {
            ToggleOutcome::Added(color) => debug!("Tracking cell {cell} in {color}."),
            ToggleOutcome::Removed => debug!("Stopped tracking cell {cell}."),
            ToggleOutcome::Full => {
                warn!(
                    "Cell {cell} not tracked: already {} cells tracked.",
                    self.tracker.capacity()
                );
                return Ok(outcome);
            }
        }
        self.redraw()?;
        Ok(outcome)
    }

    pub fn clear_tracked(&mut self) -> EngineResult<()> {
        self.tracker.clear();
        self.redraw()
    }

    /// Aktuelle Werte des aktiven Moleküls an den beobachteten Zellen.
    pub fn tracked_values(&mut self) -> EngineResult<Vec<(TrackedCell, f64)>> {
        let Some(engine) = self.engine.ready_mut() else {
            return Ok(Vec::new());
        };
        let field = FieldLease::acquire(engine, self.molecule)?;
        let mut values = Vec::with_capacity(self.tracker.len());
        for tracked in self.tracker.cells() {
            values.push((*tracked, field.read(tracked.cell.row, tracked.cell.col)?));
        }
        Ok(values)
    }

    /// Schreibt einen Wert des aktiven Moleküls direkt in die Engine.
    pub fn set_cell_concentration(&mut self, cell: GridCell, value: f64) -> EngineResult<()> {
        if !value.is_finite() {
            return Err(EngineError::InvalidParameter {
                name: "concentration",
                value,
            });
        }
        let Some(engine) = self.engine.ready_mut() else {
            return Ok(());
        };
        engine
            .set_cell_concentration(
                self.molecule.family,
                self.molecule.index,
                cell.row,
                cell.col,
                value,
            )
            .inspect_err(|err| error!("Editing cell {cell} failed: {err}"))?;
        self.redraw()
    }

    // --- Zeiger --------------------------------------------------------------

    /// Einziger Eingang für Zeigerereignisse. `surface_width` ist die
    /// angezeigte Breite der Heatmap.
    pub fn dispatch(&mut self, event: PointerEvent, surface_width: f32) -> EngineResult<()> {
        let geometry = SurfaceGeometry {
            width: surface_width,
            grid_n: self.grid_n(),
        };
        let (state, action) = self.pointer.handle(event, self.modes, geometry);
        self.pointer = state;

        match action {
            None => Ok(()),
            Some(PointerAction::Stamp(center)) => {
                let added = self
                    .selection
                    .stamp(center, self.brush_radius, geometry.grid_n);
                if added > 0 { self.redraw() } else { Ok(()) }
            }
            Some(PointerAction::CommitSelection) => self.apply_input_overrides(),
            Some(PointerAction::ToggleTracked(cell)) => self.toggle_tracked(cell).map(|_| ()),
        }
    }

    // --- Export --------------------------------------------------------------

    /// Erzeugt ein Exportdokument. Verändert keinen Live-Zustand.
    /// Ohne bereite Engine gibt es nichts zu exportieren: `Ok(None)`.
    pub fn export(
        &mut self,
        target: ExportTarget,
        format: ExportFormat,
    ) -> ExportResult<Option<Snapshot>> {
        let iteration = self.iteration;
        let Some(engine) = self.engine.ready_mut() else {
            debug!("Export of {target} ignored: engine not ready.");
            return Ok(None);
        };
        let result = match (target, format) {
            (ExportTarget::Heatmap, ExportFormat::Svg) => self.exporter.heatmap_svg(
                engine,
                HeatmapExport {
                    molecule: self.molecule,
                    selection: &self.selection,
                    tracked: self.tracker.cells(),
                    iteration,
                    time_step: self.time_step,
                },
            ),
            (ExportTarget::Heatmap, ExportFormat::Png) => {
                self.exporter.heatmap_png(&self.live.heatmap_scene, iteration)
            }
            (ExportTarget::LinePlot, ExportFormat::Svg) => {
                self.exporter.lineplot_svg(&self.tracker, iteration)
            }
            (ExportTarget::LinePlot, ExportFormat::Png) => {
                self.exporter.lineplot_png(&self.live.chart, iteration)
            }
        };
        result
            .map(Some)
            .inspect_err(|err| error!("Export of {target} failed: {err}"))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(VisualizerConfig::default())
    }
}

/// Overrides immer komplett löschen und neu setzen, nie inkrementell.
fn push_overrides(
    engine: &mut dyn SimulationEngine,
    selection: &BrushSelection,
    values: &[f64; INPUT_COUNT],
) -> EngineResult<()> {
    engine.clear_all_input_overrides()?;
    for cell in selection.iter() {
        for (input, &value) in values.iter().enumerate() {
            engine.set_cell_input_override(input, cell.row, cell.col, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DiffusionEngine, MoleculeFamily};
    use crate::sim::testing::{SpyEngine, small_config};
    use approx::assert_relative_eq;
    use bevy::math::Vec2;

    fn ready_session() -> Session {
        let mut session = Session::new(small_config());
        session
            .attach_engine(Box::new(DiffusionEngine::with_seed(10, 11)))
            .unwrap();
        session
    }

    #[test]
    fn test_everything_is_a_noop_without_engine() {
        let mut session = Session::new(small_config());
        assert!(!session.is_ready());
        assert_eq!(session.step().unwrap(), StepOutcome::Skipped);
        assert!(session.reset().is_ok());
        assert!(session.redraw().is_ok());
        assert!(session.tracked_values().unwrap().is_empty());
        assert!(session.set_cell_concentration(GridCell::new(0, 0), 0.5).is_ok());
        assert_eq!(session.iteration(), 0);
        assert_eq!(session.live().revision, 0);
    }

    #[test]
    fn test_attach_initializes_and_draws() {
        let session = ready_session();
        assert!(session.is_ready());
        assert_eq!(session.live().revision, 1);
        assert_eq!(session.live().heatmap.width(), 100);
        assert_eq!(session.live().chart.width(), 700);
        // Statusblock (10,10)-(330,90) ist gekappt, die Schrift liegt darin
        assert!(session.live().heatmap.count_differing(10, 10, 100, 90, Color::WHITE) > 0);
    }

    #[test]
    fn test_step_advances_clock_and_records_samples() {
        let mut session = ready_session();
        session.toggle_tracked(GridCell::new(3, 3)).unwrap();
        assert_eq!(session.step().unwrap(), StepOutcome::Advanced);
        assert_eq!(session.step().unwrap(), StepOutcome::Advanced);

        assert_eq!(session.iteration(), 2);
        assert_relative_eq!(session.time(), 0.2);
        // Toggle-Redraw + zwei Schritte
        let history = session.tracker().history(GridCell::new(3, 3)).unwrap();
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_brush_paint_commits_overrides_on_release() {
        let (engine, log) = SpyEngine::new(10);
        let mut session = Session::new(small_config());
        session.attach_engine(Box::new(engine)).unwrap();
        session.set_brush_mode(true);
        session.set_brush_radius(1);
        session.set_input_value(2, 0.7).unwrap();

        session
            .dispatch(PointerEvent::Down(Vec2::new(55.0, 55.0)), 100.0)
            .unwrap();
        assert_eq!(session.pointer_state(), PointerState::Painting);
        assert_eq!(session.selection().len(), 5);

        let clears_before = log.lock().unwrap().clears;
        session.dispatch(PointerEvent::Up, 100.0).unwrap();
        assert_eq!(session.pointer_state(), PointerState::Idle);

        let log = log.lock().unwrap();
        assert_eq!(log.clears, clears_before + 1);
        // 5 Zellen x 11 Eingänge, auch Nullwerte
        assert_eq!(log.overrides.len(), 5 * INPUT_COUNT);
        assert!(log
            .overrides
            .iter()
            .any(|&(input, row, col, value)| (input, row, col) == (2, 5, 5) && value == 0.7));
    }

    #[test]
    fn test_step_reapplies_overrides_in_full() {
        let (engine, log) = SpyEngine::new(10);
        let mut session = Session::new(small_config());
        session.attach_engine(Box::new(engine)).unwrap();
        session.set_brush_mode(true);
        session.set_brush_radius(1);
        session
            .dispatch(PointerEvent::Down(Vec2::new(5.0, 5.0)), 100.0)
            .unwrap();
        session.dispatch(PointerEvent::Up, 100.0).unwrap();
        log.lock().unwrap().overrides.clear();

        session.step().unwrap();
        let log = log.lock().unwrap();
        assert_eq!(log.steps, 1);
        // Ecke: Zentrum + rechts + unten
        assert_eq!(log.overrides.len(), 3 * INPUT_COUNT);
    }

    #[test]
    fn test_clear_selection_clears_engine_overrides() {
        let (engine, log) = SpyEngine::new(10);
        let mut session = Session::new(small_config());
        session.attach_engine(Box::new(engine)).unwrap();
        session.set_brush_mode(true);
        session
            .dispatch(PointerEvent::Down(Vec2::new(50.0, 50.0)), 100.0)
            .unwrap();
        let clears_before = log.lock().unwrap().clears;

        session.clear_selection().unwrap();
        assert!(session.selection().is_empty());
        assert_eq!(log.lock().unwrap().clears, clears_before + 1);
    }

    #[test]
    fn test_track_mode_toggles_on_click() {
        let mut session = ready_session();
        session.set_track_mode(true);
        session
            .dispatch(PointerEvent::Click(Vec2::new(15.0, 15.0)), 100.0)
            .unwrap();
        session
            .dispatch(PointerEvent::Click(Vec2::new(25.0, 25.0)), 100.0)
            .unwrap();
        session
            .dispatch(PointerEvent::Click(Vec2::new(15.0, 15.0)), 100.0)
            .unwrap();

        let cells: Vec<_> = session.tracker().cells().iter().map(|t| t.cell).collect();
        assert_eq!(cells, vec![GridCell::new(2, 2)]);
        assert_eq!(
            session.tracker().cells()[0].color,
            crate::grid::tracking::TRACK_PALETTE[1]
        );
    }

    #[test]
    fn test_reset_keeps_tracked_cells_but_empties_histories() {
        let mut session = ready_session();
        session.set_brush_mode(true);
        session
            .dispatch(PointerEvent::Down(Vec2::new(50.0, 50.0)), 100.0)
            .unwrap();
        session.set_input_value(0, 0.4).unwrap();
        session.toggle_tracked(GridCell::new(1, 1)).unwrap();
        session.step().unwrap();

        session.reset().unwrap();
        assert_eq!(session.iteration(), 0);
        assert!(session.selection().is_empty());
        assert_eq!(session.input_values()[0], 0.0);
        assert_eq!(session.tracker().len(), 1);
        // Nur die Probe des Redraws nach dem Reset
        assert_eq!(
            session.tracker().history(GridCell::new(1, 1)).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_parameters_are_validated_and_pushed() {
        let (engine, log) = SpyEngine::new(10);
        let mut session = Session::new(small_config());
        session.attach_engine(Box::new(engine)).unwrap();

        let rates = RateConstants {
            diffusion: 0.5,
            ..RateConstants::default()
        };
        session.set_rate_constants(rates).unwrap();
        session.set_time_step(0.25).unwrap();
        {
            let log = log.lock().unwrap();
            assert_eq!(log.rates, Some(rates));
            assert_eq!(log.time_step, Some(0.25));
        }

        let broken = RateConstants {
            input: -1.0,
            ..RateConstants::default()
        };
        assert!(session.set_rate_constants(broken).is_err());
        assert_eq!(*session.rates(), rates);
        assert!(session.set_time_step(0.0).is_err());
        assert_relative_eq!(session.time_step(), 0.25);
        assert!(matches!(
            session.set_input_value(11, 0.5),
            Err(EngineError::UnknownInput { index: 11 })
        ));
        assert!(session.set_molecule(MoleculeId::feedback(9)).is_err());
    }

    #[test]
    fn test_cell_editor_writes_active_molecule() {
        let mut session = ready_session();
        session.set_molecule(MoleculeId::feedback(1)).unwrap();
        session.toggle_tracked(GridCell::new(4, 6)).unwrap();
        session.set_cell_concentration(GridCell::new(4, 6), 0.8).unwrap();

        let values = session.tracked_values().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].0.cell, GridCell::new(4, 6));
        assert_relative_eq!(values[0].1, 0.8);
        assert_eq!(session.molecule().family, MoleculeFamily::Feedback);
    }

    #[test]
    fn test_exports_leave_live_state_untouched() {
        let mut session = ready_session();
        session.toggle_tracked(GridCell::new(0, 0)).unwrap();
        session.step().unwrap();
        let revision = session.live().revision;
        let samples = session.tracker().history(GridCell::new(0, 0)).unwrap().len();

        for target in [ExportTarget::Heatmap, ExportTarget::LinePlot] {
            for format in [ExportFormat::Svg, ExportFormat::Png] {
                let snapshot = session.export(target, format).unwrap();
                assert!(snapshot.is_some_and(|s| !s.bytes.is_empty()));
            }
        }
        assert_eq!(session.live().revision, revision);
        assert_eq!(
            session.tracker().history(GridCell::new(0, 0)).unwrap().len(),
            samples
        );
    }

    #[test]
    fn test_exports_are_noops_without_engine() {
        let mut session = Session::new(small_config());
        for target in [ExportTarget::Heatmap, ExportTarget::LinePlot] {
            for format in [ExportFormat::Svg, ExportFormat::Png] {
                assert!(matches!(session.export(target, format), Ok(None)));
            }
        }
    }

    #[test]
    fn test_png_exports_carry_text() {
        let config = small_config().with_heatmap_size(500);
        let mut session = Session::new(config);
        session
            .attach_engine(Box::new(DiffusionEngine::with_seed(10, 11)))
            .unwrap();
        session.toggle_tracked(GridCell::new(5, 5)).unwrap();
        session.step().unwrap();

        let heatmap = session
            .export(ExportTarget::Heatmap, ExportFormat::Png)
            .unwrap()
            .unwrap();
        let decoded = image::load_from_memory(&heatmap.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (600, 600));
        let ink = (14..394)
            .flat_map(|x| (14..106).map(move |y| (x, y)))
            .filter(|&(x, y)| decoded.get_pixel(x, y).0 != [255, 255, 255, 255])
            .count();
        assert!(ink > 100, "status block holds only {ink} dark pixels");

        let chart = session
            .export(ExportTarget::LinePlot, ExportFormat::Png)
            .unwrap()
            .unwrap();
        let decoded = image::load_from_memory(&chart.bytes).unwrap().to_rgba8();
        let label_ink = (0..38)
            .flat_map(|x| (28..46).map(move |y| (x, y)))
            .filter(|&(x, y)| decoded.get_pixel(x, y).0 != [255, 255, 255, 255])
            .count();
        assert!(label_ink > 10, "max label holds only {label_ink} dark pixels");
    }

    #[test]
    fn test_failed_clear_keeps_selection() {
        let (engine, log) = SpyEngine::new(10);
        let mut session = Session::new(small_config());
        session.attach_engine(Box::new(engine)).unwrap();
        session.set_brush_mode(true);
        session
            .dispatch(PointerEvent::Down(Vec2::new(50.0, 50.0)), 100.0)
            .unwrap();
        session.dispatch(PointerEvent::Up, 100.0).unwrap();
        let selected = session.selection().len();
        assert!(selected > 0);

        log.lock().unwrap().fail_clears = true;
        assert!(session.clear_selection().is_err());
        assert_eq!(session.selection().len(), selected);
    }

    #[test]
    fn test_failed_reset_leaves_selection_matching_engine() {
        let (engine, log) = SpyEngine::new(10);
        let mut session = Session::new(small_config());
        session.attach_engine(Box::new(engine)).unwrap();
        session.set_brush_mode(true);
        session
            .dispatch(PointerEvent::Down(Vec2::new(50.0, 50.0)), 100.0)
            .unwrap();
        session.set_input_value(3, 0.9).unwrap();
        session.step().unwrap();

        log.lock().unwrap().fail_initialize = true;
        assert!(session.reset().is_err());
        // Overrides sind gelöscht, also auch Auswahl und Eingabewerte
        assert!(session.selection().is_empty());
        assert_eq!(session.input_values()[3], 0.0);
        // Das Gitter wurde nicht neu aufgesetzt, die Uhr läuft weiter
        assert_eq!(session.iteration(), 1);
    }
}
