// src/sim/testing.rs
//
// Test-Engine, die alle Aufrufe mitschreibt und an die Diffusions-Engine weiterreicht.

use crate::config::VisualizerConfig;
use crate::engine::{
    DiffusionEngine, EngineError, EngineResult, FieldHandle, MoleculeFamily, MoleculeId,
    RateConstants, SimulationEngine,
};
use std::sync::{Arc, Mutex};

pub fn small_config() -> VisualizerConfig {
    VisualizerConfig::default()
        .with_grid_size(10)
        .with_heatmap_size(100)
        .with_seed(1)
}

#[derive(Debug, Default)]
pub struct SpyLog {
    pub clears: usize,
    pub overrides: Vec<(usize, usize, usize, f64)>,
    pub steps: usize,
    pub rates: Option<RateConstants>,
    pub time_step: Option<f64>,
    /// Wenn gesetzt, schlägt jeder Schritt fehl.
    pub fail_steps: bool,
    pub fail_clears: bool,
    pub fail_initialize: bool,
}

pub struct SpyEngine {
    inner: DiffusionEngine,
    log: Arc<Mutex<SpyLog>>,
}

impl SpyEngine {
    pub fn new(size: usize) -> (Self, Arc<Mutex<SpyLog>>) {
        let log = Arc::new(Mutex::new(SpyLog::default()));
        let engine = Self {
            inner: DiffusionEngine::with_seed(size, 5),
            log: Arc::clone(&log),
        };
        (engine, log)
    }

    fn log(&self) -> std::sync::MutexGuard<'_, SpyLog> {
        self.log.lock().unwrap()
    }
}

impl SimulationEngine for SpyEngine {
    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    fn grid_size(&self) -> usize {
        self.inner.grid_size()
    }

    fn initialize_grid(&mut self) -> EngineResult<()> {
        if self.log().fail_initialize {
            return Err(EngineError::StepFailed {
                reason: "injected initialization failure".to_string(),
            });
        }
        self.inner.initialize_grid()
    }

    fn acquire_field(&mut self, molecule: MoleculeId) -> EngineResult<FieldHandle> {
        self.inner.acquire_field(molecule)
    }

    fn read_value(&self, handle: FieldHandle, row: usize, col: usize) -> EngineResult<f64> {
        self.inner.read_value(handle, row, col)
    }

    fn release_handle(&mut self, handle: FieldHandle) -> EngineResult<()> {
        self.inner.release_handle(handle)
    }

    fn set_rate_constants(&mut self, rates: &RateConstants) -> EngineResult<()> {
        self.log().rates = Some(*rates);
        self.inner.set_rate_constants(rates)
    }

    fn set_time_step(&mut self, dt: f64) -> EngineResult<()> {
        self.log().time_step = Some(dt);
        self.inner.set_time_step(dt)
    }

    fn simulate_step(&mut self, dt: f64) -> EngineResult<()> {
        if self.log().fail_steps {
            return Err(EngineError::StepFailed {
                reason: "injected failure".to_string(),
            });
        }
        self.log().steps += 1;
        self.inner.simulate_step(dt)
    }

    fn set_cell_input_override(
        &mut self,
        input_index: usize,
        row: usize,
        col: usize,
        value: f64,
    ) -> EngineResult<()> {
        self.log().overrides.push((input_index, row, col, value));
        self.inner.set_cell_input_override(input_index, row, col, value)
    }

    fn clear_all_input_overrides(&mut self) -> EngineResult<()> {
        if self.log().fail_clears {
            return Err(EngineError::StepFailed {
                reason: "injected clear failure".to_string(),
            });
        }
        self.log().clears += 1;
        self.inner.clear_all_input_overrides()
    }

    fn set_cell_concentration(
        &mut self,
        family: MoleculeFamily,
        index: usize,
        row: usize,
        col: usize,
        value: f64,
    ) -> EngineResult<()> {
        self.inner
            .set_cell_concentration(family, index, row, col, value)
    }
}
