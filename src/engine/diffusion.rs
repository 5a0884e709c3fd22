// src/engine/diffusion.rs
//
// Einfache Reaktions-Diffusions-Engine als Datenquelle für Host und Tests.
// Die Numerik ist bewusst grob (explizites Euler, 8er-Nachbarschaft, periodischer Rand).

use super::molecules::{FEEDBACK_MOLECULES, INPUT_COUNT, MoleculeFamily, MoleculeId, PRIMARY_MOLECULES};
use super::{EngineError, EngineResult, FieldHandle, RateConstants, SimulationEngine};
use crate::grid::coords::GridCell;
use bevy::log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

/// Feedback-Molekül -> treibender Eingang (Index in `INPUT_MOLECULES`).
const FEEDBACK_DRIVERS: [usize; 4] = [1, 0, 3, 8];
/// Primäre Moleküle diffundieren mit diesem Anteil der Feedback-Rate.
const PRIMARY_DIFFUSION_SHARE: f64 = 0.2;

pub struct DiffusionEngine {
    size: usize,
    seed: u64,
    rng: StdRng,
    ready: bool,
    primary: Vec<Vec<f64>>,
    feedback: Vec<Vec<f64>>,
    inputs: Vec<Vec<f64>>,
    overridden: HashSet<GridCell>,
    rates: RateConstants,
    time_step: f64,
    handles: HashMap<FieldHandle, Vec<f64>>,
    next_handle: u64,
}

impl DiffusionEngine {
    pub fn new(size: usize) -> Self {
        Self::with_seed(size, rand::random::<u64>())
    }

    pub fn with_seed(size: usize, seed: u64) -> Self {
        let layer = || vec![0.0; size * size];
        Self {
            size,
            seed,
            rng: StdRng::seed_from_u64(seed),
            ready: false,
            primary: (0..PRIMARY_MOLECULES.len()).map(|_| layer()).collect(),
            feedback: (0..FEEDBACK_MOLECULES.len()).map(|_| layer()).collect(),
            inputs: (0..INPUT_COUNT).map(|_| layer()).collect(),
            overridden: HashSet::new(),
            rates: RateConstants::default(),
            time_step: 0.1,
            handles: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Anzahl noch nicht freigegebener Handles.
    pub fn outstanding_handles(&self) -> usize {
        self.handles.len()
    }

    /// Zellen mit mindestens einem gesetzten Eingabe-Override.
    pub fn override_count(&self) -> usize {
        self.overridden.len()
    }

    /// Aktueller Eingabewert einer Zelle (mit Override).
    pub fn input_value(&self, input_index: usize, row: usize, col: usize) -> Option<f64> {
        let idx = self.index(row, col).ok()?;
        self.inputs.get(input_index).map(|layer| layer[idx])
    }

    fn index(&self, row: usize, col: usize) -> EngineResult<usize> {
        if row < self.size && col < self.size {
            Ok(row * self.size + col)
        } else {
            Err(EngineError::CellOutOfRange {
                row,
                col,
                size: self.size,
            })
        }
    }

    fn ensure_ready(&self) -> EngineResult<()> {
        if self.ready { Ok(()) } else { Err(EngineError::NotReady) }
    }

    fn layer(&self, molecule: MoleculeId) -> EngineResult<&Vec<f64>> {
        let layers = match molecule.family {
            MoleculeFamily::Primary => &self.primary,
            MoleculeFamily::Feedback => &self.feedback,
        };
        layers.get(molecule.index).ok_or(EngineError::UnknownMolecule {
            family: molecule.family,
            index: molecule.index,
        })
    }

    fn layer_mut(&mut self, molecule: MoleculeId) -> EngineResult<&mut Vec<f64>> {
        let layers = match molecule.family {
            MoleculeFamily::Primary => &mut self.primary,
            MoleculeFamily::Feedback => &mut self.feedback,
        };
        layers.get_mut(molecule.index).ok_or(EngineError::UnknownMolecule {
            family: molecule.family,
            index: molecule.index,
        })
    }

    /// Lokale Reaktionen pro Zelle.
    fn react(&mut self, dt: f64) {
        let k = self.rates;
        let cells = self.size * self.size;
        for idx in 0..cells {
            for (fb, driver) in FEEDBACK_DRIVERS.iter().enumerate() {
                let input = self.inputs[*driver][idx];
                let value = self.feedback[fb][idx];
                let rate = k.input * input + k.feedback * k.receptor * input * (1.0 - value)
                    - k.degradation * value;
                self.feedback[fb][idx] = (value + rate * dt).clamp(0.0, 1.0);
            }

            let drive = self.feedback.iter().map(|layer| layer[idx]).sum::<f64>()
                / self.feedback.len() as f64;
            for layer in &mut self.primary {
                let value = layer[idx];
                let rate = k.production * (k.activation * drive - k.inhibition * value)
                    - k.degradation * k.production * value;
                layer[idx] = (value + rate * dt).clamp(0.0, 1.0);
            }
        }
    }

    /// Diskreter Laplace-Operator über alle 8 Nachbarn, periodischer Rand.
    fn diffuse(size: usize, layer: &mut [f64], rate: f64, dt: f64) {
        let previous = layer.to_vec();
        let n = size as i64;
        for row in 0..n {
            for col in 0..n {
                let center = previous[(row * n + col) as usize];
                let mut laplacian = 0.0;
                for dr in -1..=1 {
                    for dc in -1..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let r = (row + dr).rem_euclid(n);
                        let c = (col + dc).rem_euclid(n);
                        laplacian += previous[(r * n + c) as usize] - center;
                    }
                }
                let idx = (row * n + col) as usize;
                layer[idx] = (center + rate * laplacian * dt).clamp(0.0, 1.0);
            }
        }
    }
}

impl SimulationEngine for DiffusionEngine {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn grid_size(&self) -> usize {
        self.size
    }

    fn initialize_grid(&mut self) -> EngineResult<()> {
        for layer in &mut self.primary {
            for value in layer.iter_mut() {
                *value = self.rng.random_range(0..10) as f64 / 10.0;
            }
        }
        for layer in self.feedback.iter_mut().chain(self.inputs.iter_mut()) {
            layer.fill(0.0);
        }
        self.overridden.clear();
        self.ready = true;
        debug!("Diffusion engine initialized: {0}x{0} grid", self.size);
        Ok(())
    }

    fn acquire_field(&mut self, molecule: MoleculeId) -> EngineResult<FieldHandle> {
        self.ensure_ready()?;
        let snapshot = self.layer(molecule)?.clone();
        let handle = FieldHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle, snapshot);
        Ok(handle)
    }

    fn read_value(&self, handle: FieldHandle, row: usize, col: usize) -> EngineResult<f64> {
        let idx = self.index(row, col)?;
        self.handles
            .get(&handle)
            .map(|data| data[idx])
            .ok_or(EngineError::InvalidHandle(handle))
    }

    fn release_handle(&mut self, handle: FieldHandle) -> EngineResult<()> {
        self.handles
            .remove(&handle)
            .map(|_| ())
            .ok_or(EngineError::InvalidHandle(handle))
    }

    fn set_rate_constants(&mut self, rates: &RateConstants) -> EngineResult<()> {
        rates.validate()?;
        self.rates = *rates;
        Ok(())
    }

    fn set_time_step(&mut self, dt: f64) -> EngineResult<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(EngineError::InvalidParameter {
                name: "time_step",
                value: dt,
            });
        }
        self.time_step = dt;
        Ok(())
    }

    fn simulate_step(&mut self, dt: f64) -> EngineResult<()> {
        self.ensure_ready()?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(EngineError::StepFailed {
                reason: format!("invalid time step {dt}"),
            });
        }
        self.react(dt);
        let size = self.size;
        let fb_rate = self.rates.diffusion;
        for layer in &mut self.feedback {
            Self::diffuse(size, layer, fb_rate, dt);
        }
        for layer in &mut self.primary {
            Self::diffuse(size, layer, fb_rate * PRIMARY_DIFFUSION_SHARE, dt);
        }
        Ok(())
    }

    fn set_cell_input_override(
        &mut self,
        input_index: usize,
        row: usize,
        col: usize,
        value: f64,
    ) -> EngineResult<()> {
        self.ensure_ready()?;
        let idx = self.index(row, col)?;
        let layer = self
            .inputs
            .get_mut(input_index)
            .ok_or(EngineError::UnknownInput { index: input_index })?;
        layer[idx] = value.clamp(0.0, 1.0);
        self.overridden.insert(GridCell::new(row, col));
        Ok(())
    }

    fn clear_all_input_overrides(&mut self) -> EngineResult<()> {
        self.ensure_ready()?;
        for layer in &mut self.inputs {
            layer.fill(0.0);
        }
        self.overridden.clear();
        Ok(())
    }

    fn set_cell_concentration(
        &mut self,
        family: MoleculeFamily,
        index: usize,
        row: usize,
        col: usize,
        value: f64,
    ) -> EngineResult<()> {
        self.ensure_ready()?;
        let idx = self.index(row, col)?;
        let layer = self.layer_mut(MoleculeId { family, index })?;
        layer[idx] = value.clamp(0.0, 1.0);
        Ok(())
    }
}
