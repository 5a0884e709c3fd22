// src/engine/mod.rs
//
// Schmale numerische Schnittstelle zur externen Simulations-Engine.

pub mod diffusion;
pub mod lease;
pub mod molecules;

pub use diffusion::DiffusionEngine;
pub use lease::FieldLease;
pub use molecules::{MoleculeFamily, MoleculeId};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Engine is not ready (grid not initialized)")]
    NotReady,

    #[error("Unknown molecule: {family} index {index}")]
    UnknownMolecule { family: MoleculeFamily, index: usize },

    #[error("Unknown input molecule index {index}")]
    UnknownInput { index: usize },

    #[error("Cell ({row},{col}) outside of {size}x{size} grid")]
    CellOutOfRange { row: usize, col: usize, size: usize },

    #[error("Invalid or released field handle {0:?}")]
    InvalidHandle(FieldHandle),

    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Simulation step failed: {reason}")]
    StepFailed { reason: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Undurchsichtiger Verweis auf eine Feldkopie in der Engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldHandle(pub u64);

/// Ratenkonstanten k1..k8 der Engine. Werden nur vom Benutzer geändert
/// und bei jeder Änderung vollständig an die Engine geschickt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConstants {
    pub input: f64,
    pub feedback: f64,
    pub degradation: f64,
    pub receptor: f64,
    pub inhibition: f64,
    pub activation: f64,
    pub production: f64,
    pub diffusion: f64,
}

impl Default for RateConstants {
    fn default() -> Self {
        Self {
            input: 1.0,
            feedback: 0.5,
            degradation: 0.1,
            receptor: 2.0,
            inhibition: 0.5,
            activation: 1.0,
            production: 0.01,
            diffusion: 0.2,
        }
    }
}

impl RateConstants {
    pub const NAMES: [&'static str; 8] = [
        "input",
        "feedback",
        "degradation",
        "receptor",
        "inhibition",
        "activation",
        "production",
        "diffusion",
    ];

    /// Reglerbereiche in Reihenfolge k1..k8.
    pub const RANGES: [std::ops::RangeInclusive<f64>; 8] = [
        0.1..=5.0,
        0.1..=5.0,
        0.01..=1.0,
        0.1..=5.0,
        0.1..=5.0,
        0.1..=5.0,
        0.001..=0.1,
        0.01..=1.0,
    ];

    /// Reihenfolge k1..k8.
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.input,
            self.feedback,
            self.degradation,
            self.receptor,
            self.inhibition,
            self.activation,
            self.production,
            self.diffusion,
        ]
    }

    /// Veränderlicher Zugriff in Reihenfolge k1..k8 (für die Regler).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&'static str, &mut f64)> {
        Self::NAMES.into_iter().zip([
            &mut self.input,
            &mut self.feedback,
            &mut self.degradation,
            &mut self.receptor,
            &mut self.inhibition,
            &mut self.activation,
            &mut self.production,
            &mut self.diffusion,
        ])
    }

    /// Alle Konstanten müssen endlich und positiv sein.
    pub fn validate(&self) -> EngineResult<()> {
        for (name, value) in Self::NAMES.into_iter().zip(self.as_array()) {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Die Engine-Oberfläche, wie sie die Visualisierung sieht.
///
/// Feldlesezugriffe laufen über Handles: `acquire_field` liefert eine Kopie des
/// aktuellen Feldes, `read_value` liest daraus, `release_handle` gibt sie frei.
/// Außerhalb von Tests sollte statt der rohen Methoden [`FieldLease`] benutzt
/// werden, das die Freigabe garantiert.
pub trait SimulationEngine: Send + Sync {
    /// `true`, sobald das Gitter initialisiert ist.
    fn is_ready(&self) -> bool;

    fn grid_size(&self) -> usize;

    fn initialize_grid(&mut self) -> EngineResult<()>;

    fn acquire_field(&mut self, molecule: MoleculeId) -> EngineResult<FieldHandle>;

    fn read_value(&self, handle: FieldHandle, row: usize, col: usize) -> EngineResult<f64>;

    fn release_handle(&mut self, handle: FieldHandle) -> EngineResult<()>;

    fn set_rate_constants(&mut self, rates: &RateConstants) -> EngineResult<()>;

    fn set_time_step(&mut self, dt: f64) -> EngineResult<()>;

    fn simulate_step(&mut self, dt: f64) -> EngineResult<()>;

    fn set_cell_input_override(
        &mut self,
        input_index: usize,
        row: usize,
        col: usize,
        value: f64,
    ) -> EngineResult<()>;

    fn clear_all_input_overrides(&mut self) -> EngineResult<()>;

    fn set_cell_concentration(
        &mut self,
        family: MoleculeFamily,
        index: usize,
        row: usize,
        col: usize,
        value: f64,
    ) -> EngineResult<()>;
}
