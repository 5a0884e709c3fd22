// src/engine/lease.rs

use super::{EngineResult, FieldHandle, MoleculeId, SimulationEngine};
use crate::grid::field::GridField;
use bevy::log::error;

/// Bereichsgebundener Lesezugriff auf ein Engine-Feld.
///
/// Das Handle wird beim Drop freigegeben, auch wenn das Lesen vorher mit `?`
/// abgebrochen wurde.
pub struct FieldLease<'a> {
    engine: &'a mut dyn SimulationEngine,
    handle: FieldHandle,
    molecule: MoleculeId,
}

impl<'a> FieldLease<'a> {
    pub fn acquire(engine: &'a mut dyn SimulationEngine, molecule: MoleculeId) -> EngineResult<Self> {
        let handle = engine.acquire_field(molecule)?;
        Ok(Self {
            engine,
            handle,
            molecule,
        })
    }

    pub fn read(&self, row: usize, col: usize) -> EngineResult<f64> {
        self.engine.read_value(self.handle, row, col)
    }

    /// Liest das komplette N x N Feld.
    pub fn read_field(&self) -> EngineResult<GridField> {
        let n = self.engine.grid_size();
        let mut data = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                data.push(self.read(row, col)?);
            }
        }
        Ok(GridField::from_vec(n, data).unwrap_or_else(|| GridField::zeros(n)))
    }
}

impl Drop for FieldLease<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.engine.release_handle(self.handle) {
            error!("Failed to release field handle for {}: {}", self.molecule, err);
        }
    }
}

/// Liest das aktuelle Feld eines Moleküls in einem Zug.
pub fn read_field(engine: &mut dyn SimulationEngine, molecule: MoleculeId) -> EngineResult<GridField> {
    FieldLease::acquire(engine, molecule)?.read_field()
}
