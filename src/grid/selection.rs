// src/grid/selection.rs

use super::coords::{GridCell, GridIndex};
use std::collections::BTreeSet;

/// Pinsel-Auswahl für die Eingabemoleküle.
///
/// Wächst nur durch [`BrushSelection::stamp`]; schrumpfen kann sie ausschließlich
/// über [`BrushSelection::clear`]. Geordnet gespeichert, damit Overlays und
/// Engine-Overrides immer in derselben Reihenfolge erzeugt werden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrushSelection {
    cells: BTreeSet<GridCell>,
}

impl BrushSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stempelt eine diskrete Kreisscheibe um `center` in die Auswahl.
    ///
    /// Aufgenommen wird jeder Offset (dx, dy) aus `[-radius, radius]²` mit
    /// `sqrt(dx² + dy²) <= radius`, sofern die Zielzelle im Gitter liegt.
    /// Das Zentrum selbst darf außerhalb liegen. Gibt die Anzahl neu
    /// hinzugekommener Zellen zurück.
    pub fn stamp(&mut self, center: GridIndex, radius: u32, grid_n: usize) -> usize {
        let r = radius as i64;
        let before = self.cells.len();
        for dy in -r..=r {
            for dx in -r..=r {
                let distance = ((dx * dx + dy * dy) as f64).sqrt();
                if distance > radius as f64 {
                    continue;
                }
                if let Some(cell) = center.offset(dy, dx).to_cell(grid_n) {
                    self.cells.insert(cell);
                }
            }
        }
        self.cells.len() - before
    }

    /// Leert die Auswahl. Die Engine-Overrides räumt die Session auf.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells.iter().copied()
    }
}
