// src/grid/tracking.rs

use super::coords::GridCell;
use super::field::GridField;
use crate::render::color::Color;
use std::collections::{HashMap, VecDeque};

/// Farbenblind-sichere Palette (Wong, Nature Methods 2011).
pub const TRACK_PALETTE: [Color; 8] = [
    Color::rgb(0x00, 0x72, 0xB2),
    Color::rgb(0xD5, 0x5E, 0x00),
    Color::rgb(0x00, 0x9E, 0x73),
    Color::rgb(0xCC, 0x79, 0xA7),
    Color::rgb(0xE6, 0x9F, 0x00),
    Color::rgb(0x56, 0xB4, 0xE9),
    Color::rgb(0xF0, 0xE4, 0x42),
    Color::rgb(0x00, 0x00, 0x00),
];

/// Harte Obergrenze, unabhängig von der Konfiguration.
pub const MAX_TRACKED_CELLS: usize = TRACK_PALETTE.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedCell {
    pub cell: GridCell,
    pub color: Color,
}

/// Zeitreihe einer beobachteten Zelle, älteste Probe zuerst.
/// Beim Anhängen an der Kapazitätsgrenze fällt die älteste Probe heraus (FIFO).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl TimeSeriesBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::max)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Ergebnis von [`CellTracker::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added(Color),
    Removed,
    /// Liste voll, Klick ignoriert.
    Full,
}

/// Geordnete Liste beobachteter Zellen plus je eine Zeitreihe.
#[derive(Debug, Clone)]
pub struct CellTracker {
    cells: Vec<TrackedCell>,
    histories: HashMap<GridCell, TimeSeriesBuffer>,
    capacity: usize,
    history_len: usize,
}

impl CellTracker {
    /// `capacity` wird auf die Palettengröße begrenzt.
    pub fn new(capacity: usize, history_len: usize) -> Self {
        Self {
            cells: Vec::new(),
            histories: HashMap::new(),
            capacity: capacity.min(MAX_TRACKED_CELLS),
            history_len,
        }
    }

    /// Entfernt die Zelle, falls sie schon beobachtet wird, sonst wird sie
    /// angehängt. Die Farbe ist `palette[len]`: freigewordene Slots werden
    /// nicht wiederverwendet, maßgeblich ist nur die aktuelle Länge.
    pub fn toggle(&mut self, cell: GridCell) -> ToggleOutcome {
        if let Some(pos) = self.cells.iter().position(|t| t.cell == cell) {
            self.cells.remove(pos);
            self.histories.remove(&cell);
            return ToggleOutcome::Removed;
        }
        if self.cells.len() >= self.capacity {
            return ToggleOutcome::Full;
        }
        let color = TRACK_PALETTE[self.cells.len()];
        self.cells.push(TrackedCell { cell, color });
        self.histories
            .insert(cell, TimeSeriesBuffer::new(self.history_len));
        ToggleOutcome::Added(color)
    }

    /// Leert Liste und alle Zeitreihen.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.histories.clear();
    }

    /// Leert nur die Zeitreihen; die Zellen bleiben beobachtet (Simulations-Reset).
    pub fn clear_histories(&mut self) {
        for buffer in self.histories.values_mut() {
            buffer.clear();
        }
    }

    /// Hängt für jede beobachtete Zelle den aktuellen Feldwert an.
    pub fn record(&mut self, field: &GridField) {
        for tracked in &self.cells {
            let value = field.get(tracked.cell).unwrap_or(0.0);
            self.histories
                .entry(tracked.cell)
                .or_insert_with(|| TimeSeriesBuffer::new(self.history_len))
                .push(value);
        }
    }

    pub fn cells(&self) -> &[TrackedCell] {
        &self.cells
    }

    pub fn history(&self, cell: GridCell) -> Option<&TimeSeriesBuffer> {
        self.histories.get(&cell)
    }

    /// Zellen in Listenreihenfolge mit ihrer Zeitreihe.
    pub fn series(&self) -> impl Iterator<Item = (&TrackedCell, Option<&TimeSeriesBuffer>)> + '_ {
        self.cells
            .iter()
            .map(|tracked| (tracked, self.histories.get(&tracked.cell)))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }
}
