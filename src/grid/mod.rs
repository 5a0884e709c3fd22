// src/grid/mod.rs
pub mod coords;
pub mod field;
pub mod selection;
pub mod tracking;

pub use coords::{GridCell, GridIndex, cell_rect, to_grid};
pub use field::{GridField, ScalarField2D};
pub use selection::BrushSelection;
pub use tracking::{CellTracker, TimeSeriesBuffer, ToggleOutcome, TrackedCell};
