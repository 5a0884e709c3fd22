// src/grid/coords.rs

use bevy::math::{Rect, Vec2};

/// Eine Gitterzelle innerhalb der Gittergrenzen (0 <= row, col < N).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl GridCell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Roher Gitterindex, wie ihn der Mapper liefert.
/// Darf negativ oder >= N sein; Aufrufer filtern mit [`GridIndex::to_cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub row: i64,
    pub col: i64,
}

impl GridIndex {
    pub const fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }

    /// Liefert die Zelle nur, wenn beide Achsen in `[0, grid_n)` liegen.
    pub fn to_cell(self, grid_n: usize) -> Option<GridCell> {
        let n = grid_n as i64;
        if (0..n).contains(&self.row) && (0..n).contains(&self.col) {
            Some(GridCell::new(self.row as usize, self.col as usize))
        } else {
            None
        }
    }

    /// Verschiebt den Index um (dy, dx) ohne Begrenzung.
    pub fn offset(self, dy: i64, dx: i64) -> Self {
        Self::new(self.row + dy, self.col + dx)
    }
}

impl From<GridCell> for GridIndex {
    fn from(cell: GridCell) -> Self {
        Self::new(cell.row as i64, cell.col as i64)
    }
}

/// Rechnet Pointer-Koordinaten in einen Gitterindex um.
///
/// `surface_width` ist die *angezeigte* Breite der Fläche. Ist die Anzeige
/// skaliert (z.B. 500px Anzeige für einen 600px Puffer), muss der Aufrufer die
/// Anzeigebreite übergeben, nicht die Pufferbreite. Keine Begrenzung, keine
/// Seiteneffekte.
pub fn to_grid(pixel_x: f32, pixel_y: f32, surface_width: f32, grid_n: usize) -> GridIndex {
    let cell = surface_width / grid_n as f32;
    GridIndex::new(
        (pixel_y / cell).floor() as i64,
        (pixel_x / cell).floor() as i64,
    )
}

/// Pixel-Rechteck einer Zelle auf einer quadratischen Fläche der Kantenlänge `surface_size`.
pub fn cell_rect(cell: GridCell, surface_size: f32, grid_n: usize) -> Rect {
    let size = surface_size / grid_n as f32;
    let min = Vec2::new(cell.col as f32 * size, cell.row as f32 * size);
    Rect::from_corners(min, min + Vec2::splat(size))
}
