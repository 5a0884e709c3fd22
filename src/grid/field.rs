// src/grid/field.rs

use super::coords::GridCell;

/// Trait für ein quadratisches, zweidimensionales Skalarfeld.
/// Ermöglicht es Farbskala und Renderern, auf verschiedenen
/// Feldimplementierungen zu operieren.
pub trait ScalarField2D {
    /// Kantenlänge N des Feldes in Zellen.
    fn size(&self) -> usize;

    /// Skalarwert an (row, col). Indizes sind 0-basiert und liegen in `[0, N)`.
    fn value(&self, row: usize, col: usize) -> f64;

    /// Alle Werte zeilenweise (row-major).
    fn values(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        let n = self.size();
        Box::new((0..n * n).map(move |i| self.value(i / n, i % n)))
    }
}

/// Momentaufnahme des Konzentrationsfeldes eines Moleküls.
/// Speicherung zeilenweise (row-major). Wird pro Refresh frisch von der
/// Engine gelesen und von der Visualisierung nie verändert.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    size: usize,
    data: Vec<f64>,
}

impl GridField {
    /// Feld der Größe N x N, überall 0.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    /// Übernimmt zeilenweise Daten. `None`, wenn die Länge nicht `size * size` ist.
    pub fn from_vec(size: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == size * size).then_some(Self { size, data })
    }

    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                data.push(f(row, col));
            }
        }
        Self { size, data }
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    pub fn get(&self, cell: GridCell) -> Option<f64> {
        (cell.row < self.size && cell.col < self.size).then(|| self.data[self.idx(cell.row, cell.col)])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl ScalarField2D for GridField {
    fn size(&self) -> usize {
        self.size
    }

    fn value(&self, row: usize, col: usize) -> f64 {
        self.data[self.idx(row, col)]
    }

    fn values(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        Box::new(self.data.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_is_row_major() {
        let field = GridField::from_fn(3, |row, col| (row * 10 + col) as f64);
        assert_eq!(field.as_slice()[5], 12.0);
        assert_eq!(field.value(2, 1), 21.0);
        assert_eq!(field.get(GridCell::new(1, 2)), Some(12.0));
        assert_eq!(field.get(GridCell::new(3, 0)), None);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(GridField::from_vec(2, vec![0.0; 4]).is_some());
        assert!(GridField::from_vec(2, vec![0.0; 5]).is_none());
    }
}
