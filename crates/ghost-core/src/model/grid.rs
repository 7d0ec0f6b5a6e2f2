use super::cell::Cell;
use core::fmt;

/// Immutable rectangular extent of the board.
///
/// Cells are stored row-major: the linear index of `(col, row)` is
/// `row * cols + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
}

impl Grid {
    pub const STANDARD_ROWS: usize = 9;
    pub const STANDARD_COLS: usize = 12;

    /// The 9×12 board used by the game.
    pub const fn standard() -> Self {
        Self {
            rows: Self::STANDARD_ROWS,
            cols: Self::STANDARD_COLS,
        }
    }

    /// Returns `None` when either dimension is zero or the cell count overflows.
    pub const fn new(rows: usize, cols: usize) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }
        if rows.checked_mul(cols).is_none() {
            return None;
        }
        Some(Self { rows, cols })
    }

    pub const fn rows(self) -> usize {
        self.rows
    }

    pub const fn cols(self) -> usize {
        self.cols
    }

    pub const fn cell_count(self) -> usize {
        self.rows * self.cols
    }

    pub const fn contains(self, cell: Cell) -> bool {
        cell.col < self.cols && cell.row < self.rows
    }

    pub const fn index_of(self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some(cell.row * self.cols + cell.col)
        } else {
            None
        }
    }

    pub const fn cell_at(self, index: usize) -> Option<Cell> {
        if index < self.cell_count() {
            Some(Cell::new(index % self.cols, index / self.cols))
        } else {
            None
        }
    }

    /// Iterates every cell in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        let cols = self.cols;
        (0..self.cell_count()).map(move |index| Cell::new(index % cols, index / cols))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::Grid;
    use crate::model::cell::Cell;

    #[test]
    fn standard_grid_has_108_cells() {
        let grid = Grid::standard();
        assert_eq!(grid.rows(), 9);
        assert_eq!(grid.cols(), 12);
        assert_eq!(grid.cell_count(), 108);
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert!(Grid::new(0, 12).is_none());
        assert!(Grid::new(9, 0).is_none());
        assert!(Grid::new(usize::MAX, 2).is_none());
    }

    #[test]
    fn index_roundtrip() {
        let grid = Grid::standard();
        for (i, cell) in grid.cells().enumerate() {
            assert_eq!(grid.index_of(cell), Some(i));
            assert_eq!(grid.cell_at(i), Some(cell));
        }
        assert_eq!(grid.index_of(Cell::new(5, 4)), Some(53));
    }

    #[test]
    fn out_of_bounds_cells_have_no_index() {
        let grid = Grid::standard();
        assert_eq!(grid.index_of(Cell::new(12, 0)), None);
        assert_eq!(grid.index_of(Cell::new(0, 9)), None);
        assert_eq!(grid.cell_at(108), None);
    }

    #[test]
    fn cells_iterate_row_major() {
        let grid = Grid::new(2, 3).unwrap();
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[2], Cell::new(2, 0));
        assert_eq!(cells[3], Cell::new(0, 1));
        assert_eq!(cells.len(), 6);
    }
}
