//! Board module - manages the game grid
//!
//! The board is a rows x cols grid where each cell can be empty or filled
//! with a piece kind. Uses flat row-major storage for cache locality.
//! Coordinates: (row, col) where row 0 is the top and col 0 is the left.
//! Negative rows are the hidden area above the board where freshly spawned
//! pieces may briefly live.

use arrayvec::ArrayVec;

use pose_tetris_types::{Cell, PieceKind};

/// The game grid using flat row-major storage (row * cols + col).
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "board dimensions must be non-zero");
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Calculate flat index from (row, col) coordinates
    #[inline(always)]
    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || row >= self.rows as i32 || col < 0 || col >= self.cols as i32 {
            return None;
        }
        Some(row as usize * self.cols + col as usize)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get cell at (row, col). Returns None if out of bounds.
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        self.index(row, col).map(|idx| self.cells[idx])
    }

    /// Set cell at (row, col). Returns false if out of bounds.
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        match self.index(row, col) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if (row, col) addresses a cell on the board.
    pub fn is_inside(&self, row: i32, col: i32) -> bool {
        row >= 0 && row < self.rows as i32 && col >= 0 && col < self.cols as i32
    }

    /// Check if position is within bounds and filled.
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        matches!(self.get(row, col), Some(Some(_)))
    }

    /// Check whether a falling piece may occupy (row, col).
    ///
    /// Columns must be on the board and the row must not be below the floor.
    /// Rows above the top are always free; on-board cells must be empty.
    pub fn is_free(&self, row: i32, col: i32) -> bool {
        if col < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return false;
        }
        if row < 0 {
            return true;
        }
        matches!(self.get(row, col), Some(None))
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, row: usize) -> bool {
        if row >= self.rows {
            return false;
        }
        let start = row * self.cols;
        self.cells[start..start + self.cols]
            .iter()
            .all(|cell| cell.is_some())
    }

    /// Find all full rows, top to bottom. At most four rows can fill at once.
    pub fn full_rows(&self) -> ArrayVec<usize, 4> {
        let mut full = ArrayVec::new();
        for row in 0..self.rows {
            if self.is_row_full(row) {
                full.push(row);
            }
        }
        full
    }

    /// Remove the given rows and shift everything above each down.
    ///
    /// `rows_to_remove` must be sorted ascending (as returned by
    /// [`full_rows`](Self::full_rows)). Uses copy_within, no allocation.
    pub fn remove_rows(&mut self, rows_to_remove: &[usize]) {
        for &target in rows_to_remove {
            if target >= self.rows {
                continue;
            }
            // Shift rows [0, target) down by one.
            for row in (1..=target).rev() {
                let src = (row - 1) * self.cols;
                let dst = row * self.cols;
                self.cells.copy_within(src..src + self.cols, dst);
            }
            for cell in &mut self.cells[0..self.cols] {
                *cell = None;
            }
        }
    }

    /// Write a piece's cells onto the board. Cells above the top are dropped.
    pub fn fill(&mut self, positions: impl IntoIterator<Item = (i32, i32)>, kind: PieceKind) {
        for (row, col) in positions {
            self.set(row, col, Some(kind));
        }
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Create from a 2D vector for testing
    #[cfg(test)]
    pub fn from_cells(cells_2d: Vec<Vec<Cell>>) -> Self {
        let rows = cells_2d.len();
        assert!(rows > 0);
        let cols = cells_2d[0].len();
        assert!(cells_2d.iter().all(|row| row.len() == cols));

        let mut board = Board::new(rows, cols);
        for (row, row_cells) in cells_2d.iter().enumerate() {
            for (col, cell) in row_cells.iter().enumerate() {
                board.cells[row * cols + col] = *cell;
            }
        }
        board
    }
}
