//! Grid module - manages the 3x3 game grid
//!
//! The grid is a 3x3 matrix of optional balls plus a height counter per
//! column. Coordinates: (column, row) where column ranges 0..2 (left to
//! right) and row ranges 0..2 (bottom to top). Uses a flat array for
//! storage.
//!
//! Invariant: the occupied cells of every column form a contiguous block
//! starting at row 0. Clearing breaks the invariant momentarily; running
//! `collapse_column` on each affected column restores it.

use arrayvec::ArrayVec;

use crate::types::{Ball, BallId, GRID_COLS, GRID_ROWS};

/// Total number of cells on the grid
const GRID_SIZE: usize = GRID_COLS * GRID_ROWS;

/// Rejected placement into a column already at full height.
/// The grid is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceRejected {
    pub column: usize,
}

impl PlaceRejected {
    pub fn code(self) -> &'static str {
        "column_full"
    }

    pub fn message(self) -> &'static str {
        "column is already at full height"
    }
}

/// The game grid - 3 columns x 3 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Flat array of cells, row-major order (row * GRID_COLS + column)
    cells: [Option<Ball>; GRID_SIZE],
    /// Contiguously filled rows per column
    heights: [u8; GRID_COLS],
}

impl Grid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            cells: [None; GRID_SIZE],
            heights: [0; GRID_COLS],
        }
    }

    /// Calculate flat index from (column, row) coordinates
    #[inline(always)]
    fn index(column: usize, row: usize) -> usize {
        debug_assert!(column < GRID_COLS && row < GRID_ROWS);
        row * GRID_COLS + column
    }

    /// Count of contiguously filled rows from the bottom of `column`
    pub fn height_of(&self, column: usize) -> usize {
        self.heights[column] as usize
    }

    /// Ball at (column, row), or None for an empty or out-of-bounds cell
    pub fn cell_at(&self, column: usize, row: usize) -> Option<&Ball> {
        if column >= GRID_COLS || row >= GRID_ROWS {
            return None;
        }
        self.cells[Self::index(column, row)].as_ref()
    }

    /// Check if a column is at full height
    pub fn is_column_full(&self, column: usize) -> bool {
        self.height_of(column) >= GRID_ROWS
    }

    /// Check if every column is at full height (no legal drop remains)
    pub fn is_full(&self) -> bool {
        (0..GRID_COLS).all(|column| self.is_column_full(column))
    }

    /// Number of balls currently on the grid
    pub fn ball_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Iterate over every ball on the grid, bottom row first
    pub fn balls(&self) -> impl Iterator<Item = &Ball> {
        self.cells.iter().filter_map(|cell| cell.as_ref())
    }

    /// Place a ball on top of `column`. Returns the row it settled in, or a
    /// rejection when the column is at full height. Rejection mutates
    /// nothing; callers are expected to have checked the height already.
    pub fn try_place(&mut self, column: usize, ball: Ball) -> Result<usize, PlaceRejected> {
        let row = self.height_of(column);
        if row >= GRID_ROWS {
            return Err(PlaceRejected { column });
        }
        self.cells[Self::index(column, row)] = Some(ball);
        self.heights[column] += 1;
        Ok(row)
    }

    /// Remove the balls at `cells`, returning them in the order given.
    /// Heights are stale afterwards until each affected column is collapsed.
    pub fn clear(&mut self, cells: &[(usize, usize)]) -> ArrayVec<Ball, GRID_SIZE> {
        let mut removed = ArrayVec::new();
        for &(column, row) in cells {
            if let Some(ball) = self.cells[Self::index(column, row)].take() {
                removed.push(ball);
            }
        }
        removed
    }

    /// Stable bottom-to-top compaction of one column after a clear.
    ///
    /// Gathers the surviving balls in their original relative order,
    /// rewrites them starting at row 0, and recomputes the height. Returns
    /// (id, new_row) for every survivor so callers can resettle visuals.
    /// Safe to run on columns the clear did not touch.
    pub fn collapse_column(&mut self, column: usize) -> ArrayVec<(BallId, usize), GRID_ROWS> {
        let mut survivors: ArrayVec<Ball, GRID_ROWS> = ArrayVec::new();
        for row in 0..GRID_ROWS {
            if let Some(ball) = self.cells[Self::index(column, row)].take() {
                survivors.push(ball);
            }
        }

        let mut moves = ArrayVec::new();
        for (row, ball) in survivors.into_iter().enumerate() {
            self.cells[Self::index(column, row)] = Some(ball);
            moves.push((ball.id, row));
        }
        self.heights[column] = moves.len() as u8;
        moves
    }

    /// Build a grid from per-column stacks, bottom to top. Ids are
    /// allocated sequentially from 0.
    #[cfg(test)]
    pub fn from_columns(columns: [&[crate::types::BallColor]; GRID_COLS]) -> Self {
        let mut grid = Self::new();
        let mut next_id = 0u32;
        for (column, stack) in columns.iter().enumerate() {
            for &color in *stack {
                let ball = Ball {
                    id: BallId(next_id),
                    color,
                };
                next_id += 1;
                grid.try_place(column, ball)
                    .expect("test stack exceeds grid height");
            }
        }
        grid
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
