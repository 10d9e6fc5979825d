//! Match resolver - line scan, clear, and column collapse
//!
//! Scans the grid for three-in-a-row lines of one color in a fixed order
//! (rows bottom to top, then columns left to right, then both diagonals),
//! clears the union of the matched cells, prices them, and compacts every
//! column. There is no cascade re-check: a collapse that lines up a fresh
//! match leaves it on the board until the next settle.

use arrayvec::ArrayVec;

use crate::core::grid::Grid;
use crate::core::scoring;
use crate::types::{Ball, BallId, GRID_COLS, GRID_ROWS};

/// Upper bound for matched sets and resettle lists: every cell in the grid
pub const MAX_CELLS: usize = GRID_COLS * GRID_ROWS;

/// The eight candidate lines, in scan order: three rows, three columns,
/// the main diagonal, the anti-diagonal. Cells are (column, row).
const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(2, 0), (1, 1), (0, 2)],
];

/// Outcome of one resolution pass.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// Matched cells (column, row), deduplicated, in scan order.
    pub cleared: ArrayVec<(usize, usize), MAX_CELLS>,
    /// Points awarded for this event.
    pub score_delta: u32,
    /// The balls removed from the cleared cells.
    pub removed: ArrayVec<Ball, MAX_CELLS>,
    /// Post-collapse resettle list: (id, column, new_row) for every
    /// surviving ball, column by column in bottom-to-top order.
    pub moved: ArrayVec<(BallId, usize, usize), MAX_CELLS>,
}

impl MatchResult {
    /// Whether anything matched this pass
    pub fn matched(&self) -> bool {
        !self.cleared.is_empty()
    }
}

/// Find every matched line and return the union of their cells,
/// deduplicated in first-found order. A line counts only when all three
/// cells are occupied by the same color.
pub fn find_matches(grid: &Grid) -> ArrayVec<(usize, usize), MAX_CELLS> {
    let mut matched = ArrayVec::new();
    for line in &LINES {
        let Some(first) = grid.cell_at(line[0].0, line[0].1) else {
            continue;
        };
        let is_line = line[1..]
            .iter()
            .all(|&(column, row)| grid.cell_at(column, row).is_some_and(|b| b.color == first.color));
        if is_line {
            for &cell in line {
                if !matched.contains(&cell) {
                    matched.push(cell);
                }
            }
        }
    }
    matched
}

/// Resolve one pass over `grid`: clear the matched set, price it with the
/// color of the set's first cell, and collapse all three columns. With no
/// match the grid is left untouched and the result is empty.
pub fn resolve(grid: &mut Grid) -> MatchResult {
    let cleared = find_matches(grid);
    if cleared.is_empty() {
        return MatchResult::default();
    }

    let (first_column, first_row) = cleared[0];
    let first_color = match grid.cell_at(first_column, first_row) {
        Some(ball) => ball.color,
        None => unreachable!("matched cells are occupied"),
    };
    let score_delta = scoring::match_score(first_color, cleared.len());

    let removed = grid.clear(&cleared);

    let mut moved = ArrayVec::new();
    for column in 0..GRID_COLS {
        for (id, new_row) in grid.collapse_column(column) {
            moved.push((id, column, new_row));
        }
    }

    MatchResult {
        cleared,
        score_delta,
        removed,
        moved,
    }
}
