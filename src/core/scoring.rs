//! Scoring module - the fixed color point table and match pricing
//!
//! Each color has a fixed line value (Red 100, Green 200, Blue 300). A
//! match event is priced as one line value per three cleared cells, using a
//! single color for the whole event even when overlapping or simultaneous
//! lines of different colors cleared together.

use crate::types::{BallColor, COLOR_SCORES};

/// Points for one full line of `color`
pub fn points_for(color: BallColor) -> u32 {
    COLOR_SCORES[color as usize]
}

/// Score delta for a match event: `color` prices the whole cleared set,
/// one line's worth per three cells (integer division).
pub fn match_score(color: BallColor, cleared_cells: usize) -> u32 {
    points_for(color) * (cleared_cells / 3) as u32
}
