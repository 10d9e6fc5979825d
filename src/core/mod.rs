//! Core module - pure game logic with no engine or host dependencies
//!
//! This module contains the grid rules, match resolution, scoring, and the
//! session ball sequence. It has zero dependencies on timing, visuals, or I/O.

pub mod grid;
pub mod matcher;
pub mod rng;
pub mod scoring;

// Re-export commonly used types
pub use grid::Grid;
pub use matcher::{resolve, MatchResult};
pub use rng::{BallSequence, SimpleRng};
