//! Pendulum ball-drop match-3 puzzle core.
//!
//! Colored balls are dispensed one at a time from a swinging dispenser;
//! the player releases each ball toward one of three columns of a 3x3
//! grid. Three-in-a-row matches (row, column, or diagonal) clear and
//! score, and the remaining balls in each column collapse downward.
//!
//! The crate covers the grid and match engine (`core`), the tick-driven
//! drop scheduler and session (`engine`), and the game flow state machine
//! (`state`). Rendering and input devices stay host-side: the host feeds
//! the session elapsed time and release signals and observes it through
//! `SessionEvent` and the `BallVisuals` factory.

pub mod core;
pub mod engine;
pub mod state;
pub mod types;

pub use crate::core::{BallSequence, Grid, MatchResult, SimpleRng};
pub use crate::engine::{
    AimRejected, BallVisuals, DropController, DropPhase, GameSession, NullVisuals, Pendulum,
    SessionEvent,
};
pub use crate::state::{GameFlowState, StateId, StateMachine, Transition};
pub use crate::types::{Ball, BallColor, BallId, DropConfig};
