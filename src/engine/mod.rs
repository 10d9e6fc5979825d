//! Engine module - the tick-driven drop scheduler and session glue
//!
//! Everything here is driven by the host's single update loop: the drop
//! controller interpolates the in-flight ball, the session serializes all
//! grid and score mutation, and the pendulum supplies the demo runner's
//! aim positions.

pub mod drop;
pub mod pendulum;
pub mod session;

pub use drop::{AimRejected, DropController, DropPhase};
pub use pendulum::Pendulum;
pub use session::{BallVisuals, GameSession, NullVisuals, SessionEvent};
