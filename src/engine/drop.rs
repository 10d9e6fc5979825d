//! Drop controller - the per-ball phase machine and its interpolations
//!
//! One ball is in flight at a time. The controller owns it from dispense
//! until it settles, moving through
//! Dispensing -> AwaitingAim -> Aligning -> Falling -> Settled. Each phase
//! is advanced once per host tick with the tick's actual elapsed time, so
//! irregular tick lengths are fine; interpolation progress is clamped and
//! the end position is snapped exactly.
//!
//! The phase is also the re-entrancy guard: a release signal is accepted
//! only while a ball is awaiting aim, so a second signal during an active
//! alignment or fall is a no-op.

use crate::core::grid::Grid;
use crate::types::{Ball, DropConfig, GRID_COLS};

/// Rejected or out-of-phase release signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AimRejected {
    /// The nearest column is at full height; the ball keeps waiting.
    ColumnFull { column: usize },
    /// No ball is currently awaiting a release signal.
    NotAwaitingAim,
}

impl AimRejected {
    pub fn code(self) -> &'static str {
        match self {
            AimRejected::ColumnFull { .. } => "column_full",
            AimRejected::NotAwaitingAim => "not_awaiting_aim",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            AimRejected::ColumnFull { .. } => "target column is already filled",
            AimRejected::NotAwaitingAim => "no ball is awaiting a release signal",
        }
    }
}

/// Phase of the ball currently owned by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropPhase {
    /// No ball in flight; the next session tick pulls a color (or ends)
    Dispensing,
    /// Hanging in the dispenser, waiting for the release signal
    AwaitingAim,
    /// Horizontal interpolation toward the target column anchor
    Aligning {
        column: usize,
        start_x: f32,
        elapsed: f32,
    },
    /// Vertical interpolation down to the target cell
    Falling {
        column: usize,
        row: usize,
        start_y: f32,
        elapsed: f32,
        duration: f32,
    },
    /// Landed on its cell; the session commits it and resolves matches
    Settled { column: usize, row: usize },
}

/// A dispensed ball owned by the controller while in flight
#[derive(Debug, Clone, Copy)]
pub struct ActiveBall {
    pub ball: Ball,
    pub x: f32,
    pub y: f32,
    pub released: bool,
    pub target_column: Option<usize>,
}

/// What one controller step produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Nothing to animate (dispensing or waiting on the release signal)
    Idle,
    /// An interpolation advanced without completing
    Moving,
    /// The ball reached its cell and must be committed at (column, row)
    Landed { column: usize, row: usize },
}

/// Owns the in-flight ball and advances its alignment and fall.
#[derive(Debug)]
pub struct DropController {
    phase: DropPhase,
    active: Option<ActiveBall>,
}

impl DropController {
    pub fn new() -> Self {
        Self {
            phase: DropPhase::Dispensing,
            active: None,
        }
    }

    pub fn phase(&self) -> DropPhase {
        self.phase
    }

    /// The ball currently in flight, if any
    pub fn active(&self) -> Option<&ActiveBall> {
        self.active.as_ref()
    }

    /// Hand a freshly dispensed ball to the controller.
    pub fn dispense(&mut self, ball: Ball, config: &DropConfig) {
        debug_assert!(self.active.is_none(), "only one ball may be in flight");
        self.active = Some(ActiveBall {
            ball,
            x: config.spawn_x,
            y: config.spawn_y,
            released: false,
            target_column: None,
        });
        self.phase = DropPhase::AwaitingAim;
    }

    /// Handle the release signal carrying the ball's current horizontal
    /// position. Picks the nearest column anchor (ties to the lowest
    /// index); a full target column rejects the signal and the ball keeps
    /// waiting. Accepted signals freeze the swing and start the alignment.
    pub fn submit_aim(
        &mut self,
        x: f32,
        grid: &Grid,
        config: &DropConfig,
    ) -> Result<usize, AimRejected> {
        if !matches!(self.phase, DropPhase::AwaitingAim) {
            return Err(AimRejected::NotAwaitingAim);
        }
        let Some(ball) = self.active.as_mut() else {
            return Err(AimRejected::NotAwaitingAim);
        };

        let column = nearest_column(x, &config.column_x);
        if grid.is_column_full(column) {
            log::info!("column {} is already filled", column);
            return Err(AimRejected::ColumnFull { column });
        }

        ball.x = x;
        ball.released = true;
        ball.target_column = Some(column);
        self.phase = DropPhase::Aligning {
            column,
            start_x: x,
            elapsed: 0.0,
        };
        Ok(column)
    }

    /// Advance the current interpolation by `dt` seconds.
    pub fn advance(&mut self, dt: f32, grid: &Grid, config: &DropConfig) -> StepOutcome {
        let Some(ball) = self.active.as_mut() else {
            return StepOutcome::Idle;
        };

        match self.phase {
            DropPhase::Dispensing | DropPhase::AwaitingAim => StepOutcome::Idle,
            DropPhase::Aligning {
                column,
                start_x,
                elapsed,
            } => {
                let elapsed = elapsed + dt;
                let target_x = config.column_x[column];
                let t = clamp01(elapsed / config.align_duration);
                ball.x = lerp(start_x, target_x, t);

                if t >= 1.0 {
                    // Snap to the exact anchor, then start the fall toward
                    // the first free row captured right now.
                    ball.x = target_x;
                    let row = grid.height_of(column);
                    let start_y = ball.y;
                    let target_y = config.row_y(row);
                    let distance = (target_y - start_y).abs();
                    let duration = (distance / config.fall_speed).max(config.min_fall_duration);
                    self.phase = DropPhase::Falling {
                        column,
                        row,
                        start_y,
                        elapsed: 0.0,
                        duration,
                    };
                } else {
                    self.phase = DropPhase::Aligning {
                        column,
                        start_x,
                        elapsed,
                    };
                }
                StepOutcome::Moving
            }
            DropPhase::Falling {
                column,
                row,
                start_y,
                elapsed,
                duration,
            } => {
                let elapsed = elapsed + dt;
                let target_y = config.row_y(row);
                let t = clamp01(elapsed / duration);
                ball.y = lerp(start_y, target_y, t);

                if t >= 1.0 {
                    ball.y = target_y;
                    self.phase = DropPhase::Settled { column, row };
                    StepOutcome::Landed { column, row }
                } else {
                    self.phase = DropPhase::Falling {
                        column,
                        row,
                        start_y,
                        elapsed,
                        duration,
                    };
                    StepOutcome::Moving
                }
            }
            DropPhase::Settled { column, row } => StepOutcome::Landed { column, row },
        }
    }

    /// Remove the settled ball from the controller; ownership moves to the
    /// grid and the controller goes back to dispensing.
    pub fn take_ball(&mut self) -> Option<ActiveBall> {
        self.phase = DropPhase::Dispensing;
        self.active.take()
    }

    /// Abandon any in-flight ball without committing it (session teardown).
    pub fn abort(&mut self) -> Option<ActiveBall> {
        self.phase = DropPhase::Dispensing;
        self.active.take()
    }
}

impl Default for DropController {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest column anchor by absolute distance; the linear scan keeps the
/// first minimum, so ties break to the lowest index.
fn nearest_column(x: f32, anchors: &[f32; GRID_COLS]) -> usize {
    let mut nearest = 0;
    let mut min_dist = (x - anchors[0]).abs();
    for (i, &anchor) in anchors.iter().enumerate().skip(1) {
        let dist = (x - anchor).abs();
        if dist < min_dist {
            min_dist = dist;
            nearest = i;
        }
    }
    nearest
}

fn clamp01(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BallColor, BallId};

    fn config() -> DropConfig {
        DropConfig::default()
    }

    fn red_ball() -> Ball {
        Ball {
            id: BallId(0),
            color: BallColor::Red,
        }
    }

    #[test]
    fn test_nearest_column_picks_minimum_distance() {
        let anchors = config().column_x;
        assert_eq!(nearest_column(-2.0, &anchors), 0);
        assert_eq!(nearest_column(-0.1, &anchors), 1);
        assert_eq!(nearest_column(0.9, &anchors), 2);
    }

    #[test]
    fn test_nearest_column_ties_break_low() {
        let anchors = config().column_x;
        // Exactly between columns 0 and 1; the first minimum wins
        assert_eq!(nearest_column(-0.6, &anchors), 0);
        assert_eq!(nearest_column(0.6, &anchors), 1);
    }

    #[test]
    fn test_aim_requires_waiting_ball() {
        let mut controller = DropController::new();
        let grid = Grid::new();
        let err = controller.submit_aim(0.0, &grid, &config()).unwrap_err();
        assert_eq!(err, AimRejected::NotAwaitingAim);
    }

    #[test]
    fn test_aim_rejected_on_full_column() {
        let mut controller = DropController::new();
        let grid = Grid::from_columns([
            &[],
            &[BallColor::Red, BallColor::Green, BallColor::Blue],
            &[],
        ]);
        controller.dispense(red_ball(), &config());

        let err = controller.submit_aim(0.0, &grid, &config()).unwrap_err();
        assert_eq!(err, AimRejected::ColumnFull { column: 1 });

        // The ball keeps waiting for another signal
        assert!(matches!(controller.phase(), DropPhase::AwaitingAim));
        assert!(!controller.active().unwrap().released);

        // A signal toward a free column is then accepted
        assert_eq!(controller.submit_aim(-1.0, &grid, &config()), Ok(0));
    }

    #[test]
    fn test_second_signal_during_flight_is_ignored() {
        let mut controller = DropController::new();
        let grid = Grid::new();
        controller.dispense(red_ball(), &config());

        assert_eq!(controller.submit_aim(0.3, &grid, &config()), Ok(1));
        let err = controller.submit_aim(-1.2, &grid, &config()).unwrap_err();
        assert_eq!(err, AimRejected::NotAwaitingAim);
        assert_eq!(controller.active().unwrap().target_column, Some(1));
    }

    #[test]
    fn test_alignment_interpolates_and_snaps() {
        let mut controller = DropController::new();
        let grid = Grid::new();
        let cfg = config();
        controller.dispense(red_ball(), &cfg);
        controller.submit_aim(0.9, &grid, &cfg).unwrap();

        // Halfway through the 0.5s alignment toward x = 1.2
        assert_eq!(
            controller.advance(0.25, &grid, &cfg),
            StepOutcome::Moving
        );
        let x = controller.active().unwrap().x;
        assert!((x - 1.05).abs() < 1e-4, "x = {}", x);

        // Completing the alignment snaps exactly and starts the fall
        controller.advance(0.25, &grid, &cfg);
        assert_eq!(controller.active().unwrap().x, 1.2);
        assert!(matches!(controller.phase(), DropPhase::Falling { .. }));
    }

    #[test]
    fn test_fall_duration_floor() {
        let mut controller = DropController::new();
        let grid = Grid::new();
        let mut cfg = config();
        // Spawn essentially at the drop zone: distance ~0, duration floors at 0.1
        cfg.spawn_y = cfg.drop_zone_y + 0.01;
        controller.dispense(red_ball(), &cfg);
        controller.submit_aim(0.0, &grid, &cfg).unwrap();

        // Finish alignment
        controller.advance(cfg.align_duration, &grid, &cfg);
        let DropPhase::Falling { duration, .. } = controller.phase() else {
            panic!("expected falling phase");
        };
        assert_eq!(duration, cfg.min_fall_duration);

        // A tick shorter than the floor must not land the ball
        assert_eq!(
            controller.advance(0.05, &grid, &cfg),
            StepOutcome::Moving
        );
        assert_eq!(
            controller.advance(0.06, &grid, &cfg),
            StepOutcome::Landed { column: 1, row: 0 }
        );
    }

    #[test]
    fn test_variable_ticks_reach_the_same_cell() {
        let grid = Grid::new();
        let cfg = config();

        let run = |ticks: &[f32]| {
            let mut controller = DropController::new();
            controller.dispense(red_ball(), &cfg);
            controller.submit_aim(-0.9, &grid, &cfg).unwrap();
            let mut landed = None;
            for &dt in ticks {
                if let StepOutcome::Landed { column, row } =
                    controller.advance(dt, &grid, &cfg)
                {
                    landed = Some((column, row));
                    break;
                }
            }
            let ball = controller.take_ball().unwrap();
            (landed, ball.x, ball.y)
        };

        let fine: Vec<f32> = std::iter::repeat(0.016).take(200).collect();
        let coarse: Vec<f32> = std::iter::repeat(0.3).take(20).collect();

        let (landed_fine, x_fine, y_fine) = run(&fine);
        let (landed_coarse, x_coarse, y_coarse) = run(&coarse);

        assert_eq!(landed_fine, Some((0, 0)));
        assert_eq!(landed_fine, landed_coarse);
        // End positions snap exactly regardless of tick size
        assert_eq!(x_fine, x_coarse);
        assert_eq!(y_fine, y_coarse);
    }

    #[test]
    fn test_fall_targets_current_stack_height() {
        let mut controller = DropController::new();
        let grid = Grid::from_columns([&[BallColor::Green, BallColor::Blue], &[], &[]]);
        let cfg = config();
        controller.dispense(red_ball(), &cfg);
        controller.submit_aim(-1.2, &grid, &cfg).unwrap();

        controller.advance(cfg.align_duration, &grid, &cfg);
        let DropPhase::Falling { row, .. } = controller.phase() else {
            panic!("expected falling phase");
        };
        assert_eq!(row, 2);
    }

    #[test]
    fn test_abort_discards_ball() {
        let mut controller = DropController::new();
        let grid = Grid::new();
        let cfg = config();
        controller.dispense(red_ball(), &cfg);
        controller.submit_aim(0.0, &grid, &cfg).unwrap();
        controller.advance(0.1, &grid, &cfg);

        let abandoned = controller.abort().unwrap();
        assert_eq!(abandoned.ball.id, BallId(0));
        assert!(controller.active().is_none());
        assert!(matches!(controller.phase(), DropPhase::Dispensing));
    }
}
