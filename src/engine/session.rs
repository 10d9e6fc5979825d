//! Game session - the single owner of one playthrough
//!
//! `GameSession` wires the ball sequence, grid, score and drop controller
//! together and is the only writer to any of them. The host drives it with
//! `advance(dt, ..)` once per tick and feeds it release signals; lifecycle
//! is reported back through `SessionEvent`. Ball visuals are addressed
//! through the `BallVisuals` factory passed at each call, so headless runs
//! and tests plug in a no-op or a recorder.
//!
//! Game-over is a normal terminal condition: the sequence running out or
//! the grid packing full is checked the same way before every dispense,
//! and after a short end delay the session reports `Ended` exactly once.

use crate::core::grid::Grid;
use crate::core::matcher;
use crate::core::rng::{BallSequence, SimpleRng};
use crate::engine::drop::{AimRejected, DropController, DropPhase, StepOutcome};
use crate::types::{Ball, BallColor, BallId, DropConfig, GRID_COLS};

/// Host-side factory for ball visual instances, keyed by `BallId`.
pub trait BallVisuals {
    /// A ball appeared in the dispenser.
    fn spawn(&mut self, id: BallId, color: BallColor, x: f32, y: f32);
    /// A ball moved (in flight, or resettled by a collapse).
    fn moved(&mut self, id: BallId, x: f32, y: f32);
    /// A ball was cleared by a match or torn down with the session.
    fn destroy(&mut self, id: BallId);
}

/// No-op visuals for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVisuals;

impl BallVisuals for NullVisuals {
    fn spawn(&mut self, _id: BallId, _color: BallColor, _x: f32, _y: f32) {}
    fn moved(&mut self, _id: BallId, _x: f32, _y: f32) {}
    fn destroy(&mut self, _id: BallId) {}
}

/// What one session tick produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// Nothing externally visible happened
    InProgress,
    /// A new ball is hanging in the dispenser
    Dispensed { id: BallId, color: BallColor },
    /// A ball settled; any match has been resolved and scored
    Settled {
        column: usize,
        row: usize,
        cleared: usize,
        score_delta: u32,
    },
    /// The session ended with this final score. Reported exactly once.
    Ended(u32),
}

/// One complete playthrough from sequence generation to game-over.
#[derive(Debug)]
pub struct GameSession {
    config: DropConfig,
    sequence: BallSequence,
    grid: Grid,
    controller: DropController,
    score: u32,
    /// Monotonic id for dispensed balls
    next_ball_id: u32,
    started: bool,
    /// Remaining end delay once a terminal dispense check fired
    ending: Option<f32>,
    over: bool,
}

impl GameSession {
    /// Create a session with the standard shuffled 9-ball sequence.
    pub fn new(seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let sequence = BallSequence::standard(&mut rng);
        Self::with_sequence(sequence, DropConfig::default())
    }

    /// Create a session over an explicit sequence (scripted playthroughs).
    pub fn with_sequence(sequence: BallSequence, config: DropConfig) -> Self {
        Self {
            config,
            sequence,
            grid: Grid::new(),
            controller: DropController::new(),
            score: 0,
            next_ball_id: 0,
            started: false,
            ending: None,
            over: false,
        }
    }

    pub fn config(&self) -> &DropConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn controller(&self) -> &DropController {
        &self.controller
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// True once the session ended or the next dispense would end it:
    /// the sequence is exhausted or every column is at full height.
    pub fn is_session_over(&self) -> bool {
        self.over || self.ending.is_some() || self.sequence.is_exhausted() || self.grid.is_full()
    }

    /// Begin the playthrough by dispensing the first ball.
    pub fn start(&mut self, visuals: &mut dyn BallVisuals) -> SessionEvent {
        if self.started {
            return SessionEvent::InProgress;
        }
        self.started = true;
        self.dispense(visuals)
    }

    /// Release signal carrying the ball's current horizontal position.
    /// At most one signal is accepted per ball; signals into a full column
    /// are logged and rejected while the ball keeps waiting.
    pub fn submit_aim(&mut self, x: f32) -> Result<usize, AimRejected> {
        if self.over || self.ending.is_some() {
            return Err(AimRejected::NotAwaitingAim);
        }
        self.controller.submit_aim(x, &self.grid, &self.config)
    }

    /// Advance the session by `dt` seconds - one tick of the host loop.
    pub fn advance(&mut self, dt: f32, visuals: &mut dyn BallVisuals) -> SessionEvent {
        if self.over || !self.started {
            return SessionEvent::InProgress;
        }

        if let Some(remaining) = self.ending {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                self.ending = Some(remaining);
                return SessionEvent::InProgress;
            }
            return self.finish(visuals);
        }

        if matches!(self.controller.phase(), DropPhase::Dispensing) {
            return self.dispense(visuals);
        }

        match self.controller.advance(dt, &self.grid, &self.config) {
            StepOutcome::Idle => SessionEvent::InProgress,
            StepOutcome::Moving => {
                if let Some(active) = self.controller.active() {
                    visuals.moved(active.ball.id, active.x, active.y);
                }
                SessionEvent::InProgress
            }
            StepOutcome::Landed { column, row } => self.settle(column, row, visuals),
        }
    }

    /// Tear down mid-session: the in-flight ball is discarded uncommitted
    /// and every visual is destroyed. The grid stays consistent.
    pub fn abort(&mut self, visuals: &mut dyn BallVisuals) {
        if let Some(abandoned) = self.controller.abort() {
            visuals.destroy(abandoned.ball.id);
        }
        for ball in self.grid.balls() {
            visuals.destroy(ball.id);
        }
        self.ending = None;
        self.over = true;
    }

    /// Pull the next color, or begin the end delay when the sequence is
    /// exhausted or the grid is full. Both terminal conditions are checked
    /// here, before every dispense.
    fn dispense(&mut self, visuals: &mut dyn BallVisuals) -> SessionEvent {
        if self.grid.is_full() || self.sequence.is_exhausted() {
            self.ending = Some(self.config.end_delay);
            return SessionEvent::InProgress;
        }

        let color = match self.sequence.draw() {
            Some(color) => color,
            None => unreachable!("terminal check precedes every dispense"),
        };
        let ball = Ball {
            id: BallId(self.next_ball_id),
            color,
        };
        self.next_ball_id += 1;

        self.controller.dispense(ball, &self.config);
        visuals.spawn(ball.id, color, self.config.spawn_x, self.config.spawn_y);
        SessionEvent::Dispensed {
            id: ball.id,
            color,
        }
    }

    /// Commit the landed ball, resolve matches, apply the score delta, and
    /// hand the controller back to dispensing. The next dispense only runs
    /// on a later tick, after this resolver call has fully returned.
    fn settle(
        &mut self,
        column: usize,
        row: usize,
        visuals: &mut dyn BallVisuals,
    ) -> SessionEvent {
        let active = match self.controller.take_ball() {
            Some(active) => active,
            None => unreachable!("landed outcome implies an active ball"),
        };
        visuals.moved(active.ball.id, active.x, active.y);

        let placed_row = match self.grid.try_place(column, active.ball) {
            Ok(placed_row) => placed_row,
            // The aim guard keeps full columns untargetable; reaching this
            // is a programming error.
            Err(rejected) => panic!("ball committed into full column {}", rejected.column),
        };
        debug_assert_eq!(placed_row, row);

        let result = matcher::resolve(&mut self.grid);
        self.score += result.score_delta;

        if result.matched() {
            log::info!("current score: {}", self.score);
            for ball in &result.removed {
                visuals.destroy(ball.id);
            }
            for &(id, moved_column, new_row) in &result.moved {
                visuals.moved(
                    id,
                    self.config.column_x[moved_column],
                    self.config.row_y(new_row),
                );
            }
        }

        SessionEvent::Settled {
            column,
            row,
            cleared: result.cleared.len(),
            score_delta: result.score_delta,
        }
    }

    /// End of the post-game delay: log the summary, tear down the visuals,
    /// and report the final score.
    fn finish(&mut self, visuals: &mut dyn BallVisuals) -> SessionEvent {
        self.ending = None;
        self.over = true;
        log::info!("game over! final score: {}", self.score);

        for column in 0..GRID_COLS {
            for row in 0..self.grid.height_of(column) {
                if let Some(ball) = self.grid.cell_at(column, row) {
                    visuals.destroy(ball.id);
                }
            }
        }
        SessionEvent::Ended(self.score)
    }
}
