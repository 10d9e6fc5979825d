//! Headless demo runner (default binary).
//!
//! Drives one complete playthrough without a renderer: a simulated
//! pendulum swings the dispenser and the ball is released on a fixed
//! cadence. The session's log lines (score updates, rejections, game
//! over) go to stdout, and the flow machine walks
//! loading -> menu -> playing -> finished around the session.

use anyhow::{anyhow, Result};
use log::{Level, LevelFilter, Metadata, Record};

use balldrop::engine::{GameSession, NullVisuals, Pendulum, SessionEvent};
use balldrop::state::{self, StateId, StateMachine};
use balldrop::types::TICK_MS;

/// Plain text lines to stdout; the crate only logs through the facade.
struct StdoutLogger;

impl log::Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StdoutLogger = StdoutLogger;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunConfig {
    seed: u32,
    /// Ticks between release attempts
    release_every: u32,
    /// Safety cap so a run always terminates
    max_ticks: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            release_every: 45,
            max_ticks: 100_000,
        }
    }
}

fn parse_args(args: &[String]) -> Result<RunConfig> {
    let mut config = RunConfig::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --seed"))?;
                config.seed = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --seed value: {}", v))?;
            }
            "--release-every" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --release-every"))?;
                config.release_every = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --release-every value: {}", v))?;
                if config.release_every == 0 {
                    return Err(anyhow!("--release-every must be at least 1"));
                }
            }
            "--max-ticks" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --max-ticks"))?;
                config.max_ticks = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --max-ticks value: {}", v))?;
            }
            other => {
                return Err(anyhow!("unknown argument: {}", other));
            }
        }
        i += 1;
    }
    Ok(config)
}

fn main() -> Result<()> {
    log::set_logger(&LOGGER).map_err(|e| anyhow!("logger init failed: {}", e))?;
    log::set_max_level(LevelFilter::Info);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_args(&args)?;

    let mut machine = StateMachine::new();
    state::register_default_states(&mut machine);
    // Loading chains straight into the menu; the demo then starts playing.
    machine.change_state(StateId::Loading, None);
    machine.change_state(StateId::Playing, None);

    let mut session = GameSession::new(config.seed);
    let mut visuals = NullVisuals;
    let mut pendulum = Pendulum::default();
    session.start(&mut visuals);

    let dt = TICK_MS as f32 / 1000.0;
    let mut final_score = session.score();

    // Arm length chosen so the swing sweeps past all three column anchors.
    let arm = 3.6;

    for tick in 1..=config.max_ticks {
        pendulum.advance(dt);
        if tick % config.release_every == 0 {
            if let Err(rejection) = session.submit_aim(pendulum.ball_x(arm)) {
                log::debug!("aim ignored: {}", rejection.message());
            }
        }

        if let SessionEvent::Ended(score) = session.advance(dt, &mut visuals) {
            final_score = score;
            break;
        }
        machine.update();
    }

    machine.change_state(StateId::Finished, Some(final_score));
    Ok(())
}
