//! State machine tests - registry lifecycle and the session handoff

use std::cell::RefCell;
use std::rc::Rc;

use balldrop::core::BallSequence;
use balldrop::engine::{GameSession, NullVisuals, SessionEvent};
use balldrop::state::{register_default_states, GameFlowState, StateId, StateMachine, Transition};
use balldrop::types::{BallColor, DropConfig};

/// Counts lifecycle calls and remembers the last payload.
#[derive(Default)]
struct Counters {
    enters: u32,
    updates: u32,
    exits: u32,
    last_payload: Option<u32>,
}

struct Probe {
    counters: Rc<RefCell<Counters>>,
}

impl Probe {
    fn new() -> (Box<dyn GameFlowState>, Rc<RefCell<Counters>>) {
        let counters = Rc::new(RefCell::new(Counters::default()));
        (
            Box::new(Probe {
                counters: Rc::clone(&counters),
            }),
            counters,
        )
    }
}

impl GameFlowState for Probe {
    fn enter(&mut self, payload: Option<u32>) -> Option<Transition> {
        let mut counters = self.counters.borrow_mut();
        counters.enters += 1;
        counters.last_payload = payload;
        None
    }

    fn update(&mut self) {
        self.counters.borrow_mut().updates += 1;
    }

    fn exit(&mut self) {
        self.counters.borrow_mut().exits += 1;
    }
}

#[test]
fn test_finished_transition_fires_each_hook_exactly_once() {
    let mut machine = StateMachine::new();
    let (loading, loading_counts) = Probe::new();
    let (menu, menu_counts) = Probe::new();
    let (playing, playing_counts) = Probe::new();
    let (finished, finished_counts) = Probe::new();
    machine.register_states([
        (StateId::Loading, loading),
        (StateId::Menu, menu),
        (StateId::Playing, playing),
        (StateId::Finished, finished),
    ]);

    machine.change_state(StateId::Playing, None);
    machine.change_state(StateId::Finished, Some(42));

    // Exactly one exit on playing, one enter on finished with the payload
    assert_eq!(playing_counts.borrow().exits, 1);
    assert_eq!(finished_counts.borrow().enters, 1);
    assert_eq!(finished_counts.borrow().last_payload, Some(42));

    // No other state's hooks fire
    assert_eq!(loading_counts.borrow().enters, 0);
    assert_eq!(loading_counts.borrow().exits, 0);
    assert_eq!(menu_counts.borrow().enters, 0);
    assert_eq!(menu_counts.borrow().exits, 0);
    assert_eq!(finished_counts.borrow().exits, 0);
}

#[test]
fn test_update_reaches_only_the_active_state() {
    let mut machine = StateMachine::new();
    let (menu, menu_counts) = Probe::new();
    let (playing, playing_counts) = Probe::new();
    machine.register(StateId::Menu, menu);
    machine.register(StateId::Playing, playing);

    machine.change_state(StateId::Menu, None);
    machine.update();
    machine.update();
    machine.change_state(StateId::Playing, None);
    machine.update();

    assert_eq!(menu_counts.borrow().updates, 2);
    assert_eq!(playing_counts.borrow().updates, 1);
}

#[test]
fn test_default_states_walk_the_whole_flow() {
    let mut machine = StateMachine::new();
    register_default_states(&mut machine);

    machine.change_state(StateId::Loading, None);
    // Loading chains straight into the menu
    assert_eq!(machine.active(), Some(StateId::Menu));

    machine.change_state(StateId::Playing, None);
    machine.update();
    machine.change_state(StateId::Finished, Some(300));
    assert_eq!(machine.active(), Some(StateId::Finished));
}

#[test]
#[should_panic(expected = "not registered")]
fn test_transition_to_unregistered_state_panics() {
    let mut machine = StateMachine::new();
    machine.change_state(StateId::Finished, None);
}

#[test]
fn test_session_end_feeds_the_finished_state() {
    // The wiring the host performs: play a scripted session to its end and
    // hand the final score to the finished state.
    let mut machine = StateMachine::new();
    let (finished, finished_counts) = Probe::new();
    machine.register(StateId::Playing, Box::new(balldrop::state::PlayingState));
    machine.register(StateId::Finished, finished);
    machine.change_state(StateId::Playing, None);

    let mut session = GameSession::with_sequence(
        BallSequence::from_colors(vec![BallColor::Blue, BallColor::Blue, BallColor::Blue]),
        DropConfig::default(),
    );
    let mut visuals = NullVisuals;
    session.start(&mut visuals);

    let dt = 0.05;
    let mut final_score = None;
    for column in [0, 1, 2] {
        // Wait for a ball, release it, let it settle
        for _ in 0..10_000 {
            let phase_ready = session.submit_aim(session.config().column_x[column]).is_ok();
            if phase_ready {
                break;
            }
            session.advance(dt, &mut visuals);
        }
        loop {
            match session.advance(dt, &mut visuals) {
                SessionEvent::Settled { .. } => break,
                SessionEvent::Ended(_) => panic!("ended early"),
                _ => {}
            }
        }
    }
    for _ in 0..10_000 {
        if let SessionEvent::Ended(score) = session.advance(dt, &mut visuals) {
            final_score = Some(score);
            break;
        }
    }

    let score = final_score.expect("session ended");
    assert_eq!(score, 300);
    machine.change_state(StateId::Finished, Some(score));

    assert_eq!(finished_counts.borrow().enters, 1);
    assert_eq!(finished_counts.borrow().last_payload, Some(300));
}
