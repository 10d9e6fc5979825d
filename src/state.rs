//! Game flow states - the lifecycle machine around a session
//!
//! A closed set of four states (loading, menu, playing, finished) with an
//! enter/update/exit lifecycle. State instances are registered once at
//! startup and live for the machine's lifetime; re-entering a state reuses
//! the same instance. Any state may request a transition to any other, and
//! targeting an unregistered state is a programming error that panics.
//!
//! `enter` may request a follow-up transition (the loading state hands off
//! to the menu as soon as it runs); the machine follows such requests
//! until a state settles.

/// Identity of a flow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    Loading,
    Menu,
    Playing,
    Finished,
}

impl StateId {
    pub const COUNT: usize = 4;

    fn index(self) -> usize {
        self as usize
    }

    /// Convert to lowercase string
    pub fn as_str(self) -> &'static str {
        match self {
            StateId::Loading => "loading",
            StateId::Menu => "menu",
            StateId::Playing => "playing",
            StateId::Finished => "finished",
        }
    }
}

/// A follow-up transition requested from inside `enter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub target: StateId,
    pub payload: Option<u32>,
}

/// Lifecycle hooks of one flow state. All three default to no-ops so
/// states only spell out the hooks they use.
pub trait GameFlowState {
    /// Called when the state becomes active, with an optional payload
    /// (the final score, for the finished state). May request a follow-up
    /// transition.
    fn enter(&mut self, payload: Option<u32>) -> Option<Transition> {
        let _ = payload;
        None
    }

    /// Dispatched once per host tick while active
    fn update(&mut self) {}

    /// Called when another state takes over
    fn exit(&mut self) {}
}

/// Registry-backed flow machine. Exactly one state is active at a time.
pub struct StateMachine {
    states: [Option<Box<dyn GameFlowState>>; StateId::COUNT],
    active: Option<StateId>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            states: [None, None, None, None],
            active: None,
        }
    }

    /// Register the instance serving `id`. Called once per state at startup.
    pub fn register(&mut self, id: StateId, state: Box<dyn GameFlowState>) {
        self.states[id.index()] = Some(state);
    }

    /// Register a batch of states at once.
    pub fn register_states(
        &mut self,
        states: impl IntoIterator<Item = (StateId, Box<dyn GameFlowState>)>,
    ) {
        for (id, state) in states {
            self.register(id, state);
        }
    }

    /// Identity of the currently active state
    pub fn active(&self) -> Option<StateId> {
        self.active
    }

    /// Switch to `id`: exit the current state (if any), then enter the new
    /// one with `payload`, following transition requests chained from
    /// `enter`. Panics if the target (or a chained target) was never
    /// registered - that is a programming error, not a runtime condition.
    pub fn change_state(&mut self, id: StateId, payload: Option<u32>) {
        let mut next = Transition {
            target: id,
            payload,
        };
        loop {
            if let Some(current) = self.active.take() {
                self.state_mut(current).exit();
            }
            self.active = Some(next.target);
            match self.state_mut(next.target).enter(next.payload) {
                Some(chained) => next = chained,
                None => break,
            }
        }
    }

    /// Dispatch `update` to the active state
    pub fn update(&mut self) {
        if let Some(id) = self.active {
            self.state_mut(id).update();
        }
    }

    fn state_mut(&mut self, id: StateId) -> &mut dyn GameFlowState {
        match self.states[id.index()].as_mut() {
            Some(state) => state.as_mut(),
            None => panic!("state '{}' is not registered", id.as_str()),
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Boot state; logs and immediately hands off to the menu.
pub struct LoadingState;

impl GameFlowState for LoadingState {
    fn enter(&mut self, _payload: Option<u32>) -> Option<Transition> {
        log::info!("loading");
        Some(Transition {
            target: StateId::Menu,
            payload: None,
        })
    }
}

/// Main menu shell; entry and exit side effects only.
pub struct MenuState;

impl GameFlowState for MenuState {
    fn enter(&mut self, _payload: Option<u32>) -> Option<Transition> {
        log::info!("entering menu");
        None
    }

    fn exit(&mut self) {
        log::info!("leaving menu");
    }
}

/// Active playthrough shell; the session itself is driven by the host loop.
pub struct PlayingState;

impl GameFlowState for PlayingState {
    fn enter(&mut self, _payload: Option<u32>) -> Option<Transition> {
        log::info!("game started");
        None
    }

    fn exit(&mut self) {
        log::info!("game stopped");
    }
}

/// Terminal screen; the payload carries the final score.
pub struct FinishedState;

impl GameFlowState for FinishedState {
    fn enter(&mut self, payload: Option<u32>) -> Option<Transition> {
        log::info!("finished with score {}", payload.unwrap_or(0));
        None
    }
}

/// Register the four shipped states.
pub fn register_default_states(machine: &mut StateMachine) {
    machine.register_states([
        (
            StateId::Loading,
            Box::new(LoadingState) as Box<dyn GameFlowState>,
        ),
        (StateId::Menu, Box::new(MenuState)),
        (StateId::Playing, Box::new(PlayingState)),
        (StateId::Finished, Box::new(FinishedState)),
    ]);
}
