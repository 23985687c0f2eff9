//! Tap dance keys
//!
//! A tap dance key performs different actions depending on how many times it has
//! been tapped in quick succession. Each tap restarts the timer. The dance is
//! finished when the tapping term passes without another tap or when a different
//! key is pressed, and it is reset when the key is released after it finished.

use heapless::Vec;
use keyberon::key_code::KeyCode;
use smlang::statemachine;

use crate::audio::songs;
use crate::layers::Layer;
use super::actions::TapDanceId;
use super::host::Host;

pub type Fsm = StateMachine<Context>;

/// Tap dance progress passed to the callbacks
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct TapDanceState {
    /// Number of taps so far
    pub count: u8,
    /// Key is currently held
    pub pressed: bool,
    /// Dance has been finished by pressing another key
    pub interrupted: bool,
    pub finished: bool,
}

/// Callback of an advanced tap dance
pub type TapDanceFn = fn(&TapDanceState, &mut Host);

/// What a tap dance key does
pub enum TapDanceAction {
    /// Callbacks called on each tap, when the dance finishes and when it is reset
    Advanced {
        on_each_tap: Option<TapDanceFn>,
        on_finished: Option<TapDanceFn>,
        on_reset: Option<TapDanceFn>,
    },
    /// First keycode on a single tap, second one on a double tap
    Double(KeyCode, KeyCode),
}

/// Stage of the dance at which callbacks are called
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    EachTap,
    Finished,
    Reset,
}

statemachine! {
    transitions: {
        *Idle + Press / tap = TappingDown,
        TappingDown + Release / release = TappingUp,
        TappingUp + Press / tap = TappingDown,

        // Dance finished while the key is held, reset on release
        TappingDown + Timeout / finish = Finished,
        TappingDown + Interrupt / interrupt = Finished,
        Finished + Release / release_and_reset = Idle,

        // Dance finished after the key has been released
        TappingUp + Timeout / finish_and_reset = Idle,
        TappingUp + Interrupt / interrupt_and_reset = Idle,
    }
}

pub struct Context {
    state: TapDanceState,
    phases: Vec<(Phase, TapDanceState), 3>,
}

impl Context {
    fn push(&mut self, phase: Phase) {
        let pushed = self.phases.push((phase, self.state));
        debug_assert!(pushed.is_ok(), "Tap dance phases not consumed");
    }

    fn reset(&mut self) {
        self.push(Phase::Reset);
        self.state = TapDanceState::default();
    }
}

impl StateMachineContext for Context {
    fn tap(&mut self) {
        self.state.count = self.state.count.saturating_add(1);
        self.state.pressed = true;
        self.push(Phase::EachTap);
    }

    fn release(&mut self) {
        self.state.pressed = false;
    }

    fn finish(&mut self) {
        self.state.finished = true;
        self.push(Phase::Finished);
    }

    fn interrupt(&mut self) {
        self.state.interrupted = true;
        self.finish();
    }

    fn release_and_reset(&mut self) {
        self.release();
        self.reset();
    }

    fn finish_and_reset(&mut self) {
        self.finish();
        self.reset();
    }

    fn interrupt_and_reset(&mut self) {
        self.interrupt();
        self.reset();
    }
}

impl StateMachine<Context> {
    fn idle() -> Self {
        Self::new(Context { state: TapDanceState::default(), phases: Vec::new() })
    }

    /// Dance started but not finished yet
    fn is_dancing(&self) -> bool {
        matches!(self.state(), States::TappingDown | States::TappingUp)
    }
}

impl TapDanceAction {
    fn run(&self, phase: Phase, state: &TapDanceState, host: &mut Host) {
        match self {
            Self::Advanced { on_each_tap, on_finished, on_reset } => {
                let callback = match phase {
                    Phase::EachTap => on_each_tap,
                    Phase::Finished => on_finished,
                    Phase::Reset => on_reset,
                };
                if let Some(f) = callback {
                    f(state, host);
                }
            },
            Self::Double(single, double) => {
                let kc = match state.count {
                    1 => *single,
                    2 => *double,
                    _ => return,
                };
                match phase {
                    Phase::EachTap => {},
                    Phase::Finished => host.keys.register(kc),
                    // Finish and reset may come together, keep the key for one report
                    Phase::Reset => host.keys.tap(kc),
                }
            },
        }
    }
}

/// Tap dance engine driving all tap dance keys
pub struct TapDances {
    actions: &'static [TapDanceAction; TapDanceId::COUNT],
    fsms: [Fsm; TapDanceId::COUNT],
    /// Key with a dance in progress
    active: Option<TapDanceId>,
    /// Ticks since the last tap of the active key
    elapsed: u16,
    tapping_term: u16,
}

impl TapDances {
    pub fn new(actions: &'static [TapDanceAction; TapDanceId::COUNT], tapping_term: u16) -> Self {
        Self {
            actions,
            fsms: [Fsm::idle(), Fsm::idle(), Fsm::idle(), Fsm::idle()],
            active: None,
            elapsed: 0,
            tapping_term,
        }
    }

    /// Key with a dance in progress
    pub fn active(&self) -> Option<TapDanceId> {
        self.active
    }

    fn process(&mut self, id: TapDanceId, event: Events, host: &mut Host) {
        let fsm = &mut self.fsms[id.index()];
        if fsm.process_event(event).is_err() {
            trace!("Tap dance {=u8} ignored event", id as u8);
        }
        for (phase, state) in fsm.context.phases.iter() {
            self.actions[id.index()].run(*phase, state, host);
        }
        fsm.context.phases.clear();
        if self.active == Some(id) && !fsm.is_dancing() {
            self.active = None;
        }
    }

    /// Tap dance key has been pressed
    pub fn press(&mut self, id: TapDanceId, host: &mut Host) {
        if self.active.map_or(false, |active| active != id) {
            self.interrupt(host);
        }
        self.process(id, Events::Press, host);
        if self.fsms[id.index()].is_dancing() {
            self.active = Some(id);
            self.elapsed = 0;
        }
    }

    pub fn release(&mut self, id: TapDanceId, host: &mut Host) {
        self.process(id, Events::Release, host);
    }

    /// Other key has been pressed, finish the active dance
    pub fn interrupt(&mut self, host: &mut Host) {
        if let Some(id) = self.active {
            self.process(id, Events::Interrupt, host);
            self.active = None;
        }
    }

    /// Advance time by one tick
    pub fn tick(&mut self, host: &mut Host) {
        if let Some(id) = self.active {
            self.elapsed = self.elapsed.saturating_add(1);
            if self.elapsed > self.tapping_term {
                self.process(id, Events::Timeout, host);
                self.active = None;
            }
        }
    }
}

fn lock_layer(layer: Layer, host: &mut Host) {
    info!("Lock layer {=u8}", layer as u8);
    host.layers.layer_move(layer);
    host.play_song(songs::LAYER_LOCK);
}

fn layer_press(layer: Layer, state: &TapDanceState, host: &mut Host) {
    if state.count == 1 {
        host.layers.layer_on(layer);
        host.layers.update_tri_layer(Layer::Lower, Layer::Raise, Layer::Adjust);
    }
}

fn layer_reset(layer: Layer, state: &TapDanceState, host: &mut Host) {
    if state.count == 1 {
        host.layers.layer_off(layer);
        host.layers.update_tri_layer(Layer::Lower, Layer::Raise, Layer::Adjust);
    }
}

fn low_press(state: &TapDanceState, host: &mut Host) {
    layer_press(Layer::Lower, state, host);
}

fn low_done(state: &TapDanceState, host: &mut Host) {
    if state.count == 2 {
        lock_layer(Layer::Lower, host);
    }
}

fn low_reset(state: &TapDanceState, host: &mut Host) {
    layer_reset(Layer::Lower, state, host);
}

fn rai_press(state: &TapDanceState, host: &mut Host) {
    layer_press(Layer::Raise, state, host);
}

fn rai_done(state: &TapDanceState, host: &mut Host) {
    if state.count == 2 {
        lock_layer(Layer::Raise, host);
    }
}

fn rai_reset(state: &TapDanceState, host: &mut Host) {
    layer_reset(Layer::Raise, state, host);
}

fn fn_press(state: &TapDanceState, host: &mut Host) {
    if state.count == 1 {
        host.layers.layer_on(Layer::Fn);
    }
}

fn fn_done(state: &TapDanceState, host: &mut Host) {
    if state.count == 2 {
        lock_layer(Layer::Fn, host);
    }
}

fn fn_reset(state: &TapDanceState, host: &mut Host) {
    if state.count == 1 {
        host.layers.layer_off(Layer::Fn);
    }
}

/// Actions of tap dance keys, indexed by [`TapDanceId`]
pub static TAP_DANCE_ACTIONS: [TapDanceAction; TapDanceId::COUNT] = [
    TapDanceAction::Advanced { on_each_tap: Some(low_press), on_finished: Some(low_done), on_reset: Some(low_reset) },
    TapDanceAction::Advanced { on_each_tap: Some(rai_press), on_finished: Some(rai_done), on_reset: Some(rai_reset) },
    TapDanceAction::Advanced { on_each_tap: Some(fn_press), on_finished: Some(fn_done), on_reset: Some(fn_reset) },
    TapDanceAction::Double(KeyCode::LShift, KeyCode::CapsLock),
];
