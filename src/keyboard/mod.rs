//! Main keyboard logic
//!
//! Resolves key events through the layer tables and processes the resulting actions.
//! Keymap-specific handlers get the first chance to handle each key, then music mode
//! and firmware keycodes, then the default processing that registers keycodes for
//! the USB HID report.

/// Special keyboard actions
pub mod actions;
/// Lifecycle hooks of the keymap
pub mod hooks;
mod host;
/// Keyboard matrix scanner with debouncing
mod keys;
mod layer_state;
pub mod music;
/// Custom keycode handlers of the keymap
pub mod process;
mod registry;
pub mod tap_dance;

use keyberon::action::Action::{Custom, DefaultLayer, Layer, MultipleActions, MultipleKeyCodes};
use keyberon::key_code::KeyCode;
use keyberon::layout::Event;

use crate::audio::Pitch;
use crate::config::KeyboardConfig;
use crate::eeconfig::Eeconfig;
use crate::layers::{Action, Layers, LAYERS, NCOLS, NROWS};
use actions::CustomAction;
use tap_dance::{TapDances, TAP_DANCE_ACTIONS};

pub use host::Host;
pub use keys::Keys;
pub use layer_state::LayerState;
pub use registry::KeyRegistry;

/// Keyboard logic
pub struct Keyboard {
    host: Host,
    tap_dances: TapDances,
    layers: &'static Layers,
    /// Actions resolved when keys were pressed, used on release
    pressed: [[Option<&'static Action>; NCOLS]; NROWS],
    /// Keys that have been pressed in music mode and play notes
    notes: [[bool; NCOLS]; NROWS],
}

impl Keyboard {
    pub fn new(config: &'static KeyboardConfig, eeconfig: Eeconfig) -> Self {
        let mut host = Host::new(config, eeconfig);
        hooks::matrix_init_user(&mut host);
        Self {
            host,
            tap_dances: TapDances::new(&TAP_DANCE_ACTIONS, config.timing.tapping_term),
            layers: &LAYERS,
            pressed: [[None; NCOLS]; NROWS],
            notes: [[false; NCOLS]; NROWS],
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Handle key press/release
    pub fn event(&mut self, event: Event) {
        let (row, col) = event.coord();
        let coord = (row as usize, col as usize);
        if coord.0 >= NROWS || coord.1 >= NCOLS {
            warn!("Key out of matrix: ({=u8}, {=u8})", row, col);
            return;
        }

        if event.is_press() {
            let mut action = self.host.layers.resolve(self.layers, (row, col));
            if let Some(active) = self.tap_dances.active() {
                if !matches!(action, Custom(CustomAction::TapDance(id)) if *id == active) {
                    self.tap_dances.interrupt(&mut self.host);
                    // Finished dance may have changed the layers
                    action = self.host.layers.resolve(self.layers, (row, col));
                }
            }
            self.pressed[coord.0][coord.1] = Some(action);
            self.process_record(action, (row, col), true);
        } else if let Some(action) = self.pressed[coord.0][coord.1].take() {
            self.process_record(action, (row, col), false);
        }
    }

    fn process_record(&mut self, action: &'static Action, coord: (u8, u8), pressed: bool) {
        if !process::process_record_user(action, pressed, &mut self.host) {
            return;
        }
        if !self.process_record_quantum(action, coord, pressed) {
            return;
        }
        Self::process_action(&mut self.host, action, pressed);
    }

    /// Firmware keycodes, returns false if the event has been consumed
    fn process_record_quantum(&mut self, action: &Action, coord: (u8, u8), pressed: bool) -> bool {
        // Release goes the same way as the press even if music mode changed meanwhile
        let note = &mut self.notes[coord.0 as usize][coord.1 as usize];
        let is_note = if pressed {
            *note = self.host.music && music::is_music_key(action);
            *note
        } else {
            core::mem::take(note)
        };
        if is_note {
            music::play_key(coord, pressed, &mut self.host);
            return false;
        }
        let Custom(custom) = action else {
            return true;
        };
        match custom {
            CustomAction::Music(on) => {
                if pressed {
                    self.host.music = *on;
                    if *on {
                        info!("Music mode on");
                        hooks::music_on_user(&mut self.host);
                    } else {
                        info!("Music mode off");
                        self.host.audio.stop_all();
                    }
                }
            },
            CustomAction::Reset => if pressed {
                info!("Reset to bootloader");
                hooks::shutdown_user(&mut self.host);
            },
            CustomAction::TapDance(id) => {
                if pressed {
                    self.tap_dances.press(*id, &mut self.host);
                } else {
                    self.tap_dances.release(*id, &mut self.host);
                }
            },
            CustomAction::DefaultLayer(_) | CustomAction::Backlight | CustomAction::ShiftEnter => {
                return true;
            },
        }
        false
    }

    fn process_action(host: &mut Host, action: &Action, pressed: bool) {
        let key = |host: &mut Host, kc: KeyCode| if pressed {
            host.keys.register(kc)
        } else {
            host.keys.unregister(kc)
        };
        match action {
            Action::KeyCode(kc) => key(host, *kc),
            MultipleKeyCodes(kcs) => for kc in kcs.iter() {
                key(host, *kc);
            },
            MultipleActions(actions) => for action in actions.iter() {
                Self::process_action(host, action, pressed);
            },
            Layer(layer) => if pressed {
                host.layers.layer_on(*layer);
            } else {
                host.layers.layer_off(*layer);
            },
            DefaultLayer(layer) => if pressed {
                host.layers.default_layer_set(1 << *layer);
            },
            _ => {},
        }
    }

    /// Advance keyboard time by one tick (1 ms)
    ///
    /// Should be called after the HID report for the previous tick has been generated.
    pub fn tick(&mut self) {
        self.host.keys.flush_taps();
        self.host.tick();
        self.tap_dances.tick(&mut self.host);
    }

    /// Keycodes for the HID report
    pub fn keycodes(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.host.keys.keycodes()
    }

    /// Pitch that the speaker should play
    pub fn tone(&self) -> Option<Pitch> {
        self.host.audio.pitch()
    }

    /// Backlight output state at given time
    pub fn backlight_on(&self, tick: u32) -> bool {
        self.host.backlight.output(tick)
    }

    /// Settings to be saved, if modified
    pub fn take_eeconfig(&mut self) -> Option<Eeconfig> {
        self.host.take_eeconfig()
    }

    /// Keyboard should reboot to bootloader
    pub fn reboot_requested(&self) -> bool {
        self.host.reboot_requested()
    }

    /// Highest active layer
    pub fn current_layer(&self) -> usize {
        self.host.layers.highest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::Layer;
    use crate::audio::notes;
    use KeyCode::*;

    static CONFIG: KeyboardConfig = KeyboardConfig::DEFAULT;

    struct Kb {
        kb: Keyboard,
    }

    impl Kb {
        fn new() -> Self {
            Self { kb: Keyboard::new(&CONFIG, Eeconfig::default()) }
        }

        fn press(&mut self, coord: (u8, u8)) {
            self.kb.event(Event::Press(coord.0, coord.1));
        }

        fn release(&mut self, coord: (u8, u8)) {
            self.kb.event(Event::Release(coord.0, coord.1));
        }

        fn tap(&mut self, coord: (u8, u8)) {
            self.press(coord);
            self.release(coord);
        }

        fn wait(&mut self, ticks: u32) {
            for _ in 0..ticks {
                self.kb.tick();
            }
        }

        fn keys(&self) -> std::vec::Vec<KeyCode> {
            self.kb.keycodes().collect()
        }

        /// Report followed by a tick, in the order of the firmware loop
        fn report(&mut self) -> std::vec::Vec<KeyCode> {
            let keys = self.keys();
            self.kb.tick();
            keys
        }
    }

    const LOWER: (u8, u8) = (3, 4);
    const RAISE: (u8, u8) = (3, 7);
    const FN: (u8, u8) = (3, 0);
    const CAPS: (u8, u8) = (2, 0);
    const SHIFT_ENTER: (u8, u8) = (2, 11);
    const TERM: u32 = 200;

    #[test]
    fn every_custom_keycode_handled() {
        for layer in LAYERS.iter() {
            for row in layer.iter() {
                for action in row.iter() {
                    if let Custom(custom) = action {
                        let mut kb = Keyboard::new(&CONFIG, Eeconfig::default());
                        let user = process::process_record_user(action, true, &mut kb.host);
                        let quantum = user && kb.process_record_quantum(action, (0, 0), true);
                        assert!(!user || !quantum, "Custom action not handled: {:?}", custom);
                    }
                }
            }
        }
    }

    #[test]
    fn plain_key() {
        let mut kb = Kb::new();
        kb.press((1, 1));
        assert_eq!(kb.keys(), [A]);
        kb.release((1, 1));
        assert!(kb.keys().is_empty());
    }

    #[test]
    fn shifted_symbol() {
        let mut kb = Kb::new();
        kb.press(RAISE);
        kb.press((1, 1));
        assert_eq!(kb.keys(), [LShift, Kb1]);
        kb.release((1, 1));
        kb.release(RAISE);
        assert!(kb.keys().is_empty());
    }

    #[test]
    fn release_uses_action_from_press() {
        let mut kb = Kb::new();
        kb.press(LOWER);
        kb.press((0, 7));
        assert_eq!(kb.keys(), [Minus]);
        kb.release(LOWER);
        kb.release((0, 7));
        assert!(kb.keys().is_empty());
    }

    #[test]
    fn adjust_with_lower_and_raise() {
        let mut kb = Kb::new();
        kb.press(LOWER);
        kb.press(RAISE);
        assert_eq!(kb.kb.current_layer(), Layer::Adjust.index());
        kb.tap((0, 1));
        assert!(kb.keys().is_empty());
        kb.press((0, 1));
        assert_eq!(kb.keys(), [F1]);
    }

    #[test]
    fn interrupting_key_uses_layer() {
        let mut kb = Kb::new();
        kb.press(FN);
        kb.press((0, 2));
        assert_eq!(kb.keys(), [F2]);
        kb.release((0, 2));
        kb.release(FN);
        assert_eq!(kb.kb.current_layer(), Layer::Colemak.index());
    }

    #[test]
    fn locked_layer() {
        let mut kb = Kb::new();
        kb.tap(FN);
        kb.tap(FN);
        kb.wait(TERM + 1);
        assert_eq!(kb.kb.current_layer(), Layer::Fn.index());
        kb.tap((1, 1));
        kb.press((1, 1));
        assert_eq!(kb.keys(), [F5]);
        kb.release((1, 1));
        kb.tap(FN);
        kb.wait(TERM + 1);
        assert_eq!(kb.kb.current_layer(), Layer::Colemak.index());
    }

    #[test]
    fn caps_lock_on_double_tap() {
        let mut kb = Kb::new();
        kb.tap(CAPS);
        kb.press(CAPS);
        kb.wait(TERM + 1);
        assert_eq!(kb.keys(), [CapsLock]);
        kb.release(CAPS);
        assert_eq!(kb.report(), [CapsLock]);
        assert!(kb.keys().is_empty());
    }

    #[test]
    fn caps_lock_on_released_double_tap() {
        let mut kb = Kb::new();
        kb.tap(CAPS);
        kb.report();
        kb.tap(CAPS);
        let reports: std::vec::Vec<_> = (0..TERM + 2).map(|_| kb.report()).collect();
        assert_eq!(reports.iter().filter(|r| r.contains(&CapsLock)).count(), 1);
        assert!(reports.iter().all(|r| !r.contains(&LShift)));
        assert!(kb.keys().is_empty());
    }

    #[test]
    fn caps_lock_on_interrupted_double_tap() {
        let mut kb = Kb::new();
        kb.tap(CAPS);
        kb.tap(CAPS);
        kb.press((1, 1));
        assert_eq!(kb.report(), [CapsLock, A]);
        assert_eq!(kb.report(), [A]);
        kb.release((1, 1));
        assert!(kb.report().is_empty());
    }

    #[test]
    fn shift_with_interrupt() {
        let mut kb = Kb::new();
        kb.press(CAPS);
        kb.press((1, 1));
        assert_eq!(kb.keys(), [LShift, A]);
    }

    #[test]
    fn shift_enter() {
        let mut kb = Kb::new();
        kb.tap(SHIFT_ENTER);
        assert_eq!(kb.keys(), [Enter]);
        kb.wait(1);
        assert!(kb.keys().is_empty());

        kb.press(SHIFT_ENTER);
        kb.press((1, 1));
        assert_eq!(kb.keys(), [RShift, A]);
        kb.release((1, 1));
        kb.wait(200);
        kb.release(SHIFT_ENTER);
        assert!(kb.keys().is_empty());
    }

    fn adjust(kb: &mut Kb, coord: (u8, u8)) {
        kb.press(LOWER);
        kb.press(RAISE);
        kb.tap(coord);
        kb.release(RAISE);
        kb.release(LOWER);
    }

    #[test]
    fn software_colemak() {
        let mut kb = Kb::new();
        adjust(&mut kb, (0, 9));
        assert_eq!(kb.kb.take_eeconfig().map(|e| e.default_layer), Some(Layer::SwColemak.mask()));
        kb.wait(1000);
        kb.press((0, 3));
        assert_eq!(kb.keys(), [E]);
        kb.release((0, 3));
        adjust(&mut kb, (0, 8));
        kb.press((0, 3));
        assert_eq!(kb.keys(), [F]);
    }

    #[test]
    fn backlight_key() {
        let mut kb = Kb::new();
        kb.press(LOWER);
        kb.press(RAISE);
        kb.press((3, 0));
        assert_eq!(kb.keys(), [RShift]);
        kb.release((3, 0));
        assert!(kb.keys().is_empty());
        assert!(kb.kb.backlight_on(0));
        assert!(!kb.kb.backlight_on(1));
    }

    #[test]
    fn music_mode() {
        let mut kb = Kb::new();
        adjust(&mut kb, (0, 6));
        kb.wait(2000);
        kb.press((3, 9));
        assert!(kb.keys().is_empty());
        assert_eq!(kb.kb.host().audio.pitch(), Some(notes::A4));
        kb.release((3, 9));
        // Modifiers still work
        kb.press((3, 1));
        assert_eq!(kb.keys(), [LCtrl]);
        kb.release((3, 1));
        adjust(&mut kb, (0, 7));
        kb.press((3, 9));
        assert_eq!(kb.keys(), [Down]);
    }

    #[test]
    fn music_mode_toggled_while_key_held() {
        let mut kb = Kb::new();
        kb.press((1, 1));
        adjust(&mut kb, (0, 6));
        kb.release((1, 1));
        assert!(kb.keys().is_empty());

        // Note started in music mode is stopped after music mode is off
        kb.press((3, 9));
        assert_eq!(kb.kb.host().audio.pitch(), Some(notes::A4));
        adjust(&mut kb, (0, 7));
        kb.release((3, 9));
        assert!(kb.keys().is_empty());
        assert_eq!(kb.kb.host().audio.pitch(), None);
    }

    #[test]
    fn persisted_default_layer_at_boot() {
        let eeconfig = Eeconfig { default_layer: Layer::SwColemak.mask(), ..Eeconfig::default() };
        let mut kb = Kb { kb: Keyboard::new(&CONFIG, eeconfig) };
        assert_eq!(kb.kb.current_layer(), Layer::SwColemak.index());
        kb.press((0, 3));
        assert_eq!(kb.keys(), [E]);
        kb.release((0, 3));
        assert!(kb.keys().is_empty());
        assert_eq!(kb.kb.take_eeconfig(), None);
    }

    #[test]
    fn reset_reboots_after_goodbye() {
        let mut kb = Kb::new();
        adjust(&mut kb, (0, 11));
        assert!(!kb.kb.reboot_requested());
        assert!(kb.kb.tone().is_some());
        kb.wait(151);
        assert!(kb.kb.reboot_requested());
        assert!(kb.kb.tone().is_none());
    }

    #[test]
    fn startup_tone() {
        let mut kb = Kb::new();
        assert!(kb.kb.tone().is_none());
        kb.wait(21);
        assert!(kb.kb.tone().is_some());
    }

    #[test]
    fn out_of_matrix_ignored() {
        let mut kb = Kb::new();
        kb.press((4, 0));
        kb.press((0, 12));
        assert!(kb.keys().is_empty());
    }
}
