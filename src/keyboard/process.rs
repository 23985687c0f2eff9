//! Keymap-specific handling of custom keycodes

use keyberon::action::Action::Custom;
use keyberon::key_code::KeyCode;

use crate::audio::songs;
use crate::layers::{Action, Layer};
use super::actions::CustomAction;
use super::host::Host;

/// ShiftEnter released within this time (ms) sends Enter
pub const SHIFT_ENTER_TAP_TERM: u32 = 152;

/// Handle key event before the default processing, returns false to skip it
pub fn process_record_user(action: &Action, pressed: bool, host: &mut Host) -> bool {
    let Custom(custom) = action else {
        return true;
    };
    match custom {
        CustomAction::DefaultLayer(layer) => {
            if pressed {
                let song = match layer {
                    Layer::SwColemak => songs::QWERTY,
                    _ => songs::COLEMAK,
                };
                host.play_song(song);
                host.persistent_default_layer_set(layer.mask());
            }
            false
        },
        CustomAction::Backlight => {
            if pressed {
                host.keys.register(KeyCode::RShift);
                host.backlight_step();
            } else {
                host.keys.unregister(KeyCode::RShift);
            }
            false
        },
        CustomAction::ShiftEnter => {
            if pressed {
                host.keys.register(KeyCode::RShift);
                host.shift_enter_timer = host.timer_read();
            } else {
                host.keys.unregister(KeyCode::RShift);
                if host.timer_elapsed(host.shift_enter_timer) < SHIFT_ENTER_TAP_TERM {
                    host.keys.tap(KeyCode::Enter);
                }
            }
            false
        },
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::notes::*;
    use crate::config::KeyboardConfig;
    use crate::eeconfig::Eeconfig;
    use keyberon::action::k;

    static CONFIG: KeyboardConfig = KeyboardConfig::DEFAULT;

    fn host() -> Host {
        Host::new(&CONFIG, Eeconfig::default())
    }

    fn custom(action: CustomAction) -> Action {
        Custom(action)
    }

    fn keys(host: &Host) -> std::vec::Vec<KeyCode> {
        host.keys.keycodes().collect()
    }

    #[test]
    fn tap_threshold() {
        assert_eq!(SHIFT_ENTER_TAP_TERM, 152);
    }

    #[test]
    fn plain_keys_pass_through() {
        let mut host = host();
        assert!(process_record_user(&k(KeyCode::A), true, &mut host));
        assert!(process_record_user(&custom(CustomAction::Reset), true, &mut host));
        assert!(keys(&host).is_empty());
    }

    #[test]
    fn persistent_default_layer() {
        let mut host = host();
        let action = custom(CustomAction::DefaultLayer(Layer::SwColemak));
        assert!(!process_record_user(&action, true, &mut host));
        assert_eq!(host.layers.default_layers(), Layer::SwColemak.mask());
        assert_eq!(host.audio.pitch(), Some(GS6));
        assert_eq!(host.take_eeconfig().map(|e| e.default_layer), Some(Layer::SwColemak.mask()));
        assert!(!process_record_user(&action, false, &mut host));
        assert_eq!(host.take_eeconfig(), None);

        let action = custom(CustomAction::DefaultLayer(Layer::Colemak));
        assert!(!process_record_user(&action, true, &mut host));
        assert_eq!(host.layers.default_layers(), Layer::Colemak.mask());
    }

    #[test]
    fn backlight_holds_shift() {
        let mut host = host();
        let action = custom(CustomAction::Backlight);
        assert!(!process_record_user(&action, true, &mut host));
        assert_eq!(keys(&host), [KeyCode::RShift]);
        assert_eq!(host.backlight.level(), 1);
        assert!(!process_record_user(&action, false, &mut host));
        assert!(keys(&host).is_empty());
        assert_eq!(host.backlight.level(), 1);
    }

    fn shift_enter(hold: u32) -> std::vec::Vec<KeyCode> {
        let mut host = host();
        let action = custom(CustomAction::ShiftEnter);
        assert!(!process_record_user(&action, true, &mut host));
        assert_eq!(keys(&host), [KeyCode::RShift]);
        for _ in 0..hold {
            host.tick();
        }
        assert!(!process_record_user(&action, false, &mut host));
        keys(&host)
    }

    #[test]
    fn shift_enter_tap() {
        assert_eq!(shift_enter(0), [KeyCode::Enter]);
        assert_eq!(shift_enter(151), [KeyCode::Enter]);
    }

    #[test]
    fn shift_enter_hold() {
        assert!(shift_enter(152).is_empty());
        assert!(shift_enter(1000).is_empty());
    }
}
