//! Music mode: keys play notes instead of sending keycodes

use keyberon::action::Action::KeyCode;
use keyberon::key_code::KeyCode as Kc;

use crate::audio::{notes, Pitch};
use crate::layers::{Action, NROWS};
use super::host::Host;

/// Chromatic note of a key, bottom left key is C4 and each row is an octave higher
pub fn note_for((row, col): (u8, u8)) -> Pitch {
    let rows_from_bottom = (NROWS as u8 - 1).saturating_sub(row);
    notes::C4.up(12 * rows_from_bottom + col)
}

fn is_modifier(kc: Kc) -> bool {
    matches!(kc,
        Kc::LCtrl | Kc::LShift | Kc::LAlt | Kc::LGui
        | Kc::RCtrl | Kc::RShift | Kc::RAlt | Kc::RGui)
}

/// Plain keys are used for music, the rest (modifiers, layers, custom) keep working
pub fn is_music_key(action: &Action) -> bool {
    matches!(action, KeyCode(kc) if !is_modifier(*kc))
}

/// Start or stop the note of a key
pub fn play_key(coord: (u8, u8), pressed: bool, host: &mut Host) {
    let pitch = note_for(coord);
    if pressed {
        host.audio.play_note(pitch);
    } else {
        host.audio.stop_note(pitch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyboardConfig;
    use crate::eeconfig::Eeconfig;
    use crate::keyboard::actions::CustomAction;
    use keyberon::action::{k, Action::Custom};

    static CONFIG: KeyboardConfig = KeyboardConfig::DEFAULT;

    #[test]
    fn notes_layout() {
        assert_eq!(note_for((3, 0)), notes::C4);
        assert_eq!(note_for((3, 9)), notes::A4);
        assert_eq!(note_for((2, 9)), notes::A5);
        assert_eq!(note_for((0, 11)), Pitch(48 + 36 + 11));
    }

    #[test]
    fn music_keys() {
        assert!(is_music_key(&k(Kc::A)));
        assert!(is_music_key(&k(Kc::Space)));
        assert!(!is_music_key(&k(Kc::LShift)));
        assert!(!is_music_key(&Custom(CustomAction::Music(false))));
    }

    #[test]
    fn key_note_held() {
        let mut host = Host::new(&CONFIG, Eeconfig::default());
        play_key((1, 1), true, &mut host);
        assert_eq!(host.audio.pitch(), Some(notes::C4.up(25)));
        play_key((3, 0), false, &mut host);
        assert_eq!(host.audio.pitch(), Some(notes::C4.up(25)));
        play_key((1, 1), false, &mut host);
        assert_eq!(host.audio.pitch(), None);
    }
}
