use heapless::Vec;
use keyberon::key_code::KeyCode;

/// Maximum number of keycodes registered at once
pub const MAX_KEYCODES: usize = 16;

/// Keycodes currently reported as pressed to the host
///
/// Tapped keycodes stay registered until [`KeyRegistry::flush_taps`], which is called
/// after a report has been generated, so each tap is visible in exactly one report.
#[derive(Default)]
pub struct KeyRegistry {
    keys: Vec<KeyCode, MAX_KEYCODES>,
    taps: Vec<KeyCode, MAX_KEYCODES>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kc: KeyCode) {
        if self.keys.contains(&kc) {
            return;
        }
        if self.keys.push(kc).is_err() {
            warn!("Too many registered keycodes");
        }
    }

    pub fn unregister(&mut self, kc: KeyCode) {
        self.keys.retain(|k| *k != kc);
    }

    pub fn is_registered(&self, kc: KeyCode) -> bool {
        self.keys.contains(&kc)
    }

    /// Register keycode for a single report
    pub fn tap(&mut self, kc: KeyCode) {
        self.register(kc);
        if self.taps.push(kc).is_err() {
            warn!("Too many tapped keycodes");
        }
    }

    /// Release tapped keycodes
    pub fn flush_taps(&mut self) {
        for kc in self.taps.iter() {
            self.keys.retain(|k| k != kc);
        }
        self.taps.clear();
    }

    /// Keycodes to be sent in the HID report
    pub fn keycodes(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys.iter().copied()
    }
}
