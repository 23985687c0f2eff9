//! Keyboard configuration
//!
//! By default the configuration is defined in code. With the `json-config` feature it is
//! generated by the build script from a JSON file (see the `emilie-config` crate).

#[cfg(feature = "json-config")]
pub use generated::CONFIG;

#[cfg(not(feature = "json-config"))]
pub use code::CONFIG;

#[cfg(feature = "json-config")]
mod generated {
    include!(concat!(env!("OUT_DIR"), "/config.rs"));
}

#[cfg(not(feature = "json-config"))]
mod code {
    use super::KeyboardConfig;

    pub static CONFIG: KeyboardConfig = KeyboardConfig::DEFAULT;
}

/// Complete keyboard configuration
pub struct KeyboardConfig {
    /// Timing of key processing
    pub timing: TimingConfig,
    /// Speaker configuration
    pub audio: AudioConfig,
    /// Backlight configuration
    pub backlight: BacklightConfig,
}

/// Timing of key processing, in keyboard ticks (milliseconds)
pub struct TimingConfig {
    /// Time after which a tap dance is considered finished
    pub tapping_term: u16,
    /// Number of consecutive stable matrix scans before a key state changes
    pub debounce: u16,
}

/// Speaker configuration
pub struct AudioConfig {
    /// Play tones at all, only has effect with the `audio` feature
    pub enabled: bool,
    /// Song tempo in beats per minute
    pub tempo: u16,
    /// Delay before the startup tone, gets rid of the power-on tick
    pub startup_delay: u16,
    /// Time given to the goodbye tone before rebooting
    pub shutdown_delay: u16,
}

/// Backlight configuration
pub struct BacklightConfig {
    /// Number of brightness levels above "off"
    pub levels: u8,
}

impl KeyboardConfig {
    pub const DEFAULT: Self = Self {
        timing: TimingConfig {
            tapping_term: 200,
            debounce: 5,
        },
        audio: AudioConfig {
            enabled: true,
            tempo: 120,
            startup_delay: 20,
            shutdown_delay: 150,
        },
        backlight: BacklightConfig {
            levels: 3,
        },
    };

    /// Whether tones should be played
    pub const fn audio_enabled(&self) -> bool {
        cfg!(feature = "audio") && self.audio.enabled
    }

    /// Whether backlight is present
    pub const fn backlight_enabled(&self) -> bool {
        cfg!(feature = "backlight") && self.backlight.levels > 0
    }
}
