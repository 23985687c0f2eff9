use crate::audio::{Player, Song};
use crate::backlight::Backlight;
use crate::config::KeyboardConfig;
use crate::eeconfig::Eeconfig;
use crate::utils::Countdown;
use super::layer_state::LayerState;
use super::registry::KeyRegistry;

/// Keyboard state that key handlers and hooks operate on
pub struct Host {
    /// Active layers
    pub layers: LayerState,
    /// Keycodes reported to the host
    pub keys: KeyRegistry,
    /// Speaker tones
    pub audio: Player,
    pub backlight: Backlight,
    /// Whether music mode is on
    pub music: bool,
    /// Time of the last ShiftEnter press
    pub(crate) shift_enter_timer: u32,
    pub(crate) startup: Countdown,
    pub(crate) shutdown: Countdown,
    eeconfig: Eeconfig,
    eeconfig_dirty: bool,
    timer: u32,
    reboot: bool,
    config: &'static KeyboardConfig,
}

impl Host {
    pub fn new(config: &'static KeyboardConfig, eeconfig: Eeconfig) -> Self {
        let levels = if config.backlight_enabled() { config.backlight.levels } else { 0 };
        Self {
            layers: LayerState::new(eeconfig.default_layer),
            keys: KeyRegistry::new(),
            audio: Player::new(config.audio_enabled(), config.audio.tempo),
            backlight: Backlight::new(levels, eeconfig.backlight),
            music: false,
            shift_enter_timer: 0,
            startup: Countdown::default(),
            shutdown: Countdown::default(),
            eeconfig,
            eeconfig_dirty: false,
            timer: 0,
            reboot: false,
            config,
        }
    }

    pub fn config(&self) -> &'static KeyboardConfig {
        self.config
    }

    /// Milliseconds since start, wraps around
    pub fn timer_read(&self) -> u32 {
        self.timer
    }

    /// Milliseconds since `since`
    pub fn timer_elapsed(&self, since: u32) -> u32 {
        self.timer.wrapping_sub(since)
    }

    pub fn play_song(&mut self, song: Song) {
        self.audio.play_song(song);
    }

    /// Set default layers and save them in persistent storage
    pub fn persistent_default_layer_set(&mut self, mask: u32) {
        info!("Default layer set to {=u32:b}", mask);
        self.layers.default_layer_set(mask);
        self.eeconfig.default_layer = mask;
        self.eeconfig_dirty = true;
    }

    /// Step backlight level and save it in persistent storage
    pub fn backlight_step(&mut self) {
        self.backlight.step();
        self.eeconfig.backlight = self.backlight.level();
        self.eeconfig_dirty = true;
    }

    /// Schedule reboot after `delay` ticks
    pub fn reboot_after(&mut self, delay: u16) {
        self.shutdown.start(delay);
    }

    /// True once reboot is due
    pub fn reboot_requested(&self) -> bool {
        self.reboot
    }

    /// Get settings if they have been modified since the last call
    pub fn take_eeconfig(&mut self) -> Option<Eeconfig> {
        if core::mem::take(&mut self.eeconfig_dirty) {
            Some(self.eeconfig)
        } else {
            None
        }
    }

    /// Advance time by one tick (1 ms)
    pub fn tick(&mut self) {
        self.timer = self.timer.wrapping_add(1);
        self.audio.tick();
        if self.startup.tick() {
            super::hooks::startup_user(self);
        }
        if self.shutdown.tick() {
            self.audio.stop_all();
            self.reboot = true;
        }
    }
}
