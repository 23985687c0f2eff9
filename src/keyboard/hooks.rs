//! Keymap lifecycle hooks

use crate::audio::songs;
use super::host::Host;

/// Called once when the keyboard starts
pub fn matrix_init_user(host: &mut Host) {
    if host.config().audio_enabled() {
        // Delay gets rid of the power-on tick
        host.startup.start(host.config().audio.startup_delay);
    }
}

pub fn startup_user(host: &mut Host) {
    host.play_song(songs::STARTUP);
}

/// Called before rebooting to bootloader, reboot happens after the goodbye tone
pub fn shutdown_user(host: &mut Host) {
    host.play_song(songs::GOODBYE);
    host.reboot_after(host.config().audio.shutdown_delay);
}

pub fn music_on_user(host: &mut Host) {
    music_scale_user(host);
}

pub fn music_scale_user(host: &mut Host) {
    host.play_song(songs::MUSIC_SCALE);
}
