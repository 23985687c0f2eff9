use super::notes::Pitch;
use super::songs::{Song, Tone};

const TICK_US: u32 = 1000;

/// Progress of the currently played song
struct Playing {
    song: Song,
    index: usize,
    remaining_us: u32,
}

/// Tone player advanced by 1 ms ticks
///
/// Player only decides which pitch should sound at a given time, actual sound
/// generation is done by the caller. Sustained note (music mode) takes
/// precedence over a song.
pub struct Player {
    enabled: bool,
    unit_us: u32,
    playing: Option<Playing>,
    sustained: Option<Pitch>,
}

impl Player {
    /// Create player with given tempo in beats per minute
    pub fn new(enabled: bool, tempo: u16) -> Self {
        Self {
            enabled,
            unit_us: Self::unit_us(tempo),
            playing: None,
            sustained: None,
        }
    }

    /// Duration of 1/64 of a beat in microseconds
    fn unit_us(tempo: u16) -> u32 {
        60_000_000 / (tempo.max(1) as u32 * 64)
    }

    fn tone_us(&self, tone: &Tone) -> u32 {
        tone.duration as u32 * self.unit_us
    }

    /// Start playing a song, interrupting the current one
    pub fn play_song(&mut self, song: Song) {
        if !self.enabled {
            return;
        }
        self.playing = self.start(song, 0);
    }

    fn start(&self, song: Song, index: usize) -> Option<Playing> {
        let tone = song.get(index)?;
        Some(Playing { song, index, remaining_us: self.tone_us(tone) })
    }

    /// Sustain a note until [`Self::stop_note`]
    pub fn play_note(&mut self, pitch: Pitch) {
        if self.enabled {
            self.sustained = Some(pitch);
        }
    }

    pub fn stop_note(&mut self, pitch: Pitch) {
        if self.sustained == Some(pitch) {
            self.sustained = None;
        }
    }

    pub fn stop_all(&mut self) {
        self.playing = None;
        self.sustained = None;
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some() || self.sustained.is_some()
    }

    /// Advance time by 1 ms
    pub fn tick(&mut self) {
        let Some(playing) = self.playing.as_mut() else {
            return;
        };
        playing.remaining_us = playing.remaining_us.saturating_sub(TICK_US);
        if playing.remaining_us == 0 {
            let (song, next) = (playing.song, playing.index + 1);
            self.playing = self.start(song, next);
        }
    }

    /// Pitch that should currently sound
    pub fn pitch(&self) -> Option<Pitch> {
        self.sustained.or_else(|| {
            let playing = self.playing.as_ref()?;
            playing.song[playing.index].pitch
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::notes::*;
    use crate::audio::songs::{self, note, rest};

    /// Run player until the song ends, collecting (pitch, ticks) segments
    fn record(player: &mut Player) -> std::vec::Vec<(Option<Pitch>, u32)> {
        let mut segments = std::vec::Vec::new();
        let mut ticks = 0;
        while player.is_playing() {
            let pitch = player.pitch();
            player.tick();
            ticks += 1;
            if player.pitch() != pitch || !player.is_playing() {
                segments.push((pitch, ticks));
                ticks = 0;
            }
            assert!(segments.len() < 100, "Song never ends");
        }
        segments
    }

    #[test]
    fn tempo_unit() {
        assert_eq!(Player::unit_us(120), 7812);
        assert_eq!(Player::unit_us(60), 15625);
    }

    #[test]
    fn plays_startup() {
        let mut player = Player::new(true, 120);
        player.play_song(songs::STARTUP);
        assert_eq!(player.pitch(), Some(B5));
        // 20 units = 156.24 ms, rounded up to full ticks
        assert_eq!(record(&mut player), [
            (Some(B5), 157),
            (Some(B6), 63),
            (Some(DS6), 157),
            (Some(B6), 63),
        ]);
        assert_eq!(player.pitch(), None);
    }

    #[test]
    fn rests_are_silent() {
        static SONG: songs::Song = &[note(A4, 4), rest(4), note(A5, 4)];
        let mut player = Player::new(true, 120);
        player.play_song(SONG);
        assert_eq!(record(&mut player), [
            (Some(A4), 32),
            (None, 32),
            (Some(A5), 32),
        ]);
    }

    #[test]
    fn sustained_note_has_priority() {
        let mut player = Player::new(true, 120);
        player.play_song(songs::MUSIC_SCALE);
        player.play_note(C4);
        assert_eq!(player.pitch(), Some(C4));
        player.stop_note(A4);
        assert_eq!(player.pitch(), Some(C4));
        player.stop_note(C4);
        assert_eq!(player.pitch(), Some(A5));
        player.stop_all();
        assert!(!player.is_playing());
    }

    #[test]
    fn disabled_player_is_silent() {
        let mut player = Player::new(false, 120);
        player.play_song(songs::STARTUP);
        player.play_note(C4);
        assert!(!player.is_playing());
        assert_eq!(player.pitch(), None);
    }
}
