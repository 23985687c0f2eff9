//! Predefined tone sequences

use super::notes::*;

/// Single tone of a song: a pitch or rest held for given duration
///
/// Duration is expressed in 1/64 of a beat.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tone {
    pub pitch: Option<Pitch>,
    pub duration: u16,
}

/// Song is just a static sequence of tones
pub type Song = &'static [Tone];

pub const WHOLE: u16 = 64;
pub const HALF: u16 = 32;
pub const QUARTER: u16 = 16;
pub const EIGHTH: u16 = 8;
pub const SIXTEENTH: u16 = 4;
pub const EIGHTH_DOT: u16 = EIGHTH + EIGHTH / 2;

pub const fn note(pitch: Pitch, duration: u16) -> Tone {
    Tone { pitch: Some(pitch), duration }
}

pub const fn rest(duration: u16) -> Tone {
    Tone { pitch: None, duration }
}

pub static STARTUP: Song = &[
    note(B5, 20),
    note(B6, 8),
    note(DS6, 20),
    note(B6, 8),
];

pub static QWERTY: Song = &[
    note(GS6, EIGHTH),
    note(A6, EIGHTH),
    rest(SIXTEENTH),
    note(E7, QUARTER),
];

pub static COLEMAK: Song = &[
    note(GS6, EIGHTH),
    note(A6, EIGHTH),
    rest(SIXTEENTH),
    note(E7, EIGHTH_DOT),
    rest(SIXTEENTH),
    note(GS7, EIGHTH_DOT),
];

pub static GOODBYE: Song = &[
    note(E7, EIGHTH),
    rest(SIXTEENTH),
    note(A6, EIGHTH),
    rest(SIXTEENTH),
    note(E6, EIGHTH),
    rest(SIXTEENTH),
    note(A5, EIGHTH),
];

pub static MUSIC_SCALE: Song = &[
    note(A5, EIGHTH),
    note(B5, EIGHTH),
    note(CS6, EIGHTH),
    note(D6, EIGHTH),
    note(E6, EIGHTH),
    note(FS6, EIGHTH),
    note(GS6, EIGHTH),
    note(A6, EIGHTH),
];

pub static LAYER_LOCK: Song = &[
    note(A5, EIGHTH),
    note(E6, EIGHTH),
];

/// Total duration of a song in 1/64 of a beat
pub fn duration(song: Song) -> u32 {
    song.iter().map(|t| t.duration as u32).sum()
}
