//! Speaker tones
//!
//! Songs are defined as sequences of pitches with durations relative to the tempo.
//! [`Player`] tracks which pitch should be sounding at any time, hardware
//! drivers only need to generate a square wave of [`Player::frequency`].

pub mod notes;
mod player;
pub mod songs;

pub use notes::Pitch;
pub use player::Player;
pub use songs::{Song, Tone};
