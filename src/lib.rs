#![no_std]

// Use std when running tests, see: https://stackoverflow.com/a/28186509
// Make sure to use different target when testing, e.g.
//   cargo test --target x86_64-unknown-linux-gnu
#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod fmt;

pub mod audio;
pub mod backlight;
pub mod config;
pub mod eeconfig;
pub mod keyboard;
pub mod layers;
pub mod utils;

/// Build metadata generated by the build script
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
