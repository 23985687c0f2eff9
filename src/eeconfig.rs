//! Persistent keyboard settings
//!
//! Settings are serialized with [`postcard`] using COBS framing so that the end of
//! data can be found in erased memory and any garbage fails to decode.

use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use crate::layers::Layer;

/// Settings that survive power cycles
#[derive(Serialize, Deserialize, MaxSize, Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub struct Eeconfig {
    /// Marks initialized storage
    pub magic: u16,
    /// Default layer bitmask
    pub default_layer: u32,
    /// Backlight brightness level
    pub backlight: u8,
}

/// Size of buffer needed for COBS-encoded [`Eeconfig`] with the sentinel byte
pub const BUF_SIZE: usize = Eeconfig::POSTCARD_MAX_SIZE + Eeconfig::POSTCARD_MAX_SIZE / 254 + 2;

/// Non-volatile memory that holds the settings
pub trait Storage {
    type Error;

    /// Fill `buf` with data from the beginning of storage
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Replace storage contents with `data`
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub enum Error {
    /// Storage access failed
    Storage,
    /// Serialization failed
    Encode,
    /// No valid data found
    Decode,
    /// Data decoded but has not been written by this firmware
    InvalidMagic,
}

impl Default for Eeconfig {
    fn default() -> Self {
        Self {
            magic: Self::MAGIC,
            default_layer: Layer::Colemak.mask(),
            backlight: 0,
        }
    }
}

impl Eeconfig {
    pub const MAGIC: u16 = 0xFEED;

    /// Read settings from storage
    pub fn load<S: Storage>(storage: &mut S) -> Result<Self, Error> {
        let mut buf = [0u8; BUF_SIZE];
        storage.read(&mut buf).map_err(|_| Error::Storage)?;
        let end = buf.iter().position(|b| *b == 0).ok_or(Error::Decode)?;
        let config: Self = postcard::from_bytes_cobs(&mut buf[..=end])
            .map_err(|_| Error::Decode)?;
        if config.magic != Self::MAGIC {
            return Err(Error::InvalidMagic);
        }
        Ok(config)
    }

    /// Read settings from storage, use defaults if there are no valid settings
    pub fn load_or_default<S: Storage>(storage: &mut S) -> Self {
        match Self::load(storage) {
            Ok(config) => {
                info!("Loaded eeconfig: {}", config);
                config
            },
            Err(e) => {
                warn!("Could not load eeconfig: {}, using defaults", e);
                Self::default()
            },
        }
    }

    /// Write settings to storage
    pub fn store<S: Storage>(&self, storage: &mut S) -> Result<(), Error> {
        let mut buf = [0u8; BUF_SIZE];
        let data = postcard::to_slice_cobs(self, &mut buf).map_err(|_| Error::Encode)?;
        storage.write(data).map_err(|_| Error::Storage)
    }
}
