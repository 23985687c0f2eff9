use quote::TokenStreamExt;
use serde::{Serialize, Deserialize};
use schemars::JsonSchema;

use crate::impl_struct_to_tokens;

/// Speaker configuration
#[derive(Serialize, Deserialize, JsonSchema, Debug, PartialEq, Clone)]
pub struct AudioConfig {
    /// Play tones at all
    pub enabled: bool,
    /// Song tempo in beats per minute
    pub tempo: u16,
    /// Delay before the startup tone, gets rid of the power-on tick
    pub startup_delay: u16,
    /// Time given to the goodbye tone before rebooting
    pub shutdown_delay: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tempo: 120,
            startup_delay: 20,
            shutdown_delay: 150,
        }
    }
}

impl_struct_to_tokens! {
    struct AudioConfig: crate::config::AudioConfig { enabled, tempo, startup_delay, shutdown_delay, }
}
