use quote::TokenStreamExt;
use serde::{Serialize, Deserialize};
use schemars::JsonSchema;

use crate::impl_struct_to_tokens;

/// Timing of key processing, in keyboard ticks (milliseconds)
#[derive(Serialize, Deserialize, JsonSchema, Debug, PartialEq, Clone)]
pub struct TimingConfig {
    /// Time after which a tap dance is considered finished
    pub tapping_term: u16,
    /// Number of consecutive stable matrix scans before a key state changes
    pub debounce: u16,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tapping_term: 200,
            debounce: 5,
        }
    }
}

impl_struct_to_tokens! {
    struct TimingConfig: crate::config::TimingConfig { tapping_term, debounce, }
}
