//! Build-time keyboard configuration
//!
//! Keyboard settings can be provided as a JSON file. This crate parses and validates
//! the file and generates Rust code that the firmware includes in place of the
//! configuration defined in code.

mod audio;
mod format;
mod timing;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use quote::{quote, TokenStreamExt};
use serde::{Serialize, Deserialize};
use schemars::JsonSchema;

pub use audio::AudioConfig;
pub use timing::TimingConfig;

/// Implement [`ToTokens`] for a struct by constructing the firmware type at given path
#[macro_export]
macro_rules! impl_struct_to_tokens {
    ( $( struct $name:ident: $path:path { $( $field:ident ),* $(,)? } )+ ) => {
        $(
            impl quote::ToTokens for $name {
                fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
                    $( let $field = &self.$field; )*
                    tokens.append_all(quote::quote! {
                        $path { $( $field: #$field, )* }
                    });
                }
            }
        )+
    };
}

/// Complete keyboard configuration
#[derive(Serialize, Deserialize, JsonSchema, Debug, PartialEq, Clone, Default)]
pub struct KeyboardConfig {
    /// Timing of key processing
    pub timing: TimingConfig,
    /// Speaker configuration
    pub audio: AudioConfig,
    /// Backlight configuration
    pub backlight: BacklightConfig,
}

/// Backlight configuration
#[derive(Serialize, Deserialize, JsonSchema, Debug, PartialEq, Clone)]
pub struct BacklightConfig {
    /// Number of brightness levels above "off"
    pub levels: u8,
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self { levels: 3 }
    }
}

impl_struct_to_tokens! {
    struct KeyboardConfig: crate::config::KeyboardConfig { timing, audio, backlight, }
    struct BacklightConfig: crate::config::BacklightConfig { levels, }
}

impl KeyboardConfig {
    /// Maximum number of backlight levels the software PWM can express
    pub const MAX_BACKLIGHT_LEVELS: u8 = 15;

    /// Read and validate configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Reading {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Parsing JSON config")?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the firmware misbehave
    pub fn validate(&self) -> Result<()> {
        if self.timing.tapping_term == 0 {
            bail!("timing.tapping_term must be greater than 0");
        }
        if self.timing.debounce == 0 {
            bail!("timing.debounce must be greater than 0");
        }
        if self.audio.tempo == 0 {
            bail!("audio.tempo must be greater than 0");
        }
        if self.backlight.levels > Self::MAX_BACKLIGHT_LEVELS {
            bail!("backlight.levels must not exceed {}", Self::MAX_BACKLIGHT_LEVELS);
        }
        Ok(())
    }

    /// Generate code of the `CONFIG` static
    pub fn to_code(&self) -> Result<String> {
        let config = self;
        let file = quote! {
            /// Keyboard configuration generated from JSON
            pub static CONFIG: crate::config::KeyboardConfig = #config;
        };
        format::format_file(file).context("Formatting generated code")
    }

    /// Write generated code to a file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_code()?)
            .with_context(|| format!("Writing {}", path.display()))
    }

    /// Write JSON schema of the configuration file
    pub fn schema_to_file(path: &Path) -> Result<()> {
        let schema = schemars::schema_for!(KeyboardConfig);
        let json = serde_json::to_string_pretty(&schema)?;
        fs::write(path, json)
            .with_context(|| format!("Writing {}", path.display()))
    }
}
