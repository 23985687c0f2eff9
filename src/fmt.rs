//! Logging macros
//!
//! Thin wrappers over [`defmt`] logging macros. Tests run on the host where there is
//! no defmt global logger, so in test builds the macros expand to nothing.

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(not(test))]
        defmt::trace!($($arg)*);
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(not(test))]
        defmt::debug!($($arg)*);
    }};
}

macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(not(test))]
        defmt::info!($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(not(test))]
        defmt::warn!($($arg)*);
    }};
}
