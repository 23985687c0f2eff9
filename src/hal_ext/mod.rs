//! Hardware Abstraction Layer
//!
//! This module is an extension to `stm32f0xx_hal` that covers some more
//! project-specific hardware: flash emulated EEPROM and rebooting to bootloader.

pub mod flash;
pub mod reboot;
