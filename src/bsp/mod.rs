//! Board support package
//!
//! Code that builds on top of MCU-specific HAL (hal and hal_ext) to implement
//! support for the board and the peripherals located on it.

pub mod buzzer;
pub mod usb;

use crate::hal::gpio;

pub type ColPin = gpio::Pin<gpio::Input<gpio::PullUp>>;
pub type RowPin = gpio::Pin<gpio::Output<gpio::PushPull>>;
pub type BuzzerPin = gpio::gpioa::PA8<gpio::Output<gpio::PushPull>>;
pub type BacklightPin = gpio::gpiob::PB4<gpio::Output<gpio::PushPull>>;
