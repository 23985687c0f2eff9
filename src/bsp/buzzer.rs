//! Piezo speaker driven by toggling a GPIO from timer interrupts

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::timer::CountDown;

use crate::hal::{pac, prelude::*, rcc::Rcc, timers::{Event, Timer}};
use crate::lib::utils::InfallibleResult;
use super::BuzzerPin;

pub struct Buzzer {
    timer: Timer<pac::TIM14>,
    pin: BuzzerPin,
    high: bool,
    frequency: Option<u32>,
}

impl Buzzer {
    pub fn new(tim: pac::TIM14, mut pin: BuzzerPin, rcc: &mut Rcc) -> Self {
        pin.set_low().infallible();
        // Timer runs all the time, only the interrupt gets enabled when playing
        let timer = Timer::tim14(tim, 1.khz(), rcc);
        Self { timer, pin, high: false, frequency: None }
    }

    /// Start playing given frequency or stop on `None`
    pub fn set(&mut self, frequency: Option<u32>) {
        if self.frequency == frequency {
            return;
        }
        self.frequency = frequency;
        match frequency {
            Some(hz) if hz > 0 => {
                // Pin toggles twice per period
                self.timer.start((2 * hz).hz());
                self.timer.listen(Event::TimeOut);
            },
            _ => {
                self.timer.unlisten(Event::TimeOut);
                self.high = false;
                self.pin.set_low().infallible();
            },
        }
    }

    /// Toggle the pin, must be called from the timer interrupt
    pub fn on_interrupt(&mut self) {
        // Clears interrupt flag
        if self.timer.wait().is_ok() {
            self.high = !self.high;
            if self.high {
                self.pin.set_high().infallible();
            } else {
                self.pin.set_low().infallible();
            }
        }
    }
}
