#![no_main]
#![no_std]

use panic_probe as _;
use defmt_rtt as _;
use stm32f0xx_hal as hal;
use planck_emilie as lib;

mod bsp;
mod hal_ext;

#[rtic::app(device = crate::hal::pac, dispatchers = [CEC_CAN, USART3_4])]
mod app {
    use cortex_m::interrupt::free as ifree;
    use embedded_hal::digital::v2::OutputPin;
    use systick_monotonic::ExtU64;
    use super::hal;
    use hal::prelude::*;
    use keyberon::key_code::KbHidReport;
    use usb_device::{prelude::*, class_prelude::UsbBusAllocator};

    use super::{bsp, hal_ext, lib};
    use bsp::{buzzer::Buzzer, usb::Usb};
    use hal_ext::flash::FlashStorage;
    use lib::config::CONFIG;
    use lib::eeconfig::Eeconfig;
    use lib::keyboard::{Keyboard, Keys};
    use lib::utils::InfallibleResult;

    /// Time after the last change before settings are written to flash
    const PERSIST_DELAY_MS: u64 = 1000;

    #[shared]
    struct Shared {
        usb: Usb,
        buzzer: Buzzer,
    }

    #[local]
    struct Local {
        timer: hal::timers::Timer<hal::pac::TIM15>,
        keyboard: Keyboard,
        keys: Keys<bsp::ColPin, bsp::RowPin>,
        backlight: bsp::BacklightPin,
        storage: FlashStorage,
    }

    #[monotonic(binds = SysTick, default = true)]
    type Mono = systick_monotonic::Systick<MONO_HZ>;
    pub const MONO_HZ: u32 = 1000;

    #[init(local = [
        usb_bus: Option<UsbBusAllocator<hal::usb::UsbBusType>> = None,
    ])]
    fn init(cx: init::Context) -> (Shared, Local, init::Monotonics) {
        let mut core = cx.core;
        let mut dev = cx.device;

        // Automatically enter sleep mode when leaving an ISR
        if cfg!(feature = "idle-sleep") {
            core.SCB.set_sleeponexit();
        }

        // Clock configuration
        let sysclk: hal::time::Hertz = 48.mhz().into();
        let pclk: hal::time::Hertz = 24.mhz().into();

        let mut rcc = dev.RCC
            .configure()
            .enable_crs(dev.CRS) // synchronization to USB SOF
            .hsi48()
            .sysclk(sysclk)
            .pclk(pclk)
            .freeze(&mut dev.FLASH);

        // Pinout
        let gpioa = dev.GPIOA.split(&mut rcc);
        let gpiob = dev.GPIOB.split(&mut rcc);

        // Keyboard matrix
        let cols = ifree(|cs| [
            gpioa.pa0.into_pull_up_input(cs).downgrade(),
            gpioa.pa1.into_pull_up_input(cs).downgrade(),
            gpioa.pa2.into_pull_up_input(cs).downgrade(),
            gpioa.pa3.into_pull_up_input(cs).downgrade(),
            gpioa.pa4.into_pull_up_input(cs).downgrade(),
            gpioa.pa5.into_pull_up_input(cs).downgrade(),
            gpioa.pa6.into_pull_up_input(cs).downgrade(),
            gpioa.pa7.into_pull_up_input(cs).downgrade(),
            gpiob.pb0.into_pull_up_input(cs).downgrade(),
            gpiob.pb1.into_pull_up_input(cs).downgrade(),
            gpiob.pb2.into_pull_up_input(cs).downgrade(),
            gpiob.pb10.into_pull_up_input(cs).downgrade(),
        ]);
        let rows = ifree(|cs| [
            gpiob.pb12.into_push_pull_output(cs).downgrade(),
            gpiob.pb13.into_push_pull_output(cs).downgrade(),
            gpiob.pb14.into_push_pull_output(cs).downgrade(),
            gpiob.pb15.into_push_pull_output(cs).downgrade(),
        ]);
        let keys = Keys::new(cols, rows, CONFIG.timing.debounce);

        // Speaker and backlight
        let buzzer_pin = ifree(|cs| gpioa.pa8.into_push_pull_output(cs));
        let buzzer = Buzzer::new(dev.TIM14, buzzer_pin, &mut rcc);
        let mut backlight = ifree(|cs| gpiob.pb4.into_push_pull_output(cs));
        backlight.set_low().infallible();

        // configure periodic timer
        let mut timer = hal::timers::Timer::tim15(dev.TIM15, 1.khz(), &mut rcc);
        timer.listen(hal::timers::Event::TimeOut);

        // USB
        let usb = hal::usb::Peripheral {
            usb: dev.USB,
            pin_dp: gpioa.pa12,
            pin_dm: gpioa.pa11,
        };
        let usb_bus = cx.local.usb_bus.insert(hal::usb::UsbBus::new(usb));
        let usb = Usb::new(usb_bus);

        // Settings from the emulated EEPROM
        let mut storage = FlashStorage::new(dev.FLASH);
        let eeconfig = Eeconfig::load_or_default(&mut storage);

        let keyboard = Keyboard::new(&CONFIG, eeconfig);

        defmt::info!("Liftoff! {=str} {=str}", lib::built_info::PKG_NAME, lib::built_info::PKG_VERSION);
        if let Some(git) = lib::built_info::GIT_VERSION {
            defmt::debug!("Git version: {=str}", git);
        }
        defmt::debug!("Size of: keyboard={=usize}", core::mem::size_of_val(&keyboard));

        let shared = Shared {
            usb,
            buzzer,
        };

        let local = Local {
            timer,
            keyboard,
            keys,
            backlight,
            storage,
        };

        let mono = systick_monotonic::Systick::new(core.SYST, sysclk.0);

        (shared, local, init::Monotonics(mono))
    }

    #[task(binds = TIM15, priority = 4, local = [timer, t: u32 = 0])]
    fn tick(cx: tick::Context) {
        // Clears interrupt flag
        if cx.local.timer.wait().is_ok() {
            let t = cx.local.t;
            *t = t.wrapping_add(1);

            if keyboard_tick::spawn(*t).is_err() {
                defmt::error!("Spawn failed: keyboard_tick");
            }
        }
    }

    /// Speaker square wave
    #[task(binds = TIM14, priority = 4, shared = [buzzer])]
    fn buzzer_toggle(mut cx: buzzer_toggle::Context) {
        cx.shared.buzzer.lock(|buzzer| buzzer.on_interrupt());
    }

    /// USB poll
    ///
    /// On an USB interrput we need to handle all classes and receive/send proper data.
    /// This is always a response to USB host polling because host initializes all transactions.
    #[task(binds = USB, priority = 3, shared = [usb])]
    fn usb_poll(mut cx: usb_poll::Context) {
        cx.shared.usb.lock(|usb| {
            // UsbDevice.poll()->UsbBus.poll() inspects and clears USB interrupt flags.
            let _was_packet = usb.poll();
        });
    }

    #[task(priority = 2, capacity = 1, shared = [usb, buzzer], local = [
        keyboard,
        keys,
        backlight,
        persist_handle: Option<persist::SpawnHandle> = None,
    ])]
    fn keyboard_tick(cx: keyboard_tick::Context, t: u32) {
        let keyboard_tick::SharedResources { mut usb, mut buzzer } = cx.shared;
        let keyboard = cx.local.keyboard;

        for event in cx.local.keys.scan() {
            keyboard.event(event);
        }
        let report: KbHidReport = keyboard.keycodes().collect();
        keyboard.tick();

        // Outputs
        let frequency = keyboard.tone().map(|pitch| pitch.frequency_hz());
        buzzer.lock(|buzzer| buzzer.set(frequency));
        if keyboard.backlight_on(t) {
            cx.local.backlight.set_high().infallible();
        } else {
            cx.local.backlight.set_low().infallible();
        }

        // Delay flash writes until settings stop changing
        if let Some(eeconfig) = keyboard.take_eeconfig() {
            let handle = cx.local.persist_handle;
            if let Some(old) = handle.take() {
                old.cancel().ok();
            }
            match persist::spawn_after(PERSIST_DELAY_MS.millis(), eeconfig) {
                Ok(new) => *handle = Some(new),
                Err(_) => defmt::warn!("Spawn failed: persist"),
            }
        }

        if keyboard.reboot_requested() {
            defmt::info!("Rebooting to bootloader");
            usb.lock(|usb| unsafe {
                hal_ext::reboot::reboot(true, Some(usb.dev.bus()))
            });
        }

        // Set current USB report to the new one, finish if there is no change
        let usb_state = usb.lock(|usb| usb.dev.state());
        if usb_state != UsbDeviceState::Configured {
            return
        }
        if !usb.lock(|usb| usb.keyboard.device_mut().set_keyboard_report(report.clone())) {
            return
        }
        // Spin until we are able to send the report.
        // Important: lock separately in each loop iterations and use higher priority for usb_poll
        // to avoid not-so-dead locks (tick may be running all the time preventing usb_poll).
        while let Ok(0) = usb.lock(|usb| usb.keyboard.write(report.as_bytes())) {}
    }

    #[task(priority = 1, local = [storage])]
    fn persist(cx: persist::Context, eeconfig: Eeconfig) {
        match eeconfig.store(cx.local.storage) {
            Ok(()) => defmt::debug!("Settings stored"),
            Err(e) => defmt::error!("Storing settings failed: {}", e),
        }
    }

    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        loop {
            if cfg!(feature = "idle-sleep") {
                rtic::export::wfi();
            } else {
                rtic::export::nop();
            }
        }
    }
}
