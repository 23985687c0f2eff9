use usb_device::bus::UsbBusAllocator;
use usb_device::device::{UsbDevice, UsbVidPid, UsbDeviceBuilder};
use usbd_dfu_rt::DfuRuntimeClass;

use crate::hal::usb;
use crate::hal_ext::reboot;

type Bus = usb::UsbBusType;

/// USB resources and class implementations
pub struct Usb {
    pub dev: UsbDevice<'static, Bus>,
    pub keyboard: keyberon::Class<'static, Bus, ()>,
    // this does not need to be share but it should be cleaner to have it here
    pub dfu: DfuRuntimeClass<reboot::DfuBootloader>,
}

impl Usb {
    pub fn new(bus: &'static UsbBusAllocator<Bus>) -> Self {
        // Classes
        let dfu = DfuRuntimeClass::new(bus, reboot::DfuBootloader::new(true));
        let keyboard = keyberon::new_class(bus, ());

        // Device
        // VID:PID recognised as Van Ooijen Technische Informatica:Keyboard
        let generic_keyboard = UsbVidPid(0x16c0, 0x27db);
        let dev = UsbDeviceBuilder::new(bus, generic_keyboard)
            .manufacturer("OLKB")
            .product("Planck (emilie)")
            .serial_number(env!("CARGO_PKG_VERSION"))
            .composite_with_iads()
            .build();

        Self { dev, keyboard, dfu }
    }

    /// Periodic USB poll
    pub fn poll(&mut self) -> bool {
        self.dev.poll(&mut [&mut self.keyboard, &mut self.dfu])
    }
}
