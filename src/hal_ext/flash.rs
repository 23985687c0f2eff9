//! Persistent storage in the last page of the internal flash
//!
//! Page location must match the EEPROM region from `memory.x`.

use core::ptr;

use crate::hal::pac;
use crate::lib::eeconfig::Storage;

const PAGE_ADDR: u32 = 0x0801_f800;
const PAGE_SIZE: usize = 2048;

const KEY1: u32 = 0x4567_0123;
const KEY2: u32 = 0xcdef_89ab;

#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum FlashError {
    /// Flash controller did not unlock
    Locked,
    /// Programming a location that has not been erased
    Program,
    /// Writing to a write protected page
    WriteProtect,
    /// Data does not fit into the page
    TooLarge,
}

pub struct FlashStorage {
    flash: pac::FLASH,
}

impl FlashStorage {
    pub fn new(flash: pac::FLASH) -> Self {
        Self { flash }
    }

    fn unlock(&mut self) -> Result<(), FlashError> {
        if self.flash.cr.read().lock().bit_is_set() {
            self.flash.keyr.write(|w| unsafe { w.fkeyr().bits(KEY1) });
            self.flash.keyr.write(|w| unsafe { w.fkeyr().bits(KEY2) });
        }
        if self.flash.cr.read().lock().bit_is_set() {
            Err(FlashError::Locked)
        } else {
            Ok(())
        }
    }

    fn lock(&mut self) {
        self.flash.cr.modify(|_, w| w.lock().set_bit());
    }

    fn wait(&self) -> Result<(), FlashError> {
        while self.flash.sr.read().bsy().bit_is_set() {}
        let sr = self.flash.sr.read();
        // Status flags are cleared by writing 1
        self.flash.sr.write(|w| w.eop().set_bit().pgerr().set_bit().wrprt().set_bit());
        if sr.pgerr().bit_is_set() {
            Err(FlashError::Program)
        } else if sr.wrprt().bit_is_set() {
            Err(FlashError::WriteProtect)
        } else {
            Ok(())
        }
    }

    fn erase_page(&mut self) -> Result<(), FlashError> {
        self.flash.cr.modify(|_, w| w.per().set_bit());
        self.flash.ar.write(|w| unsafe { w.far().bits(PAGE_ADDR) });
        self.flash.cr.modify(|_, w| w.strt().set_bit());
        let result = self.wait();
        self.flash.cr.modify(|_, w| w.per().clear_bit());
        result
    }

    fn program(&mut self, data: &[u8]) -> Result<(), FlashError> {
        self.flash.cr.modify(|_, w| w.pg().set_bit());
        // Flash is programmed in half-words, odd tail is padded with erased value
        let result = data.chunks(2).enumerate().try_for_each(|(i, chunk)| {
            let half = u16::from_le_bytes([chunk[0], chunk.get(1).copied().unwrap_or(0xff)]);
            let addr = (PAGE_ADDR as usize + 2 * i) as *mut u16;
            unsafe { ptr::write_volatile(addr, half) };
            self.wait()
        });
        self.flash.cr.modify(|_, w| w.pg().clear_bit());
        result
    }
}

impl Storage for FlashStorage {
    type Error = FlashError;

    fn read(&mut self, buf: &mut [u8]) -> Result<(), FlashError> {
        if buf.len() > PAGE_SIZE {
            return Err(FlashError::TooLarge);
        }
        let src = PAGE_ADDR as *const u8;
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = unsafe { ptr::read_volatile(src.add(i)) };
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), FlashError> {
        if data.len() > PAGE_SIZE {
            return Err(FlashError::TooLarge);
        }
        self.unlock()?;
        let result = self.erase_page().and_then(|_| self.program(data));
        self.lock();
        result
    }
}
