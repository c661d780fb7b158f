//! 24-series serial EEPROM driver
//!
//! Handles the two pointer widths in the family (one byte up to
//! 2 Kbit parts, two bytes from 32 Kbit up), page-boundary chunking
//! on writes, acknowledge polling during the internal write cycle,
//! and verified writes for data that must actually persist: a write
//! that was acked on the wire can still be silently corrupted, so
//! critical paths read the data back with a compare instead of
//! trusting the ack.

use bitbus_core::{Address, Error, Pointer, RegisterBus};

/// Default device address (A2..A0 strapped low)
pub const DEFAULT_ADDRESS: Address = match Address::new(0x50) {
    Some(addr) => addr,
    None => panic!("0x50 fits 7 bits"),
};

/// Presence polls tolerated during the internal write cycle
///
/// A 24-series part NACKs while its write cycle (up to 5 ms) runs;
/// polling until the first ack is the datasheet way to wait it out.
const ACK_POLL_ATTEMPTS: u32 = 100;

/// EEPROM geometry and addressing
#[derive(Debug, Clone, Copy)]
pub struct EepromConfig {
    /// 7-bit device address
    pub address: Address,
    /// Two-byte register pointer (parts of 32 Kbit and larger)
    pub wide_pointer: bool,
    /// Write page size in bytes; zero is treated as single-byte pages
    pub page_size: usize,
}

impl Default for EepromConfig {
    fn default() -> Self {
        // 24C32 and friends: 32 Kbit, two-byte pointer, 32-byte pages
        Self {
            address: DEFAULT_ADDRESS,
            wide_pointer: true,
            page_size: 32,
        }
    }
}

/// 24-series serial EEPROM on a [`RegisterBus`]
pub struct Eeprom24x<B> {
    bus: B,
    config: EepromConfig,
}

impl<B: RegisterBus> Eeprom24x<B> {
    /// Create a driver for the device described by `config`
    pub fn new(bus: B, mut config: EepromConfig) -> Self {
        // The chunker divides by the page size
        config.page_size = config.page_size.max(1);
        Self { bus, config }
    }

    /// Give the bus back
    pub fn free(self) -> B {
        self.bus
    }

    /// Check the device answers its address
    pub fn is_present(&mut self) -> bool {
        self.bus.poll(self.config.address).is_ok()
    }

    /// Read `buf.len()` bytes starting at `offset`
    pub fn read(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), Error> {
        self.bus.read(self.config.address, self.pointer(offset), buf)
    }

    /// Write `data` starting at `offset`
    ///
    /// Split on page boundaries; each page write is followed by
    /// acknowledge polling so the next one does not land during the
    /// device's internal write cycle.
    pub fn write(&mut self, offset: u16, data: &[u8]) -> Result<(), Error> {
        let mut offset = offset;
        let mut data = data;
        while !data.is_empty() {
            let room = self.config.page_size - (offset as usize % self.config.page_size);
            let chunk = room.min(data.len());
            self.bus
                .write(self.config.address, self.pointer(offset), &data[..chunk])?;
            self.wait_write_cycle()?;
            offset = offset.wrapping_add(chunk as u16);
            data = &data[chunk..];
        }
        Ok(())
    }

    /// Read back and check `expected` without storing it
    pub fn verify(&mut self, offset: u16, expected: &[u8]) -> Result<(), Error> {
        self.bus
            .compare(self.config.address, self.pointer(offset), expected)
    }

    /// Write and confirm the device persisted the bytes unchanged
    ///
    /// The pattern for anything that must survive a power cycle:
    /// [`Error::Mismatch`] here means silent corruption a plain write
    /// would not have noticed.
    pub fn write_verified(&mut self, offset: u16, data: &[u8]) -> Result<(), Error> {
        self.write(offset, data)?;
        self.verify(offset, data)
    }

    fn pointer(&self, offset: u16) -> Pointer {
        if self.config.wide_pointer {
            Pointer::Long(offset)
        } else {
            Pointer::Short(offset as u8)
        }
    }

    /// Poll until the internal write cycle finishes
    ///
    /// A timeout is passed through immediately: a held bus will not
    /// recover by polling harder.
    fn wait_write_cycle(&mut self) -> Result<(), Error> {
        let mut last = Ok(());
        for _ in 0..ACK_POLL_ATTEMPTS {
            last = self.bus.poll(self.config.address);
            match last {
                Ok(()) => return Ok(()),
                Err(Error::Timeout) => return last,
                Err(_) => {}
            }
        }
        last
    }
}
