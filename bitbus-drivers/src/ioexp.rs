//! PCF8574 8-bit port expander driver
//!
//! The PCF8574 has no register pointer at all: a write sets the
//! eight quasi-bidirectional port lines, a read samples them. Typical
//! non-critical consumer of the bus (indicator LEDs, keypads) where a
//! failed transfer is logged and ignored rather than retried.

use bitbus_core::{Address, Error, Pointer, RegisterBus};

/// Base address of the PCF8574 (A2..A0 strapped low)
pub const BASE_ADDRESS: u8 = 0x20;

/// PCF8574 on a [`RegisterBus`]
pub struct Pcf8574<B> {
    bus: B,
    addr: Address,
}

impl<B: RegisterBus> Pcf8574<B> {
    pub fn new(bus: B, addr: Address) -> Self {
        Self { bus, addr }
    }

    /// Give the bus back
    pub fn free(self) -> B {
        self.bus
    }

    /// Check the device answers its address
    pub fn is_present(&mut self) -> bool {
        self.bus.poll(self.addr).is_ok()
    }

    /// Drive the port lines
    ///
    /// A line written high is weakly pulled up and doubles as an
    /// input; written low it sinks current (LED on, active-low).
    pub fn write_outputs(&mut self, bits: u8) -> Result<(), Error> {
        self.bus.write(self.addr, Pointer::None, &[bits])
    }

    /// Sample the port lines
    pub fn read_inputs(&mut self) -> Result<u8, Error> {
        let mut buf = [0u8; 1];
        self.bus.read(self.addr, Pointer::None, &mut buf)?;
        Ok(buf[0])
    }
}
