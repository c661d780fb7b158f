//! Seam between the engine and device drivers
//!
//! Drivers in `bitbus-drivers` are written against [`RegisterBus`]
//! rather than the concrete [`BusMaster`](crate::bus::BusMaster), so
//! their unit tests can substitute an in-memory bus.

use crate::bus::{Address, Error, Pointer};

/// Register-level access to devices on the bus
pub trait RegisterBus {
    /// Test for device presence (address phase only, no data)
    fn poll(&mut self, addr: Address) -> Result<(), Error>;

    /// Write `data` to the register selected by `ptr`
    fn write(&mut self, addr: Address, ptr: Pointer, data: &[u8]) -> Result<(), Error>;

    /// Read `buf.len()` bytes from the register selected by `ptr`
    fn read(&mut self, addr: Address, ptr: Pointer, buf: &mut [u8]) -> Result<(), Error>;

    /// Read back and check against `expected` without storing
    ///
    /// Succeeds only if the transport succeeds and every byte
    /// matches; used to verify that a write actually persisted.
    fn compare(&mut self, addr: Address, ptr: Pointer, expected: &[u8]) -> Result<(), Error>;
}
