//! Bus-master engine
//!
//! Composes the line-level primitives in `wire` into the four
//! register-level operations: presence poll, write, read, and
//! write-verification compare. Each operation takes an explicit
//! [`Pointer`] selecting the register addressing width, so devices
//! with different pointer widths can be interleaved freely.
//!
//! The engine is strictly single-transaction: it holds no queue and
//! no lock, and a new operation must not be issued before the
//! previous one has returned. Every failure path still completes the
//! stop condition, so the bus is always left idle.

mod wire;

use bitbus_hal::{BitDelay, OpenDrainLine, Watchdog};

use crate::traits::RegisterBus;

/// Bus operation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The addressed peripheral is absent or declined the byte
    /// (explicit negative acknowledgment)
    Nack,
    /// A peripheral held a line beyond the watchdog bound
    Timeout,
    /// A compare operation completed but the data differed
    Mismatch,
}

/// 7-bit device address
///
/// The read/write direction bit is appended during transmission and
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(u8);

impl Address {
    /// Create an address, rejecting values outside the 7-bit space
    pub const fn new(addr: u8) -> Option<Self> {
        if addr < 0x80 {
            Some(Self(addr))
        } else {
            None
        }
    }

    /// The raw 7-bit value
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Header byte selecting the write direction
    pub(crate) const fn write_header(self) -> u8 {
        self.0 << 1
    }

    /// Header byte selecting the read direction
    pub(crate) const fn read_header(self) -> u8 {
        (self.0 << 1) | 1
    }
}

/// Register pointer sent after the device address
///
/// Passed per call rather than configured globally, so callers never
/// have to re-configure a shared width setting between devices of
/// different pointer widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pointer {
    /// No register pointer (device-only addressing)
    None,
    /// One-byte register pointer
    Short(u8),
    /// Two-byte register pointer, transmitted high byte first
    Long(u16),
}

impl Pointer {
    /// Check for the pointer-less variant
    pub const fn is_none(self) -> bool {
        matches!(self, Pointer::None)
    }

    /// Wire encoding: buffer and number of valid bytes
    pub(crate) const fn encode(self) -> ([u8; 2], usize) {
        match self {
            Pointer::None => ([0, 0], 0),
            Pointer::Short(reg) => ([reg, 0], 1),
            Pointer::Long(reg) => ([(reg >> 8) as u8, reg as u8], 2),
        }
    }
}

/// Bit-banged bus master over two open-drain lines
///
/// Generic over the SCL and SDA lines, the bit-timing delay, and the
/// watchdog bounding peripheral-driven waits. The firmware
/// instantiates it with real pins and a [`crate::tick::WatchdogHandle`];
/// the integration tests instantiate it against a simulated bus.
pub struct BusMaster<Scl, Sda, D, W> {
    scl: Scl,
    sda: Sda,
    delay: D,
    watchdog: W,
}

impl<Scl, Sda, D, W> BusMaster<Scl, Sda, D, W>
where
    Scl: OpenDrainLine,
    Sda: OpenDrainLine,
    D: BitDelay,
    W: Watchdog,
{
    /// Take ownership of the bus lines and leave them idle (released)
    pub fn new(mut scl: Scl, mut sda: Sda, delay: D, watchdog: W) -> Self {
        scl.release();
        sda.release();
        Self {
            scl,
            sda,
            delay,
            watchdog,
        }
    }

    /// Release the lines and give the parts back
    pub fn free(mut self) -> (Scl, Sda, D, W) {
        self.scl.release();
        self.sda.release();
        (self.scl, self.sda, self.delay, self.watchdog)
    }

    /// Test for device presence
    ///
    /// Addresses the device in the write direction and checks the
    /// acknowledgment, transferring no data.
    pub fn poll(&mut self, addr: Address) -> Result<(), Error> {
        let result = self.select(addr, Pointer::None);
        self.stop_condition();
        result
    }

    /// Write `data` to the device, after the pointer bytes if any
    ///
    /// Aborts at the first unacknowledged byte without transmitting
    /// the rest; the stop condition is issued either way.
    pub fn write(&mut self, addr: Address, ptr: Pointer, data: &[u8]) -> Result<(), Error> {
        let result = self.try_write(addr, ptr, data);
        self.stop_condition();
        result
    }

    /// Read `buf.len()` bytes from the device
    ///
    /// With a pointer, the pointer is written first and the read
    /// direction selected with a repeated start (random-access read).
    /// Every byte but the last is acknowledged; the last is rejected
    /// to end the transfer. On failure, bytes in `buf` past the
    /// failure point are unspecified.
    pub fn read(&mut self, addr: Address, ptr: Pointer, buf: &mut [u8]) -> Result<(), Error> {
        let result = self.try_read(addr, ptr, buf);
        self.stop_condition();
        result
    }

    /// Read back and check against `expected` without storing
    ///
    /// Same transport as [`read`](Self::read), but each received byte
    /// is checked against the corresponding entry of `expected`. The
    /// whole transfer runs to completion so the device is left in a
    /// defined state; the first difference is reported as
    /// [`Error::Mismatch`]. Transport failures take precedence since
    /// they are detected earlier.
    pub fn compare(&mut self, addr: Address, ptr: Pointer, expected: &[u8]) -> Result<(), Error> {
        let result = self.try_compare(addr, ptr, expected);
        self.stop_condition();
        result
    }

    /// Start and address in the write direction, then the pointer
    fn select(&mut self, addr: Address, ptr: Pointer) -> Result<(), Error> {
        self.start_condition()?;
        self.send_byte(addr.write_header())?;
        let (bytes, len) = ptr.encode();
        for &b in &bytes[..len] {
            self.send_byte(b)?;
        }
        Ok(())
    }

    /// Address in the read direction, writing the pointer first if any
    fn select_for_read(&mut self, addr: Address, ptr: Pointer) -> Result<(), Error> {
        if !ptr.is_none() {
            // Pointer write phase, then repeated start to turn the
            // bus around without releasing it.
            self.select(addr, ptr)?;
        }
        self.start_condition()?;
        self.send_byte(addr.read_header())
    }

    fn try_write(&mut self, addr: Address, ptr: Pointer, data: &[u8]) -> Result<(), Error> {
        self.select(addr, ptr)?;
        for &b in data {
            self.send_byte(b)?;
        }
        Ok(())
    }

    fn try_read(&mut self, addr: Address, ptr: Pointer, buf: &mut [u8]) -> Result<(), Error> {
        self.select_for_read(addr, ptr)?;
        let last = buf.len().checked_sub(1);
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = self.receive_byte(Some(i) != last)?;
        }
        Ok(())
    }

    fn try_compare(&mut self, addr: Address, ptr: Pointer, expected: &[u8]) -> Result<(), Error> {
        self.select_for_read(addr, ptr)?;
        let last = expected.len().checked_sub(1);
        let mut matched = true;
        for (i, &want) in expected.iter().enumerate() {
            let got = self.receive_byte(Some(i) != last)?;
            matched &= got == want;
        }
        if matched {
            Ok(())
        } else {
            Err(Error::Mismatch)
        }
    }
}

impl<Scl, Sda, D, W> RegisterBus for BusMaster<Scl, Sda, D, W>
where
    Scl: OpenDrainLine,
    Sda: OpenDrainLine,
    D: BitDelay,
    W: Watchdog,
{
    fn poll(&mut self, addr: Address) -> Result<(), Error> {
        BusMaster::poll(self, addr)
    }

    fn write(&mut self, addr: Address, ptr: Pointer, data: &[u8]) -> Result<(), Error> {
        BusMaster::write(self, addr, ptr, data)
    }

    fn read(&mut self, addr: Address, ptr: Pointer, buf: &mut [u8]) -> Result<(), Error> {
        BusMaster::read(self, addr, ptr, buf)
    }

    fn compare(&mut self, addr: Address, ptr: Pointer, expected: &[u8]) -> Result<(), Error> {
        BusMaster::compare(self, addr, ptr, expected)
    }
}
