//! Line-level signaling primitives
//!
//! Each primitive performs exactly one clock/data transition sequence.
//! Data changes only while SCL is low; the two exceptions are the
//! start condition (SDA falls while SCL is high) and the stop
//! condition (SDA rises while SCL is high).
//!
//! Raising SCL always goes through `raise_scl`, the one
//! watchdog-bounded wait: releasing the clock lets a slave stretch it
//! by holding the line low, and a slave that never lets go is what
//! distinguishes [`Error::Timeout`] from an ordinary rejection. There
//! are no retries at this layer.

use bitbus_hal::{BitDelay, OpenDrainLine, Watchdog};

use super::{BusMaster, Error};

impl<Scl, Sda, D, W> BusMaster<Scl, Sda, D, W>
where
    Scl: OpenDrainLine,
    Sda: OpenDrainLine,
    D: BitDelay,
    W: Watchdog,
{
    /// Release SCL and wait for it to actually go high
    ///
    /// The wait is bounded by the watchdog; expiry aborts the
    /// in-progress primitive immediately.
    fn raise_scl(&mut self) -> Result<(), Error> {
        self.scl.release();
        self.watchdog.arm();
        while self.scl.is_low() {
            if self.watchdog.is_expired() {
                return Err(Error::Timeout);
            }
            core::hint::spin_loop();
        }
        Ok(())
    }

    /// Assert a start (or repeated start) condition
    ///
    /// Leaves SCL driven low with SDA low, ready for the first data
    /// bit. Can time out on a repeated start if a slave is stretching
    /// the clock.
    pub(super) fn start_condition(&mut self) -> Result<(), Error> {
        self.sda.release();
        self.delay.half_bit();
        self.raise_scl()?;
        self.delay.half_bit();
        self.sda.drive_low();
        self.delay.half_bit();
        self.scl.drive_low();
        self.delay.half_bit();
        Ok(())
    }

    /// Assert a stop condition, leaving the bus idle
    ///
    /// Best effort: if a slave holds SCL past the watchdog bound the
    /// sequence degrades to releasing both lines, which is the
    /// closest to idle the master can get. Failure paths rely on
    /// this never leaving a line driven.
    pub(super) fn stop_condition(&mut self) {
        self.sda.drive_low();
        self.delay.half_bit();
        self.scl.release();
        self.watchdog.arm();
        while self.scl.is_low() && !self.watchdog.is_expired() {
            core::hint::spin_loop();
        }
        self.delay.half_bit();
        self.sda.release();
        self.delay.half_bit();
    }

    /// Shift out one byte, MSB first, and sample the acknowledgment
    ///
    /// The 9th pulse releases SDA for the receiver: low means the
    /// byte was accepted, high means it was rejected.
    pub(super) fn send_byte(&mut self, value: u8) -> Result<(), Error> {
        let mut bits = value;
        for _ in 0..8 {
            self.sda.set_bit(bits & 0x80 != 0);
            bits <<= 1;
            self.delay.half_bit();
            self.raise_scl()?;
            self.delay.half_bit();
            self.scl.drive_low();
        }

        // Acknowledgment slot: the receiver owns SDA for one pulse.
        self.sda.release();
        self.delay.half_bit();
        self.raise_scl()?;
        self.delay.half_bit();
        let acked = self.sda.is_low();
        self.scl.drive_low();
        self.delay.half_bit();

        if acked {
            Ok(())
        } else {
            Err(Error::Nack)
        }
    }

    /// Shift in one byte, MSB first, and drive the acknowledgment
    ///
    /// `ack` low (true) tells the transmitter to continue; releasing
    /// the slot (false) ends a multi-byte read before the stop.
    pub(super) fn receive_byte(&mut self, ack: bool) -> Result<u8, Error> {
        self.sda.release();
        let mut value = 0u8;
        for _ in 0..8 {
            self.delay.half_bit();
            self.raise_scl()?;
            self.delay.half_bit();
            value = (value << 1) | u8::from(self.sda.is_high());
            self.scl.drive_low();
        }

        // Master owns the acknowledgment slot on reads.
        self.sda.set_bit(!ack);
        self.delay.half_bit();
        self.raise_scl()?;
        self.delay.half_bit();
        self.scl.drive_low();
        self.sda.release();
        self.delay.half_bit();

        Ok(value)
    }
}
