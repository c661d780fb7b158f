//! Cycle-counted bit timing
//!
//! Bus bit timing needs microsecond-scale pauses, well below what the
//! embassy timer queue can schedule efficiently, so the half-bit
//! pause is a plain busy loop on the core clock.

use bitbus_hal::BitDelay;

/// Default system clock of the RP2040 under embassy
const SYS_CLK_HZ: u32 = 125_000_000;

/// Busy-loop [`BitDelay`] calibrated for a target bus clock rate
pub struct CycleDelay {
    half_bit_cycles: u32,
}

impl CycleDelay {
    /// Delay for a bus clock of `bus_hz` (e.g. 100 kHz standard mode)
    pub const fn new(bus_hz: u32) -> Self {
        Self {
            half_bit_cycles: SYS_CLK_HZ / bus_hz / 2,
        }
    }
}

impl Default for CycleDelay {
    fn default() -> Self {
        // 100 kHz standard mode
        Self::new(100_000)
    }
}

impl BitDelay for CycleDelay {
    fn half_bit(&mut self) {
        cortex_m::asm::delay(self.half_bit_cycles);
    }
}
