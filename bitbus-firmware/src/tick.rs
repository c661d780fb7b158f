//! 200 Hz tick interrupt
//!
//! The timer bank is decremented from the SysTick exception, not an
//! executor task: the bus engine's bounded waits are blocking spin
//! loops, and the watchdog can only expire if ticks keep arriving
//! while the thread is spinning. Everything else on the chip
//! (embassy's time driver uses the TIMER peripheral) is unaffected.

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m_rt::exception;

use bitbus_core::tick::{TimerBank, TICK_HZ};

/// Default RP2040 system clock under embassy
const SYS_CLK_HZ: u32 = 125_000_000;

/// The shared countdown timers: Main and Aux for delays, Watchdog
/// for the bus engine
pub static TICKS: TimerBank = TimerBank::new();

/// Configure SysTick to fire at [`TICK_HZ`] and start it
pub fn start() {
    let mut core = defmt::unwrap!(cortex_m::Peripherals::take());
    let syst = &mut core.SYST;
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(SYS_CLK_HZ / TICK_HZ - 1);
    syst.clear_current();
    syst.enable_counter();
    syst.enable_interrupt();
}

#[exception]
fn SysTick() {
    TICKS.tick();
}
