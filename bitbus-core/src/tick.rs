//! Tick-driven countdown timers
//!
//! Three fixed countdown slots share one periodic hardware tick: a
//! general-purpose main delay, an auxiliary delay, and the bus
//! watchdog consumed by the engine's bounded waits. The tick handler
//! runs in interrupt context while `arm` and `is_expired` run in
//! thread context, so the slots are plain atomics rather than a
//! critical section: the decrement is a CAS that simply loses against
//! a concurrent re-arm.
//!
//! The atomics come from `portable-atomic`, not `core`: Cortex-M0+
//! has no CAS instruction, so on that target the compare-exchange
//! needs the crate's critical-section backend, which the firmware
//! binary enables.

use portable_atomic::{AtomicBool, AtomicU16, Ordering};

use bitbus_hal::Watchdog;

/// Hardware tick rate in Hz
pub const TICK_HZ: u32 = 200;

/// Ticks in one second
pub const TICKS_PER_SECOND: u16 = TICK_HZ as u16;

/// Ticks in one minute
pub const TICKS_PER_MINUTE: u16 = 60 * TICKS_PER_SECOND;

/// Default bus watchdog bound in ticks
///
/// Two ticks guarantee at least one full tick period (7.5-10 ms at
/// 200 Hz) regardless of where in the period the watchdog is armed;
/// a single tick could expire almost immediately.
pub const WATCHDOG_TICKS: u16 = 2;

/// Identity of one countdown slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    /// General-purpose delay timer
    Main,
    /// Second independent delay timer
    Aux,
    /// Bus watchdog, reserved for the engine's bounded waits
    Watchdog,
}

impl TimerId {
    const fn index(self) -> usize {
        match self {
            TimerId::Main => 0,
            TimerId::Aux => 1,
            TimerId::Watchdog => 2,
        }
    }
}

/// One countdown slot
struct Countdown {
    /// Remaining ticks; meaningful only while not expired
    remaining: AtomicU16,
    /// Set by the tick handler when the count reaches zero, cleared
    /// by `arm`
    expired: AtomicBool,
}

impl Countdown {
    const fn new() -> Self {
        Self {
            remaining: AtomicU16::new(0),
            // A timer that was never armed reads as expired
            expired: AtomicBool::new(true),
        }
    }
}

/// The three countdown timers shared between tick interrupt and
/// thread context
///
/// All methods take `&self` so a `static` bank can be referenced from
/// both contexts:
///
/// ```ignore
/// static TICKS: TimerBank = TimerBank::new();
/// ```
pub struct TimerBank {
    slots: [Countdown; 3],
}

impl Default for TimerBank {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerBank {
    /// Create a bank with every slot expired (never armed)
    pub const fn new() -> Self {
        Self {
            slots: [Countdown::new(), Countdown::new(), Countdown::new()],
        }
    }

    /// Start a countdown of `ticks` ticks on the given slot
    ///
    /// Clears the slot's expired flag. `arm(id, 0)` expires on the
    /// very next tick; `arm(id, n)` expires on exactly the n-th
    /// subsequent tick. A tick landing inside `arm` either loses its
    /// CAS against the new count or counts as the first tick of the
    /// new countdown; neither outcome corrupts the slot.
    pub fn arm(&self, id: TimerId, ticks: u16) {
        let slot = &self.slots[id.index()];
        slot.remaining.store(ticks, Ordering::Release);
        slot.expired.store(false, Ordering::Release);
    }

    /// Check whether the slot's countdown has run out
    ///
    /// Stays `true` until the slot is re-armed.
    pub fn is_expired(&self, id: TimerId) -> bool {
        self.slots[id.index()].expired.load(Ordering::Acquire)
    }

    /// Advance every armed slot by one tick
    ///
    /// Called from the periodic tick interrupt (or the test driving
    /// simulated time). A slot that has already expired holds at
    /// zero/expired until re-armed.
    pub fn tick(&self) {
        for slot in &self.slots {
            if slot.expired.load(Ordering::Acquire) {
                continue;
            }
            let remaining = slot.remaining.load(Ordering::Acquire);
            let next = remaining.saturating_sub(1);
            let swapped = slot
                .remaining
                .compare_exchange(remaining, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok();
            // A failed CAS means arm() raced us; the new countdown
            // starts from its full count.
            if swapped && next == 0 {
                slot.expired.store(true, Ordering::Release);
            }
        }
    }

    /// Spin until the slot expires
    ///
    /// Blocking delay helper for firmware main loops; the tick
    /// interrupt must be running or this never returns.
    pub fn wait(&self, id: TimerId) {
        while !self.is_expired(id) {
            core::hint::spin_loop();
        }
    }

    /// Borrow the watchdog slot for the bus engine
    pub fn watchdog(&self) -> WatchdogHandle<'_> {
        WatchdogHandle {
            bank: self,
            ticks: WATCHDOG_TICKS,
        }
    }
}

/// [`Watchdog`] implementation over the bank's watchdog slot
///
/// Only the bus engine should hold one of these; the Main and Aux
/// slots stay available for unrelated delays.
pub struct WatchdogHandle<'a> {
    bank: &'a TimerBank,
    ticks: u16,
}

impl<'a> WatchdogHandle<'a> {
    /// Override the default tick bound
    pub fn with_ticks(mut self, ticks: u16) -> Self {
        self.ticks = ticks;
        self
    }
}

impl Watchdog for WatchdogHandle<'_> {
    fn arm(&mut self) {
        self.bank.arm(TimerId::Watchdog, self.ticks);
    }

    fn is_expired(&self) -> bool {
        self.bank.is_expired(TimerId::Watchdog)
    }
}
