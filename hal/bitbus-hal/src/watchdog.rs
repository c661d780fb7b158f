//! Watchdog abstraction for bounded waits
//!
//! Every wait for a peripheral-driven line release must be bounded,
//! or a stuck device hangs the bus master forever. The engine arms
//! the watchdog before each such wait and polls `is_expired` inside
//! the wait loop; the implementation decides what "expired" means
//! (tick countdown in firmware, poll countdown in tests).

/// Bound on a single peripheral-driven wait
pub trait Watchdog {
    /// Restart the bound
    ///
    /// Called once at the start of each wait; any previous countdown
    /// is discarded.
    fn arm(&mut self);

    /// Check whether the bound has been reached
    ///
    /// Must keep returning `true` once expired until re-armed.
    fn is_expired(&self) -> bool;
}
