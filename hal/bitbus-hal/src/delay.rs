//! Bit timing abstraction
//!
//! The bus has no minimum speed, only minimum setup/hold times, so a
//! single pause primitive is enough: the engine inserts it between
//! line transitions and the implementation decides how long it is.

/// Pause satisfying the bus's minimum pulse width
///
/// Called between every line transition the engine performs. A
/// half-bit pause at the target clock rate (e.g. 5 µs for 100 kHz)
/// is the usual implementation; a no-op is acceptable against a
/// simulated bus.
pub trait BitDelay {
    /// Wait for half of one bus clock period
    fn half_bit(&mut self);
}
