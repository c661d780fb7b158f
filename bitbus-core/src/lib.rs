//! Board-agnostic core of the Bitbus bus-master stack
//!
//! This crate contains everything that does not depend on a specific
//! chip:
//!
//! - Tick/timeout service (three countdown timers fed by a 200 Hz
//!   hardware tick)
//! - Bus-master engine (open-drain line signaling, watchdog-bounded
//!   waits, register-level operations)
//! - The [`traits::RegisterBus`] seam drivers are written against
//!
//! The engine is generic over the traits in `bitbus-hal`, so it runs
//! unchanged on real pins and on the simulated bus used by the
//! integration tests.

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod tick;
pub mod traits;

pub use bus::{Address, BusMaster, Error, Pointer};
pub use tick::{TimerBank, TimerId, WatchdogHandle};
pub use traits::RegisterBus;
