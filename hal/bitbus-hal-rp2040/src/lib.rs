//! RP2040 implementation of the Bitbus HAL traits
//!
//! Maps the abstract bus line and timing traits onto embassy-rp
//! primitives: any two GPIOs with external pull-ups become a bus.

#![no_std]

pub mod delay;
pub mod line;

pub use delay::CycleDelay;
pub use line::OpenDrainPin;
