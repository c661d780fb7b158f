//! Bitbus Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the bus-master
//! engine is written against. Chip-specific HALs (RP2040, etc.)
//! implement them, so the same engine and drivers run on any board
//! that can expose two open-drain pins.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Drivers / firmware (bitbus-drivers)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Engine (bitbus-core)                   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bitbus-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bitbus-hal-rp2040, test doubles, ...   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`line::OpenDrainLine`] - one bus wire (SCL or SDA)
//! - [`delay::BitDelay`] - minimum pulse-width pause
//! - [`watchdog::Watchdog`] - bound on peripheral-driven waits

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod line;
pub mod watchdog;

// Re-export key traits at crate root for convenience
pub use delay::BitDelay;
pub use line::OpenDrainLine;
pub use watchdog::Watchdog;
