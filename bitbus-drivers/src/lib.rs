//! Peripheral drivers for the Bitbus bus-master engine
//!
//! Concrete device drivers written against
//! [`bitbus_core::RegisterBus`]:
//!
//! - Serial EEPROMs (24-series) with page-aware, verified writes
//! - PCF8574 port expander (pointer-less register device)

#![no_std]
#![deny(unsafe_code)]

pub mod eeprom;
pub mod ioexp;
