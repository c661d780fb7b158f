//! Bitbus bring-up firmware
//!
//! Minimal harness for an RP2040 board with the bus on two GPIOs:
//! starts the 200 Hz tick interrupt, scans the 7-bit address space,
//! runs a verified EEPROM write, then toggles a PCF8574 port
//! expander once a second as a liveness indicator. A held bus or an
//! absent device is logged and survived, never fatal.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;
use heapless::Vec;
use {defmt_rtt as _, panic_probe as _};

use bitbus_core::tick::{TimerId, TICKS_PER_SECOND};
use bitbus_core::{Address, BusMaster, Error};
use bitbus_drivers::eeprom::{Eeprom24x, EepromConfig};
use bitbus_drivers::ioexp::{self, Pcf8574};
use bitbus_hal_rp2040::{CycleDelay, OpenDrainPin};

mod tick;

use crate::tick::TICKS;

/// First and one-past-last addresses worth scanning (0x00-0x07 and
/// 0x78-0x7F are reserved by the bus specification)
const SCAN_FIRST: u8 = 0x08;
const SCAN_LAST: u8 = 0x78;

/// Spin for one second on the Main timer
///
/// Blocking on purpose: the tick interrupt keeps firing while we
/// spin, which is the same discipline the bus watchdog relies on.
fn delay_1_sec() {
    TICKS.arm(TimerId::Main, TICKS_PER_SECOND);
    TICKS.wait(TimerId::Main);
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("bitbus firmware starting");

    let p = embassy_rp::init(Default::default());
    tick::start();

    // Bus on the standard Pico I2C0 pins: GPIO4 = SDA, GPIO5 = SCL
    let scl = OpenDrainPin::new(Peri::<AnyPin>::from(p.PIN_5));
    let sda = OpenDrainPin::new(Peri::<AnyPin>::from(p.PIN_4));
    let mut bus = BusMaster::new(scl, sda, CycleDelay::default(), TICKS.watchdog());

    // Scan for devices
    let mut found: Vec<u8, 16> = Vec::new();
    for raw in SCAN_FIRST..SCAN_LAST {
        let Some(addr) = Address::new(raw) else {
            continue;
        };
        match bus.poll(addr) {
            Ok(()) => {
                let _ = found.push(raw);
                info!("device at {=u8:#x}", raw);
            }
            Err(Error::Timeout) => {
                // Held line: no point clocking the rest of the range
                warn!("bus held at {=u8:#x}, aborting scan", raw);
                break;
            }
            Err(_) => {}
        }
    }
    info!("scan complete: {=usize} device(s)", found.len());

    // Verified write: the critical-path pattern, a plain ack is not
    // proof the data persisted
    let mut eeprom = Eeprom24x::new(bus, EepromConfig::default());
    if eeprom.is_present() {
        match eeprom.write_verified(0x0000, b"bitbus") {
            Ok(()) => info!("eeprom verified write ok"),
            Err(e) => warn!("eeprom verified write failed: {}", e),
        }
    } else {
        info!("no eeprom at default address");
    }

    // Liveness blink on the port expander, fire-and-forget: a missing
    // or failing expander is a non-critical peripheral
    let expander_addr = unwrap!(Address::new(ioexp::BASE_ADDRESS));
    let mut expander = Pcf8574::new(eeprom.free(), expander_addr);
    let mut pattern: u8 = 0x0F;
    loop {
        delay_1_sec();
        let _ = expander.write_outputs(pattern);
        pattern = !pattern;
    }
}
