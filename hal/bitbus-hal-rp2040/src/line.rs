//! Open-drain bus lines over RP2040 GPIOs
//!
//! The RP2040 has no true open-drain mode, so the standard trick is
//! direction switching: configured as an input the pin floats and the
//! pull-up raises the line, configured as an output it drives low.
//! The output level is latched low once at construction and never
//! changes; only the direction does.

use embassy_rp::gpio::{AnyPin, Flex, Pull};
use embassy_rp::Peri;

use bitbus_hal::OpenDrainLine;

/// One bus wire on a GPIO with an external pull-up
///
/// The internal pull-up is enabled as well, which is enough for slow
/// clock rates on a short bus even without the external resistor.
pub struct OpenDrainPin {
    pin: Flex<'static>,
}

impl OpenDrainPin {
    /// Configure `pin` as a released bus line
    pub fn new(pin: Peri<'static, AnyPin>) -> Self {
        let mut pin = Flex::new(pin);
        pin.set_pull(Pull::Up);
        pin.set_low();
        pin.set_as_input();
        Self { pin }
    }
}

impl OpenDrainLine for OpenDrainPin {
    fn drive_low(&mut self) {
        // Output latch is already low; switching direction sinks the line
        self.pin.set_as_output();
    }

    fn release(&mut self) {
        self.pin.set_as_input();
    }

    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
