//! Open-drain bus line abstractions
//!
//! A two-wire bus line is never driven high: a device either pulls it
//! low or releases it and lets the pull-up resistor raise it. Reading
//! the line therefore reflects the wired-AND of every device on the
//! bus, which is what makes acknowledgment sampling and clock
//! stretching possible.

/// One open-drain bus wire (SCL or SDA)
///
/// Implementations should configure the pin so that `drive_low`
/// sinks the line and `release` leaves it to the pull-up; reads must
/// reflect the actual line level, not the last driven state.
pub trait OpenDrainLine {
    /// Pull the line low
    fn drive_low(&mut self);

    /// Stop driving the line, letting the pull-up raise it
    fn release(&mut self);

    /// Check if the line currently reads high
    fn is_high(&self) -> bool;

    /// Check if the line currently reads low
    fn is_low(&self) -> bool {
        !self.is_high()
    }

    /// Drive or release the line according to a data bit
    ///
    /// A `true` bit is transmitted by releasing the line (pull-up
    /// raises it), a `false` bit by pulling it low.
    fn set_bit(&mut self, high: bool) {
        if high {
            self.release();
        } else {
            self.drive_low();
        }
    }
}
