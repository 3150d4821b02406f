//! Vehicle presence input (IR reflective obstacle sensor).
//!
//! The module pulls its output LOW when an object is in range.  Polarity
//! is handled here so the rest of the firmware only ever sees a
//! normalised "vehicle present" boolean.  Timing-based confirmation is
//! done by the state machine, not by this driver.

use embedded_hal::digital::InputPin;
use log::warn;

/// Electrical level that means "object detected".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

pub struct PresenceSensor<P: InputPin> {
    pin: P,
    polarity: Polarity,
    /// Last good value, reported again if the pin read fails.
    last: bool,
}

impl<P: InputPin> PresenceSensor<P> {
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self {
            pin,
            polarity,
            last: false,
        }
    }

    /// Read the pin and return whether a vehicle is present.
    ///
    /// A failed read keeps the previous value.
    pub fn read(&mut self) -> bool {
        let level = match self.polarity {
            Polarity::ActiveLow => self.pin.is_low(),
            Polarity::ActiveHigh => self.pin.is_high(),
        };
        match level {
            Ok(present) => self.last = present,
            Err(e) => warn!("presence pin read failed: {:?}", e),
        }
        self.last
    }
}
