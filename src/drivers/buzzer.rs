//! Active piezo buzzer driver.
//!
//! Two uses: short chirps (session start/stop) and a level-driven siren
//! that the state machine toggles every alert half-period during an
//! emergency stop.
//!
//! Chirps are fire-and-forget on host.  On the device the pulse train is
//! emitted with a blocking delay, which is fine for the ≤ 2 pulses the
//! controller ever requests.

use embedded_hal::digital::OutputPin;
use log::warn;

/// On/off time of one chirp pulse (milliseconds).
pub const CHIRP_PULSE_MS: u32 = 80;

pub struct BuzzerDriver<P: OutputPin> {
    pin: P,
}

impl<P: OutputPin> BuzzerDriver<P> {
    pub fn new(pin: P) -> Self {
        let mut buzzer = Self { pin };
        buzzer.set(false);
        buzzer
    }

    /// Drive the buzzer level directly.
    pub fn set(&mut self, on: bool) {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = res {
            warn!("buzzer write failed: {:?}", e);
        }
    }

    /// Emit `pulses` short beeps, leaving the buzzer silent.
    pub fn chirp(&mut self, pulses: u8) {
        for i in 0..pulses {
            self.set(true);
            pulse_delay();
            self.set(false);
            if i + 1 < pulses {
                pulse_delay();
            }
        }
    }
}

#[cfg(target_os = "espidf")]
fn pulse_delay() {
    esp_idf_hal::delay::FreeRtos::delay_ms(CHIRP_PULSE_MS);
}

#[cfg(not(target_os = "espidf"))]
fn pulse_delay() {}
