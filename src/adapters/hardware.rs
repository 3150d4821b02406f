//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the presence sensor, the analog front end, the relay and the
//! buzzer, and exposes them through [`PresencePort`], [`AnalogPort`] and
//! [`ActuatorPort`].  Generic over the `embedded-hal` pin types, so the
//! same adapter runs on `PinDriver`s on the device and on `SimPin`s on
//! host.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ActuatorPort, AnalogPort, PresencePort};
use crate::drivers::buzzer::BuzzerDriver;
use crate::drivers::relay::RelayDriver;
use crate::sensors::AdcFrontEnd;
use crate::sensors::presence::PresenceSensor;

/// Concrete adapter that combines all pad hardware behind port traits.
pub struct PadHardware<P, R, B, A = AdcFrontEnd>
where
    P: InputPin,
    R: OutputPin,
    B: OutputPin,
    A: AnalogPort,
{
    presence: PresenceSensor<P>,
    analog: A,
    relay: RelayDriver<R>,
    buzzer: BuzzerDriver<B>,
}

impl<P, R, B, A> PadHardware<P, R, B, A>
where
    P: InputPin,
    R: OutputPin,
    B: OutputPin,
    A: AnalogPort,
{
    pub fn new(
        presence: PresenceSensor<P>,
        analog: A,
        relay: RelayDriver<R>,
        buzzer: BuzzerDriver<B>,
    ) -> Self {
        Self {
            presence,
            analog,
            relay,
            buzzer,
        }
    }

    /// Relay closures since boot.
    pub fn relay_closures(&self) -> u32 {
        self.relay.closures()
    }
}

// ── PresencePort ──────────────────────────────────────────────

impl<P, R, B, A> PresencePort for PadHardware<P, R, B, A>
where
    P: InputPin,
    R: OutputPin,
    B: OutputPin,
    A: AnalogPort,
{
    fn vehicle_present(&mut self) -> bool {
        self.presence.read()
    }
}

// ── AnalogPort ────────────────────────────────────────────────

impl<P, R, B, A> AnalogPort for PadHardware<P, R, B, A>
where
    P: InputPin,
    R: OutputPin,
    B: OutputPin,
    A: AnalogPort,
{
    fn read_voltage_raw(&mut self) -> u16 {
        self.analog.read_voltage_raw()
    }

    fn read_current_raw(&mut self) -> u16 {
        self.analog.read_current_raw()
    }
}

// ── ActuatorPort ──────────────────────────────────────────────

impl<P, R, B, A> ActuatorPort for PadHardware<P, R, B, A>
where
    P: InputPin,
    R: OutputPin,
    B: OutputPin,
    A: AnalogPort,
{
    fn set_relay(&mut self, on: bool) {
        self.relay.set(on);
    }

    fn is_relay_on(&self) -> bool {
        self.relay.is_closed()
    }

    fn chirp(&mut self, pulses: u8) {
        self.buzzer.chirp(pulses);
    }

    fn set_siren(&mut self, on: bool) {
        self.buzzer.set(on);
    }

    fn all_off(&mut self) {
        self.relay.open();
        self.buzzer.set(false);
    }
}
