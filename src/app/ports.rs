//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ChargeSessionController (domain)
//! ```
//!
//! Driven adapters (presence sensor, ADC, relay, buzzer, display, log)
//! implement these traits.  The
//! [`ChargeSessionController`](super::service::ChargeSessionController)
//! consumes them via generics, so the domain core never touches hardware
//! directly.  No port returns an error: the control loop favours
//! availability, so adapters absorb and log their own failures.

use super::events::{AppEvent, StatusUpdate};

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Normalised vehicle-presence input.
pub trait PresencePort {
    /// `true` when an object is over the pad.  Polarity is the adapter's
    /// concern.
    fn vehicle_present(&mut self) -> bool;
}

/// Raw analog channels, one conversion per call.
pub trait AnalogPort {
    /// Raw ADC count on the supply-voltage channel.
    fn read_voltage_raw(&mut self) -> u16;

    /// Raw ADC count on the coil-current channel.
    fn read_current_raw(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: relay and audible alert.
pub trait ActuatorPort {
    /// Close (`true`) or open (`false`) the supply relay.
    fn set_relay(&mut self, on: bool);

    /// Query whether the relay is currently closed.
    fn is_relay_on(&self) -> bool;

    /// Emit a short sequence of `pulses` beeps.
    fn chirp(&mut self, pulses: u8);

    /// Drive the continuous alert level (emergency siren).
    fn set_siren(&mut self, on: bool);

    /// Relay open, siren silent: safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Output ports (driven adapter: domain → display / diagnostics)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go (serial log, telemetry, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

/// Status reporter: receives one [`StatusUpdate`] per rendered tick and
/// must render it before the next tick.  Produces nothing back.
pub trait StatusSink {
    fn render(&mut self, update: &StatusUpdate);
}

/// Fan one status stream out to two reporters (e.g. LCD and serial log).
impl<A: StatusSink, B: StatusSink> StatusSink for (A, B) {
    fn render(&mut self, update: &StatusUpdate) {
        self.0.render(update);
        self.1.render(update);
    }
}

// ───────────────────────────────────────────────────────────────
// Randomness (for the placeholder efficiency estimator)
// ───────────────────────────────────────────────────────────────

/// Source of uniformly distributed 32-bit values.  Every `rand_core`
/// generator is one.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;
}

impl<R: rand_core::RngCore> RandomSource for R {
    fn next_u32(&mut self) -> u32 {
        rand_core::RngCore::next_u32(self)
    }
}
