//! Mock pad for integration tests.
//!
//! Records every actuator call and every event / status update so tests
//! can assert on the full history without touching GPIO or the ADC.

use iptpad::app::events::{AppEvent, StatusUpdate};
use iptpad::app::ports::{ActuatorPort, AnalogPort, EventSink, PresencePort, StatusSink};
use iptpad::config::Calibration;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    SetRelay(bool),
    Chirp(u8),
    SetSiren(bool),
    AllOff,
}

// ── MockPad ───────────────────────────────────────────────────

pub struct MockPad {
    pub present: bool,
    pub voltage_raw: u16,
    pub current_raw: u16,
    pub calls: Vec<ActuatorCall>,
    cal: Calibration,
    relay: bool,
}

#[allow(dead_code)]
impl MockPad {
    pub fn new() -> Self {
        let mut pad = Self {
            present: false,
            voltage_raw: 0,
            current_raw: 0,
            calls: Vec::new(),
            cal: Calibration::default(),
            relay: false,
        };
        pad.set_line(12.0, 1.5);
        pad
    }

    /// Set the analog inputs to the raw counts that read back as `volts`
    /// and `amps` through the default calibration.
    pub fn set_line(&mut self, volts: f32, amps: f32) {
        let cal = &self.cal;
        let max = f32::from(cal.adc_max);
        let v = volts / (cal.adc_ref_v * cal.voltage_divider_ratio) * max;
        let pin_v = amps * cal.current_sensitivity_v_per_a + cal.current_zero_offset_v;
        let i = pin_v / cal.adc_ref_v * max;
        self.voltage_raw = v.round().clamp(0.0, max) as u16;
        self.current_raw = i.round().clamp(0.0, max) as u16;
    }

    pub fn relay_activations(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == ActuatorCall::SetRelay(true))
            .count()
    }

    pub fn relay_writes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::SetRelay(_)))
            .count()
    }

    pub fn chirps(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Chirp(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    pub fn siren_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::SetSiren(on) => Some(*on),
                ActuatorCall::AllOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl Default for MockPad {
    fn default() -> Self {
        Self::new()
    }
}

impl PresencePort for MockPad {
    fn vehicle_present(&mut self) -> bool {
        self.present
    }
}

impl AnalogPort for MockPad {
    fn read_voltage_raw(&mut self) -> u16 {
        self.voltage_raw
    }

    fn read_current_raw(&mut self) -> u16 {
        self.current_raw
    }
}

impl ActuatorPort for MockPad {
    fn set_relay(&mut self, on: bool) {
        self.relay = on;
        self.calls.push(ActuatorCall::SetRelay(on));
    }

    fn is_relay_on(&self) -> bool {
        self.relay
    }

    fn chirp(&mut self, pulses: u8) {
        self.calls.push(ActuatorCall::Chirp(pulses));
    }

    fn set_siren(&mut self, on: bool) {
        self.calls.push(ActuatorCall::SetSiren(on));
    }

    fn all_off(&mut self) {
        self.relay = false;
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── Recording sinks ───────────────────────────────────────────

#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

#[derive(Default)]
pub struct StatusLog {
    pub updates: Vec<StatusUpdate>,
}

impl StatusSink for StatusLog {
    fn render(&mut self, update: &StatusUpdate) {
        self.updates.push(*update);
    }
}
