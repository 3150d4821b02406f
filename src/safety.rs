//! Safety monitor.
//!
//! Runs on **every charging tick**, after sampling and estimation, and
//! is the only source of the `Charging → EmergencyStopped` transition.
//!
//! ## Rules
//!
//! | Priority | Condition                                   | Violation     |
//! |----------|---------------------------------------------|---------------|
//! | 1        | `current > max_current_a`                   | `OverCurrent` |
//! | 2        | `input_voltage < min_voltage_v` in Charging | `LowVoltage`  |
//!
//! First match wins: if both trip in the same tick, over-current is
//! reported.  Nothing is latched here; the state machine owns the
//! cooldown.

use log::error;

use crate::config::PadConfig;
use crate::error::Violation;
use crate::fsm::StateId;
use crate::sensors::sampler::Reading;

pub struct SafetyMonitor {
    max_current_a: f32,
    min_voltage_v: f32,
    over_current_trips: u32,
    low_voltage_trips: u32,
}

impl SafetyMonitor {
    pub fn new(config: &PadConfig) -> Self {
        Self {
            max_current_a: config.max_current_a,
            min_voltage_v: config.min_voltage_v,
            over_current_trips: 0,
            low_voltage_trips: 0,
        }
    }

    /// Evaluate both rules against `reading` in `state`.
    pub fn check(&mut self, reading: &Reading, state: StateId) -> Option<Violation> {
        let violation = if reading.current > self.max_current_a {
            self.over_current_trips = self.over_current_trips.saturating_add(1);
            Some(Violation::OverCurrent)
        } else if reading.input_voltage < self.min_voltage_v && state == StateId::Charging {
            self.low_voltage_trips = self.low_voltage_trips.saturating_add(1);
            Some(Violation::LowVoltage)
        } else {
            None
        };

        if let Some(v) = violation {
            error!(
                "SAFETY TRIP: {v} (V={:.1}V I={:.2}A, limits {:.1}V / {:.2}A)",
                reading.input_voltage, reading.current, self.min_voltage_v, self.max_current_a
            );
        }
        violation
    }

    /// Pick up new thresholds after a config reload.
    pub fn set_limits(&mut self, config: &PadConfig) {
        self.max_current_a = config.max_current_a;
        self.min_voltage_v = config.min_voltage_v;
    }

    pub fn over_current_trips(&self) -> u32 {
        self.over_current_trips
    }

    pub fn low_voltage_trips(&self) -> u32 {
        self.low_voltage_trips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> SafetyMonitor {
        SafetyMonitor::new(&PadConfig::default())
    }

    #[test]
    fn nominal_reading_passes() {
        let mut m = monitor();
        assert_eq!(m.check(&Reading::new(12.0, 1.5), StateId::Charging), None);
    }

    #[test]
    fn over_current_trips_in_any_state() {
        let mut m = monitor();
        assert_eq!(
            m.check(&Reading::new(12.0, 3.5), StateId::Charging),
            Some(Violation::OverCurrent)
        );
        assert_eq!(
            m.check(&Reading::new(12.0, 3.5), StateId::Idle),
            Some(Violation::OverCurrent)
        );
        assert_eq!(m.over_current_trips(), 2);
    }

    #[test]
    fn current_exactly_at_limit_is_allowed() {
        let mut m = monitor();
        let limit = PadConfig::default().max_current_a;
        assert_eq!(m.check(&Reading::new(12.0, limit), StateId::Charging), None);
    }

    #[test]
    fn low_voltage_only_while_charging() {
        let mut m = monitor();
        assert_eq!(
            m.check(&Reading::new(9.0, 1.0), StateId::Charging),
            Some(Violation::LowVoltage)
        );
        assert_eq!(m.check(&Reading::new(9.0, 1.0), StateId::Idle), None);
        assert_eq!(m.check(&Reading::new(9.0, 1.0), StateId::EmergencyStopped), None);
    }

    #[test]
    fn over_current_wins_when_both_trip() {
        let mut m = monitor();
        assert_eq!(
            m.check(&Reading::new(5.0, 4.0), StateId::Charging),
            Some(Violation::OverCurrent)
        );
        assert_eq!(m.low_voltage_trips(), 0);
    }

    #[test]
    fn reload_changes_thresholds() {
        let mut m = monitor();
        let mut cfg = PadConfig::default();
        cfg.max_current_a = 1.0;
        m.set_limits(&cfg);
        assert_eq!(
            m.check(&Reading::new(12.0, 1.5), StateId::Charging),
            Some(Violation::OverCurrent)
        );
    }
}
