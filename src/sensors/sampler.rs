//! Supply voltage / coil current sampler.
//!
//! Converts raw ADC counts from the two analog channels into volts and
//! amps using the fixed [`Calibration`], then block-averages them: `N`
//! consecutive conversions are accumulated per channel before a new
//! averaged value is emitted.  Between flushes the last emitted value is
//! held, so a disturbance only shows up once a full window has elapsed.
//!
//! Before the first flush of a session there is no held value yet; the
//! sampler then emits the mean of the conversions accumulated so far.

use crate::app::ports::AnalogPort;
use crate::config::Calibration;

/// Immutable snapshot produced once per charging tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Reading {
    /// Supply voltage at the coil driver input (V).
    pub input_voltage: f32,
    /// Coil current (A), never negative.
    pub current: f32,
    /// `input_voltage × current` (W).
    pub power: f32,
}

impl Reading {
    pub fn new(input_voltage: f32, current: f32) -> Self {
        Self {
            input_voltage,
            current,
            power: input_voltage * current,
        }
    }
}

pub struct SensorSampler {
    cal: Calibration,
    window: u8,
    voltage_sum: f32,
    current_sum: f32,
    count: u8,
    /// Last averaged values, `None` until the first window flushes.
    held: Option<(f32, f32)>,
}

impl SensorSampler {
    pub fn new(cal: Calibration, window: u8) -> Self {
        Self {
            cal,
            window: window.max(1),
            voltage_sum: 0.0,
            current_sum: 0.0,
            count: 0,
            held: None,
        }
    }

    /// Take one conversion per channel and return the current reading.
    pub fn sample(&mut self, analog: &mut impl AnalogPort) -> Reading {
        let volts = self.raw_to_volts(analog.read_voltage_raw());
        let amps = self.raw_to_amps(analog.read_current_raw());

        self.voltage_sum += volts;
        self.current_sum += amps;
        self.count += 1;

        if self.count >= self.window {
            let n = f32::from(self.count);
            self.held = Some((self.voltage_sum / n, self.current_sum / n));
            self.voltage_sum = 0.0;
            self.current_sum = 0.0;
            self.count = 0;
        }

        let (v, i) = match self.held {
            Some(held) => held,
            None => {
                let n = f32::from(self.count.max(1));
                (self.voltage_sum / n, self.current_sum / n)
            }
        };
        Reading::new(v, i)
    }

    /// Drop accumulated and held values (called at session start).
    pub fn reset(&mut self) {
        self.voltage_sum = 0.0;
        self.current_sum = 0.0;
        self.count = 0;
        self.held = None;
    }

    /// Replace calibration and window size; implies a reset.
    pub fn reconfigure(&mut self, cal: Calibration, window: u8) {
        self.cal = cal;
        self.window = window.max(1);
        self.reset();
    }

    /// Conversions accumulated towards the next flush.
    pub fn pending(&self) -> u8 {
        self.count
    }

    fn raw_to_pin_volts(&self, raw: u16) -> f32 {
        let raw = raw.min(self.cal.adc_max);
        f32::from(raw) / f32::from(self.cal.adc_max) * self.cal.adc_ref_v
    }

    fn raw_to_volts(&self, raw: u16) -> f32 {
        self.raw_to_pin_volts(raw) * self.cal.voltage_divider_ratio
    }

    /// Below the zero offset the sensor only reports noise, so the result
    /// is clamped to 0 A.
    fn raw_to_amps(&self, raw: u16) -> f32 {
        let amps = (self.raw_to_pin_volts(raw) - self.cal.current_zero_offset_v)
            / self.cal.current_sensitivity_v_per_a;
        amps.max(0.0)
    }
}
