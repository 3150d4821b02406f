//! Sensor subsystem: presence input, the analog front end and the
//! averaging [`SensorSampler`](sampler::SensorSampler).
//!
//! The front end only hands out raw counts; unit conversion and
//! averaging live in the sampler so they can be tested without an ADC.

pub mod presence;
pub mod sampler;

use crate::app::ports::AnalogPort;
use crate::drivers::hw_init::{ADC1_CH_CURRENT, ADC1_CH_VOLTAGE, adc1_read};

/// Raw supply-voltage and coil-current channels on ADC1.
///
/// Call [`hw_init::init_adc`](crate::drivers::hw_init::init_adc) once
/// before the first read.
#[derive(Debug)]
pub struct AdcFrontEnd {
    voltage_channel: u32,
    current_channel: u32,
}

impl AdcFrontEnd {
    pub fn new() -> Self {
        Self {
            voltage_channel: ADC1_CH_VOLTAGE,
            current_channel: ADC1_CH_CURRENT,
        }
    }
}

impl Default for AdcFrontEnd {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogPort for AdcFrontEnd {
    fn read_voltage_raw(&mut self) -> u16 {
        adc1_read(self.voltage_channel)
    }

    fn read_current_raw(&mut self) -> u16 {
        adc1_read(self.current_channel)
    }
}
