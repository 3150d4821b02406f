//! Pad configuration parameters
//!
//! All tunable parameters for the charging pad controller.  Values are
//! compiled-in defaults; the pad keeps no configuration file and nothing
//! is persisted across power cycles.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the debounce and emergency-alert windows interact with the rest
/// of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPolicy {
    /// The window freezes the loop: presence is only re-checked when the
    /// debounce window ends and the display is not refreshed until the
    /// window closes.  A second violation during the emergency window is
    /// not observed.
    Blocking,
    /// Presence is re-checked every tick of the debounce window and the
    /// display keeps refreshing during both windows.
    NonBlocking,
}

/// ADC calibration for the voltage and current channels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Calibration {
    /// Full-scale ADC count (10-bit converter → 1023).
    pub adc_max: u16,
    /// ADC reference voltage (V).
    pub adc_ref_v: f32,
    /// Input divider ratio on the supply-voltage channel.
    pub voltage_divider_ratio: f32,
    /// Current sensor sensitivity (V per A).
    pub current_sensitivity_v_per_a: f32,
    /// Current sensor output at zero current (V).
    pub current_zero_offset_v: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            adc_max: 1023,
            adc_ref_v: 5.0,
            // 30k/7.5k divider → 0–25 V input range.
            voltage_divider_ratio: 5.0,
            // ACS712-05B hall sensor.
            current_sensitivity_v_per_a: 0.185,
            current_zero_offset_v: 2.5,
        }
    }
}

/// Core pad configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PadConfig {
    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Presence must hold for this long before a session starts (milliseconds)
    pub presence_debounce_ms: u32,
    /// Emergency alert + cooldown window before returning to idle (milliseconds)
    pub emergency_cooldown_ms: u32,
    /// Half-period of the alternating emergency alert (milliseconds).
    /// The level only changes on a tick, so this is at least the control
    /// loop interval.
    pub alert_pulse_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
    /// Debounce / emergency window behaviour
    pub window_policy: WindowPolicy,

    // --- Safety ---
    /// Over-current trip threshold (A)
    pub max_current_a: f32,
    /// Under-voltage trip threshold while charging (V)
    pub min_voltage_v: f32,

    // --- Sampling ---
    /// Conversions averaged per emitted reading
    pub sample_window: u8,
    /// ADC calibration constants
    pub calibration: Calibration,

    // --- Efficiency estimate ---
    /// At or below this input power no transfer is assumed (W)
    pub min_power_w: f32,
    /// Below this input power the light-load penalty applies (W)
    pub low_power_w: f32,
    /// Lower bound of the base efficiency range (%)
    pub efficiency_base_min_pct: u8,
    /// Upper bound of the base efficiency range (%)
    pub efficiency_base_max_pct: u8,
    /// Light-load penalty subtracted from the base figure (%)
    pub low_power_penalty_pct: f32,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            // Timing
            control_loop_interval_ms: 500, // 2 Hz
            presence_debounce_ms: 1000,
            emergency_cooldown_ms: 3000,
            alert_pulse_ms: 500,
            telemetry_interval_secs: 30,
            window_policy: WindowPolicy::Blocking,

            // Safety
            max_current_a: 3.0,
            min_voltage_v: 10.0,

            // Sampling
            sample_window: 5,
            calibration: Calibration::default(),

            // Efficiency
            min_power_w: 0.5,
            low_power_w: 5.0,
            efficiency_base_min_pct: 78,
            efficiency_base_max_pct: 88,
            low_power_penalty_pct: 15.0,
        }
    }
}

impl PadConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_loop_interval_ms == 0 {
            return Err(ConfigError::Invalid("control_loop_interval_ms must be > 0"));
        }
        if self.presence_debounce_ms == 0 {
            return Err(ConfigError::Invalid("presence_debounce_ms must be > 0"));
        }
        if self.emergency_cooldown_ms == 0 {
            return Err(ConfigError::Invalid("emergency_cooldown_ms must be > 0"));
        }
        if self.alert_pulse_ms < self.control_loop_interval_ms {
            return Err(ConfigError::Invalid(
                "alert_pulse_ms must be >= control_loop_interval_ms",
            ));
        }
        if !(self.max_current_a > 0.0) {
            return Err(ConfigError::Invalid("max_current_a must be > 0"));
        }
        if !(self.min_voltage_v >= 0.0) {
            return Err(ConfigError::Invalid("min_voltage_v must be >= 0"));
        }
        if self.sample_window == 0 {
            return Err(ConfigError::Invalid("sample_window must be >= 1"));
        }
        let cal = &self.calibration;
        if cal.adc_max == 0 || !(cal.adc_ref_v > 0.0) || !(cal.current_sensitivity_v_per_a > 0.0) {
            return Err(ConfigError::Invalid("calibration constants must be > 0"));
        }
        if self.efficiency_base_min_pct > self.efficiency_base_max_pct
            || self.efficiency_base_max_pct > 100
        {
            return Err(ConfigError::Invalid("efficiency base range must be within 0..=100"));
        }
        if self.low_power_w < self.min_power_w {
            return Err(ConfigError::Invalid("low_power_w must be >= min_power_w"));
        }
        if !(self.low_power_penalty_pct >= 0.0) {
            return Err(ConfigError::Invalid("low_power_penalty_pct must be >= 0"));
        }
        Ok(())
    }
}
