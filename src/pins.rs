//! GPIO / peripheral pin assignments for the pad controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Coil power stage
// ---------------------------------------------------------------------------

/// Digital output: relay coil driver for the transmitter supply (active HIGH).
pub const RELAY_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// Supply voltage through the 30k/7.5k divider.
/// ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const VOLTAGE_ADC_GPIO: i32 = 1;
/// ACS712 hall current sensor output.
/// ADC1 channel 1 (GPIO 2 on ESP32-S3).
pub const CURRENT_ADC_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Sensors: Digital
// ---------------------------------------------------------------------------

/// IR obstacle sensor output. LOW = object in range.
pub const PRESENCE_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// Active piezo buzzer (active HIGH).
pub const BUZZER_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// I²C bus (16x2 character LCD behind a PCF8574 backpack)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
