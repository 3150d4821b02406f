//! One-shot ADC initialisation and raw channel access.
//!
//! Digital pins go through `esp-idf-hal` `PinDriver`s (which implement the
//! `embedded-hal` traits); only the oneshot ADC needs raw sys calls.
//!
//! On host the ADC channels and GPIO levels are backed by atomics so the
//! simulator and tests can inject values.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

impl From<HwInitError> for crate::error::Error {
    fn from(_: HwInitError) -> Self {
        crate::error::Error::Init("ADC1")
    }
}

pub const ADC1_CH_VOLTAGE: u32 = 0;
pub const ADC1_CH_CURRENT: u32 = 1;

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
pub fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot, before the
    // control loop starts.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // 10-bit conversions to match the pad calibration constants.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_10,
    };
    for channel in [ADC1_CH_VOLTAGE, ADC1_CH_CURRENT] {
        // SAFETY: handle initialised above; single-threaded init path.
        let ret = unsafe { adc_oneshot_config_channel(ADC1_HANDLE, channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    log::info!("hw_init: ADC1 configured (CH0=voltage, CH1=current)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_adc() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ADC init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: ADC1_HANDLE is written once during init_adc() before this
    // function is called; single-threaded main-loop access guaranteed.
    let ret = unsafe { adc_oneshot_read(ADC1_HANDLE, channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
static SIM_ADC: [AtomicU16; 2] = [AtomicU16::new(0), AtomicU16::new(0)];

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(channel: u32) -> u16 {
    SIM_ADC
        .get(channel as usize)
        .map_or(0, |c| c.load(Ordering::Relaxed))
}

/// Inject a raw count on a simulated ADC channel.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(channel: u32, raw: u16) {
    if let Some(c) = SIM_ADC.get(channel as usize) {
        c.store(raw, Ordering::Relaxed);
    }
}

// ── Simulated GPIO ────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
const SIM_GPIO_COUNT: usize = 16;

#[cfg(not(target_os = "espidf"))]
#[allow(clippy::declare_interior_mutable_const)]
const SIM_LOW: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
static SIM_GPIO: [AtomicBool; SIM_GPIO_COUNT] = [SIM_LOW; SIM_GPIO_COUNT];

/// Drive a simulated GPIO level (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gpio(pin: i32, high: bool) {
    if let Some(g) = SIM_GPIO.get(pin as usize) {
        g.store(high, Ordering::Relaxed);
    }
}

/// Read back a simulated GPIO level (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_gpio_level(pin: i32) -> bool {
    SIM_GPIO
        .get(pin as usize)
        .is_some_and(|g| g.load(Ordering::Relaxed))
}

/// Host stand-in for a `PinDriver`: an `embedded-hal` pin backed by the
/// simulated GPIO table.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy)]
pub struct SimPin {
    gpio: i32,
}

#[cfg(not(target_os = "espidf"))]
impl SimPin {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::digital::OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        sim_set_gpio(self.gpio, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        sim_set_gpio(self.gpio, true);
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::digital::InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(sim_gpio_level(self.gpio))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!sim_gpio_level(self.gpio))
    }
}
