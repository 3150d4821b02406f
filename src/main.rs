//! Inductive Charging Pad Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  PadHardware            LogEventSink    DisplayStatusSink      │
//! │  (Presence+Analog+      (EventSink)     + LogStatusSink        │
//! │   Actuator)                             (StatusSink)           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │         ChargeSessionController (pure logic)           │    │
//! │  │  FSM · Sampler · Efficiency · Safety                   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  MonotonicClock · Watchdog                                     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{debug, info};

use iptpad::adapters::log_sink::LogEventSink;
use iptpad::adapters::time::MonotonicClock;
use iptpad::app::events::AppEvent;
use iptpad::app::ports::{ActuatorPort, EventSink};
use iptpad::app::service::ChargeSessionController;
use iptpad::config::PadConfig;
use iptpad::drivers::watchdog::{WATCHDOG_TIMEOUT_MS, Watchdog};

/// Sleep between gate checks; well under the control interval.
const IDLE_SLICE_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. Runtime bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    iptpad::adapters::console_log::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  IPT Pad v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (compiled-in, nothing persisted) ─────
    let config = PadConfig::default();
    config.validate()?;
    if let Ok(json) = serde_json::to_string(&config) {
        debug!("config: {json}");
    }

    // ── 3. Hardware + sinks ───────────────────────────────────
    let (mut hw, mut status) = board::build(&config)?;
    let mut events = LogEventSink::new();
    let clock = MonotonicClock::new();
    let mut watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);

    // ── 4. Controller ─────────────────────────────────────────
    let mut controller = ChargeSessionController::new(config.clone(), board::rng_seed())?;
    controller.start(clock.uptime_ms(), &mut hw, &mut events);

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    let telemetry_ms = u64::from(config.telemetry_interval_secs) * 1000;
    let mut next_telemetry_ms = clock.uptime_ms() + telemetry_ms;

    loop {
        let now_ms = clock.uptime_ms();

        #[cfg(not(target_os = "espidf"))]
        board::drive_scenario(now_ms);

        controller.poll(now_ms, &mut hw, &mut events, &mut status);

        if telemetry_ms > 0 && now_ms >= next_telemetry_ms {
            let t = controller.build_telemetry(hw.is_relay_on());
            events.emit(&AppEvent::Telemetry(t));
            next_telemetry_ms = now_ms + telemetry_ms;
        }

        watchdog.feed();
        board::sleep_ms(IDLE_SLICE_MS);
    }
}

// ── Board wiring: ESP32-S3 ────────────────────────────────────

#[cfg(target_os = "espidf")]
mod board {
    use anyhow::Result;
    use esp_idf_hal::delay::{Delay, FreeRtos};
    use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver};
    use esp_idf_hal::i2c::{I2C0, I2cConfig, I2cDriver};
    use esp_idf_hal::units::FromValueType;
    use log::{info, warn};

    use iptpad::adapters::display::DisplayStatusSink;
    use iptpad::adapters::hardware::PadHardware;
    use iptpad::adapters::log_sink::LogStatusSink;
    use iptpad::app::ports::{ActuatorPort, AnalogPort, PresencePort, StatusSink};
    use iptpad::config::PadConfig;
    use iptpad::drivers::buzzer::BuzzerDriver;
    use iptpad::drivers::hw_init;
    use iptpad::drivers::lcd::{DEFAULT_ADDR, Lcd1602};
    use iptpad::drivers::relay::RelayDriver;
    use iptpad::pins;
    use iptpad::sensors::AdcFrontEnd;
    use iptpad::sensors::presence::{Polarity, PresenceSensor};

    pub fn build(
        _config: &PadConfig,
    ) -> Result<(
        impl PresencePort + AnalogPort + ActuatorPort,
        impl StatusSink,
    )> {
        hw_init::init_adc()?;

        // SAFETY: each GPIO number is claimed exactly once, here, and the
        // numbers come from the board pin map.
        let (relay_pin, buzzer_pin, presence_pin, sda, scl, i2c0) = unsafe {
            (
                AnyOutputPin::new(pins::RELAY_GPIO),
                AnyOutputPin::new(pins::BUZZER_GPIO),
                AnyInputPin::new(pins::PRESENCE_GPIO),
                AnyIOPin::new(pins::I2C_SDA_GPIO),
                AnyIOPin::new(pins::I2C_SCL_GPIO),
                I2C0::new(),
            )
        };

        let hw = PadHardware::new(
            PresenceSensor::new(PinDriver::input(presence_pin)?, Polarity::ActiveLow),
            AdcFrontEnd::new(),
            RelayDriver::new(PinDriver::output(relay_pin)?),
            BuzzerDriver::new(PinDriver::output(buzzer_pin)?),
        );

        let i2c_cfg = I2cConfig::new().baudrate(100.kHz().into());
        let i2c = I2cDriver::new(i2c0, sda, scl, &i2c_cfg)?;
        let mut lcd = Lcd1602::new(i2c, Delay::new_default(), DEFAULT_ADDR);
        match lcd.init() {
            Ok(()) => info!("LCD ready at 0x{:02X}", DEFAULT_ADDR),
            Err(e) => warn!("LCD init failed ({:?}), continuing without display", e),
        }

        Ok((hw, (DisplayStatusSink::new(lcd), LogStatusSink::new())))
    }

    /// Seed for the efficiency placeholder, from the hardware RNG.
    pub fn rng_seed() -> u32 {
        // SAFETY: esp_random has no preconditions.
        unsafe { esp_idf_svc::sys::esp_random() }
    }

    pub fn sleep_ms(ms: u32) {
        FreeRtos::delay_ms(ms);
    }
}

// ── Board wiring: host simulation ─────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod board {
    use anyhow::Result;

    use iptpad::adapters::display::{DisplayStatusSink, LogPanel};
    use iptpad::adapters::hardware::PadHardware;
    use iptpad::app::ports::{ActuatorPort, AnalogPort, PresencePort, StatusSink};
    use iptpad::config::PadConfig;
    use iptpad::drivers::buzzer::BuzzerDriver;
    use iptpad::drivers::hw_init::{self, ADC1_CH_CURRENT, ADC1_CH_VOLTAGE, SimPin};
    use iptpad::drivers::relay::RelayDriver;
    use iptpad::pins;
    use iptpad::sensors::AdcFrontEnd;
    use iptpad::sensors::presence::{Polarity, PresenceSensor};

    /// Scenario period: a vehicle parks for 10 s out of every 20 s.
    const SCENARIO_PERIOD_MS: u64 = 20_000;
    const ARRIVE_MS: u64 = 2_000;
    const LEAVE_MS: u64 = 12_000;

    /// Raw counts for 12.0 V and 1.5 A with the default calibration.
    const SIM_VOLTAGE_RAW: u16 = 491;
    const SIM_CURRENT_RAW: u16 = 568;

    pub fn build(
        _config: &PadConfig,
    ) -> Result<(
        impl PresencePort + AnalogPort + ActuatorPort,
        impl StatusSink,
    )> {
        hw_init::init_adc()?;
        hw_init::sim_set_adc(ADC1_CH_VOLTAGE, SIM_VOLTAGE_RAW);
        hw_init::sim_set_adc(ADC1_CH_CURRENT, SIM_CURRENT_RAW);
        // Active-low sensor idles high (nothing on the pad).
        hw_init::sim_set_gpio(pins::PRESENCE_GPIO, true);

        let hw = PadHardware::new(
            PresenceSensor::new(SimPin::new(pins::PRESENCE_GPIO), Polarity::ActiveLow),
            AdcFrontEnd::new(),
            RelayDriver::new(SimPin::new(pins::RELAY_GPIO)),
            BuzzerDriver::new(SimPin::new(pins::BUZZER_GPIO)),
        );
        Ok((hw, DisplayStatusSink::new(LogPanel)))
    }

    /// Park and remove a simulated vehicle on a fixed schedule.
    pub fn drive_scenario(now_ms: u64) {
        let phase = now_ms % SCENARIO_PERIOD_MS;
        let present = (ARRIVE_MS..LEAVE_MS).contains(&phase);
        hw_init::sim_set_gpio(pins::PRESENCE_GPIO, !present);
    }

    /// `IPTPAD_SEED` if set, otherwise wall-clock nanoseconds.
    pub fn rng_seed() -> u32 {
        std::env::var("IPTPAD_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map_or(1, |d| d.subsec_nanos())
            })
    }

    pub fn sleep_ms(ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
