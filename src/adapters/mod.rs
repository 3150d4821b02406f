//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                  | Connects to                |
//! |---------------|-----------------------------|----------------------------|
//! | `hardware`    | PresencePort, AnalogPort,   | GPIO, ADC1, relay, buzzer  |
//! |               | ActuatorPort                |                            |
//! | `display`     | StatusSink                  | 16x2 I²C LCD (or the log)  |
//! | `log_sink`    | EventSink, StatusSink       | Serial log output          |
//! | `time`        | —                           | ESP32 system timer         |
//! | `console_log` | tracing subscriber (host)   | stderr                     |

#[cfg(not(target_os = "espidf"))]
pub mod console_log;
pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod time;
