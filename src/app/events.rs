//! Outbound application events and status updates.
//!
//! The [`ChargeSessionController`](super::service::ChargeSessionController)
//! emits [`AppEvent`]s through the [`EventSink`](super::ports::EventSink)
//! port and [`StatusUpdate`]s through the
//! [`StatusSink`](super::ports::StatusSink) port.  Adapters on the other
//! side decide what to do with them.

use serde::{Deserialize, Serialize};

use crate::error::Violation;
use crate::fsm::StateId;
use crate::sensors::sampler::Reading;

/// Computed when a session ends normally; discarded after reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Whole seconds between relay close and session end (rounded down).
    pub duration_secs: u32,
    /// Last efficiency estimate of the session (%).
    pub last_efficiency: f32,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// The controller has started (carries initial state).
    Started(StateId),

    /// The state machine moved between states.
    StateChanged { from: StateId, to: StateId },

    /// Presence confirmed, relay closed.
    SessionStarted { at_ms: u64 },

    /// Vehicle left the pad, relay opened.
    SessionStopped(SessionSummary),

    /// Interlock tripped, relay forced open.
    EmergencyStop(Violation),

    /// Emergency cooldown elapsed, controller back to idle.
    EmergencyCleared,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// Display / log payloads.  Values are carried at full precision;
/// adapters round them (voltage 0.1 V, current 0.01 A, power 0.1 W,
/// efficiency whole percent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatusUpdate {
    Waiting,
    Charging {
        voltage: f32,
        current: f32,
        power: f32,
        efficiency: f32,
    },
    SessionEnded {
        duration_secs: u32,
        efficiency: f32,
    },
    EmergencyStop {
        reason: Violation,
    },
}

impl StatusUpdate {
    pub fn charging(reading: &Reading, efficiency: f32) -> Self {
        Self::Charging {
            voltage: reading.input_voltage,
            current: reading.current,
            power: reading.power,
            efficiency,
        }
    }
}

impl From<SessionSummary> for StatusUpdate {
    fn from(s: SessionSummary) -> Self {
        Self::SessionEnded {
            duration_secs: s.duration_secs,
            efficiency: s.last_efficiency,
        }
    }
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryData {
    pub state: StateId,
    pub reading: Reading,
    pub efficiency_pct: f32,
    pub relay_on: bool,
    pub sessions_completed: u32,
    pub emergency_stops: u32,
    pub over_current_trips: u32,
    pub low_voltage_trips: u32,
}
