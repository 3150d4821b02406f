//! Log-based event and status sinks.
//!
//! Implements [`EventSink`] and [`StatusSink`] by writing to the `log`
//! facade (UART / USB-CDC on the device, stderr on host).  This is the
//! pad's diagnostic text stream.

use log::{info, warn};

use crate::app::events::{AppEvent, StatusUpdate, TelemetryData};
use crate::app::ports::{EventSink, StatusSink};
use crate::efficiency::EfficiencyEstimate;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    /// Telemetry as one JSON object per line instead of the text form.
    json_telemetry: bool,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Machine-readable telemetry lines (`TELEM {..}`).
    pub fn with_json_telemetry() -> Self {
        Self {
            json_telemetry: true,
        }
    }

    fn telemetry(&self, t: &TelemetryData) {
        if self.json_telemetry {
            match serde_json::to_string(t) {
                Ok(json) => info!("TELEM {json}"),
                Err(e) => warn!("TELEM | encode failed: {e}"),
            }
            return;
        }
        info!(
            "TELEM | state={:?} | V={:.1}V I={:.2}A P={:.1}W eff={}% | relay={} | \
             sessions={} estops={} (oc={} lv={})",
            t.state,
            t.reading.input_voltage,
            t.reading.current,
            t.reading.power,
            EfficiencyEstimate::new(t.efficiency_pct).whole_percent(),
            if t.relay_on { "ON" } else { "OFF" },
            t.sessions_completed,
            t.emergency_stops,
            t.over_current_trips,
            t.low_voltage_trips,
        );
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => self.telemetry(t),
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::SessionStarted { at_ms } => {
                info!("SESSION | started at {}ms", at_ms);
            }
            AppEvent::SessionStopped(s) => {
                info!(
                    "SESSION | stopped after {}s, efficiency {}%",
                    s.duration_secs,
                    EfficiencyEstimate::new(s.last_efficiency).whole_percent()
                );
            }
            AppEvent::EmergencyStop(v) => {
                warn!("ESTOP | {}", v);
            }
            AppEvent::EmergencyCleared => {
                info!("ESTOP | cooldown complete");
            }
        }
    }
}

/// Adapter that mirrors status changes to the serial console.  An update
/// equal to the previous one is not logged again.
#[derive(Debug, Default)]
pub struct LogStatusSink {
    last: Option<StatusUpdate>,
}

impl LogStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when `update` differs from the last one logged.
    fn changed(&mut self, update: &StatusUpdate) -> bool {
        if self.last.as_ref() == Some(update) {
            return false;
        }
        self.last = Some(*update);
        true
    }
}

impl StatusSink for LogStatusSink {
    fn render(&mut self, update: &StatusUpdate) {
        if !self.changed(update) {
            return;
        }
        match *update {
            StatusUpdate::Waiting => info!("STATUS | waiting for vehicle"),
            StatusUpdate::Charging {
                voltage,
                current,
                power,
                efficiency,
            } => info!(
                "STATUS | charging V={:.1}V I={:.2}A P={:.1}W eff={}%",
                voltage,
                current,
                power,
                EfficiencyEstimate::new(efficiency).whole_percent()
            ),
            StatusUpdate::SessionEnded {
                duration_secs,
                efficiency,
            } => info!(
                "STATUS | session ended duration={}s eff={}%",
                duration_secs,
                EfficiencyEstimate::new(efficiency).whole_percent()
            ),
            StatusUpdate::EmergencyStop { reason } => {
                warn!("STATUS | EMERGENCY STOP: {}", reason);
            }
        }
    }
}
