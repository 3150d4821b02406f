//! Application service: the hexagonal core.
//!
//! [`ChargeSessionController`] owns the FSM, sampler, efficiency
//! estimator and safety monitor.  All I/O flows through port traits
//! injected at call sites, so the whole controller runs against mock
//! adapters in tests.
//!
//! ```text
//!  PresencePort ──▶ ┌───────────────────────────────┐ ──▶ EventSink
//!    AnalogPort ──▶ │    ChargeSessionController    │ ──▶ StatusSink
//!  ActuatorPort ◀── │ FSM · Sampler · Est. · Safety │
//!                   └───────────────────────────────┘
//! ```
//!
//! Per tick: read presence → (charging only) sample → estimate →
//! safety-check → FSM → actuators → events → status.

use log::{debug, info};

use crate::config::{PadConfig, WindowPolicy};
use crate::efficiency::{EfficiencyEstimator, PlaceholderEstimator, XorShift32};
use crate::error::{ConfigError, Result};
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::safety::SafetyMonitor;
use crate::sensors::sampler::{Reading, SensorSampler};

use super::events::{AppEvent, StatusUpdate, TelemetryData};
use super::ports::{ActuatorPort, AnalogPort, EventSink, PresencePort, StatusSink};

/// Lifetime counters, reset only by a power cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub sessions_completed: u32,
    pub emergency_stops: u32,
    pub over_current_trips: u32,
    pub low_voltage_trips: u32,
}

// ───────────────────────────────────────────────────────────────
// ChargeSessionController
// ───────────────────────────────────────────────────────────────

/// The charging session controller.  One per pad.
pub struct ChargeSessionController<E: EfficiencyEstimator = PlaceholderEstimator<XorShift32>> {
    fsm: Fsm,
    ctx: FsmContext,
    sampler: SensorSampler,
    estimator: E,
    safety: SafetyMonitor,
    /// Latest reading of the current session.
    reading: Reading,
    /// Siren level last written to the actuator port.
    siren_on: bool,
    last_tick_ms: Option<u64>,
}

impl ChargeSessionController {
    /// Build a controller with the placeholder efficiency model seeded
    /// from `rng_seed`.
    ///
    /// Does **not** start the FSM: call [`start`](Self::start) next.
    pub fn new(config: PadConfig, rng_seed: u32) -> Result<Self> {
        let estimator = PlaceholderEstimator::new(&config, XorShift32::new(rng_seed));
        Self::with_estimator(config, estimator)
    }
}

impl<E: EfficiencyEstimator> ChargeSessionController<E> {
    /// Build a controller around a caller-supplied efficiency model.
    pub fn with_estimator(config: PadConfig, estimator: E) -> Result<Self> {
        config.validate()?;

        let sampler = SensorSampler::new(config.calibration, config.sample_window);
        let safety = SafetyMonitor::new(&config);
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Idle);

        Ok(Self {
            fsm,
            ctx,
            sampler,
            estimator,
            safety,
            reading: Reading::default(),
            siren_on: false,
            last_tick_ms: None,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the outputs in a safe state and enter `Idle`.
    pub fn start(&mut self, now_ms: u64, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        self.siren_on = false;
        self.ctx.now_ms = now_ms;
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("Controller started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run a tick only if the control interval has elapsed since the
    /// previous one.  Late ticks run late; missed ticks are not replayed.
    /// Returns `true` when a tick ran.
    pub fn poll(
        &mut self,
        now_ms: u64,
        hw: &mut (impl PresencePort + AnalogPort + ActuatorPort),
        sink: &mut impl EventSink,
        status: &mut impl StatusSink,
    ) -> bool {
        let interval = u64::from(self.ctx.config.control_loop_interval_ms);
        if let Some(last) = self.last_tick_ms {
            if now_ms.saturating_sub(last) < interval {
                return false;
            }
        }
        self.tick(now_ms, hw, sink, status);
        true
    }

    /// Run one full control cycle unconditionally.
    ///
    /// The `hw` parameter satisfies all three hardware ports, which
    /// avoids a double mutable borrow while keeping the boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl PresencePort + AnalogPort + ActuatorPort),
        sink: &mut impl EventSink,
        status: &mut impl StatusSink,
    ) {
        self.last_tick_ms = Some(now_ms);
        self.ctx.now_ms = now_ms;
        let prev_state = self.fsm.current_state();

        // 1. Presence
        self.ctx.presence = hw.vehicle_present();

        // 2. Sample → estimate → safety, only while a session is live
        let mut sampled = false;
        if prev_state == StateId::Charging && self.ctx.presence {
            let reading = self.sampler.sample(hw);
            let efficiency = self.estimator.estimate(reading.power);
            self.reading = reading;
            self.ctx.efficiency_pct = efficiency.percent;
            self.ctx.violation = self.safety.check(&reading, prev_state);
            debug!(
                "tick {}ms: V={:.2} I={:.3} P={:.2} eff={:.0}%",
                now_ms, reading.input_voltage, reading.current, reading.power, efficiency.percent
            );
            sampled = true;
        }

        // 3. State machine
        self.fsm.tick(&mut self.ctx);
        let new_state = self.fsm.current_state();

        if new_state == StateId::Charging && prev_state != StateId::Charging {
            self.sampler.reset();
            self.reading = Reading::default();
        }

        // 4. Actuators
        self.apply_actuators(hw);

        // 5. Events, then status for this tick
        let mut rendered = false;
        for event in self.ctx.outbox.iter() {
            match event {
                AppEvent::SessionStopped(summary) => {
                    status.render(&StatusUpdate::from(*summary));
                    rendered = true;
                }
                AppEvent::EmergencyStop(reason) => {
                    status.render(&StatusUpdate::EmergencyStop { reason: *reason });
                    rendered = true;
                }
                _ => {}
            }
            sink.emit(event);
        }
        self.ctx.outbox.clear();

        if !rendered {
            if let Some(update) = self.idle_status(new_state, sampled) {
                status.render(&update);
            }
        }

        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Configuration ─────────────────────────────────────────

    /// Replace the live configuration.  Only accepted while `Idle`, so a
    /// session never straddles two sets of thresholds.
    pub fn apply_config(&mut self, config: PadConfig) -> core::result::Result<(), ConfigError> {
        config.validate()?;
        if self.fsm.current_state() != StateId::Idle {
            return Err(ConfigError::Busy);
        }
        self.sampler
            .reconfigure(config.calibration, config.sample_window);
        self.estimator.reconfigure(&config);
        self.safety.set_limits(&config);
        self.ctx.config = config;
        info!("Configuration updated at runtime");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self, relay_on: bool) -> TelemetryData {
        let stats = self.stats();
        TelemetryData {
            state: self.fsm.current_state(),
            reading: self.reading,
            efficiency_pct: self.ctx.efficiency_pct,
            relay_on,
            sessions_completed: stats.sessions_completed,
            emergency_stops: stats.emergency_stops,
            over_current_trips: stats.over_current_trips,
            low_voltage_trips: stats.low_voltage_trips,
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Latest reading of the current (or last) session.
    pub fn last_reading(&self) -> Reading {
        self.reading
    }

    /// Latest efficiency estimate (%).
    pub fn efficiency_pct(&self) -> f32 {
        self.ctx.efficiency_pct
    }

    pub fn stats(&self) -> ControllerStats {
        ControllerStats {
            sessions_completed: self.ctx.sessions_completed,
            emergency_stops: self.ctx.emergency_stops,
            over_current_trips: self.safety.over_current_trips(),
            low_voltage_trips: self.safety.low_voltage_trips(),
        }
    }

    pub fn config(&self) -> &PadConfig {
        &self.ctx.config
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.fsm.tick_count()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate FSM commands into port calls.  The relay is gated on the
    /// state as well as the command, and only written on change.
    fn apply_actuators(&mut self, hw: &mut impl ActuatorPort) {
        let relay = self.ctx.commands.relay_on && self.fsm.current_state() == StateId::Charging;
        if relay != hw.is_relay_on() {
            hw.set_relay(relay);
        }

        if self.ctx.commands.siren != self.siren_on {
            hw.set_siren(self.ctx.commands.siren);
            self.siren_on = self.ctx.commands.siren;
        }

        if self.ctx.commands.chirp > 0 {
            hw.chirp(self.ctx.commands.chirp);
            self.ctx.commands.chirp = 0;
        }
    }

    /// Status for a tick that produced no session-end or interlock report.
    fn idle_status(&self, state: StateId, sampled: bool) -> Option<StatusUpdate> {
        let live = self.ctx.config.window_policy == WindowPolicy::NonBlocking;
        match state {
            StateId::Idle => Some(StatusUpdate::Waiting),
            StateId::ConfirmingPresence if live => Some(StatusUpdate::Waiting),
            StateId::Charging if sampled => {
                Some(StatusUpdate::charging(&self.reading, self.ctx.efficiency_pct))
            }
            StateId::EmergencyStopped if live => self
                .ctx
                .active_violation
                .map(|reason| StatusUpdate::EmergencyStop { reason }),
            _ => None,
        }
    }
}
