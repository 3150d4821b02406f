//! Charging session scenarios: ChargeSessionController → FSM → mock pad.

use crate::mock_hw::{EventLog, MockPad, StatusLog};

use iptpad::app::events::{AppEvent, StatusUpdate};
use iptpad::app::ports::ActuatorPort;
use iptpad::app::service::ChargeSessionController;
use iptpad::config::{PadConfig, WindowPolicy};
use iptpad::error::{ConfigError, Violation};
use iptpad::fsm::StateId;

const TICK_MS: u64 = 500;

struct Harness {
    ctl: ChargeSessionController,
    pad: MockPad,
    events: EventLog,
    status: StatusLog,
}

impl Harness {
    fn new(config: PadConfig) -> Self {
        let mut h = Self {
            ctl: ChargeSessionController::new(config, 0x5EED).unwrap(),
            pad: MockPad::new(),
            events: EventLog::default(),
            status: StatusLog::default(),
        };
        h.ctl.start(0, &mut h.pad, &mut h.events);
        h
    }

    fn tick(&mut self, now_ms: u64) {
        self.ctl
            .tick(now_ms, &mut self.pad, &mut self.events, &mut self.status);
    }

    /// Tick every `TICK_MS` over `[from, to]`.
    fn run(&mut self, from: u64, to: u64) {
        let mut t = from;
        while t <= to {
            self.tick(t);
            t += TICK_MS;
        }
    }

    fn started(&self) -> usize {
        self.events
            .count(|e| matches!(e, AppEvent::SessionStarted { .. }))
    }

    fn stopped(&self) -> usize {
        self.events.count(|e| matches!(e, AppEvent::SessionStopped(_)))
    }

    /// Presence at t=0, held until the session starts at t=1000.
    fn charging_from_1000(config: PadConfig) -> Self {
        let mut h = Self::new(config);
        h.pad.present = true;
        h.run(0, 1000);
        assert_eq!(h.ctl.state(), StateId::Charging);
        h
    }
}

// ── End-to-end ────────────────────────────────────────────────

#[test]
fn end_to_end_session() {
    let mut h = Harness::new(PadConfig::default());
    h.pad.present = true;

    h.tick(0);
    h.tick(500);
    assert!(!h.pad.is_relay_on(), "relay must stay open during debounce");

    h.tick(1000);
    assert_eq!(h.ctl.state(), StateId::Charging);
    assert!(h.pad.is_relay_on());

    h.run(1500, 4500);
    let reading = h.ctl.last_reading();
    assert!((reading.input_voltage - 12.0).abs() < 0.05, "{reading:?}");
    assert!((reading.current - 1.5).abs() < 0.02, "{reading:?}");
    assert!((reading.power - 18.0).abs() < 0.3, "{reading:?}");
    let eff = h.ctl.efficiency_pct();
    assert!((77.0..=88.0).contains(&eff), "efficiency {eff}");

    h.pad.present = false;
    h.tick(5000);
    assert_eq!(h.ctl.state(), StateId::Idle);
    assert!(!h.pad.is_relay_on());

    let summary = h
        .events
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::SessionStopped(s) => Some(*s),
            _ => None,
        })
        .expect("stop notification");
    assert_eq!(summary.duration_secs, 4);
    assert_eq!(summary.last_efficiency, eff);

    assert_eq!(h.started(), 1);
    assert_eq!(h.stopped(), 1);
    assert_eq!(h.pad.relay_activations(), 1);
    assert_eq!(h.pad.chirps(), vec![2, 1]);
    assert_eq!(h.ctl.stats().sessions_completed, 1);
}

#[test]
fn status_stream_follows_session() {
    let mut h = Harness::charging_from_1000(PadConfig::default());
    h.tick(1500);
    h.pad.present = false;
    h.tick(2000);
    h.tick(2500);

    let tail: Vec<_> = h.status.updates.iter().rev().take(3).rev().copied().collect();
    assert!(matches!(tail[0], StatusUpdate::Charging { .. }));
    assert!(matches!(tail[1], StatusUpdate::SessionEnded { duration_secs: 1, .. }));
    assert_eq!(tail[2], StatusUpdate::Waiting);
}

// ── Debounce ──────────────────────────────────────────────────

#[test]
fn blip_shorter_than_debounce_never_charges() {
    for policy in [WindowPolicy::Blocking, WindowPolicy::NonBlocking] {
        let mut cfg = PadConfig::default();
        cfg.window_policy = policy;
        let mut h = Harness::new(cfg);

        h.pad.present = true;
        h.tick(0);
        h.pad.present = false;
        h.run(500, 3000);

        assert_eq!(h.ctl.state(), StateId::Idle, "{policy:?}");
        assert_eq!(h.pad.relay_activations(), 0, "{policy:?}");
        assert_eq!(h.started(), 0, "{policy:?}");
        assert!(h.pad.chirps().is_empty(), "{policy:?}");
    }
}

#[test]
fn non_blocking_debounce_aborts_on_first_absent_tick() {
    let mut cfg = PadConfig::default();
    cfg.window_policy = WindowPolicy::NonBlocking;
    let mut h = Harness::new(cfg);

    h.pad.present = true;
    h.tick(0);
    assert_eq!(h.ctl.state(), StateId::ConfirmingPresence);
    h.pad.present = false;
    h.tick(500);
    assert_eq!(h.ctl.state(), StateId::Idle);
}

// ── Idempotence ───────────────────────────────────────────────

#[test]
fn idle_ticks_are_idempotent() {
    let mut h = Harness::new(PadConfig::default());
    h.run(0, 10_000);

    assert_eq!(h.ctl.state(), StateId::Idle);
    assert_eq!(h.pad.relay_writes(), 0);
    assert_eq!(h.started(), 0);
    assert!(
        h.events
            .events
            .iter()
            .all(|e| matches!(e, AppEvent::Started(StateId::Idle)))
    );
    assert!(h.status.updates.iter().all(|s| *s == StatusUpdate::Waiting));
}

#[test]
fn held_presence_starts_exactly_one_session() {
    let mut h = Harness::charging_from_1000(PadConfig::default());
    h.run(1500, 20_000);
    assert_eq!(h.started(), 1);
    assert_eq!(h.pad.relay_activations(), 1);
}

// ── Interlock ─────────────────────────────────────────────────

#[test]
fn over_current_stops_within_one_tick_and_holds_for_cooldown() {
    let cfg = PadConfig::default();
    let cooldown = u64::from(cfg.emergency_cooldown_ms);
    let mut h = Harness::charging_from_1000(cfg);

    h.pad.set_line(12.0, 4.0);
    h.tick(1500);
    assert_eq!(h.ctl.state(), StateId::EmergencyStopped);
    assert!(!h.pad.is_relay_on());
    assert!(h.pad.siren_on());
    assert!(
        h.events
            .events
            .contains(&AppEvent::EmergencyStop(Violation::OverCurrent))
    );
    assert_eq!(
        h.status.updates.last(),
        Some(&StatusUpdate::EmergencyStop {
            reason: Violation::OverCurrent
        })
    );
    // Emergency is not a normal stop.
    assert_eq!(h.stopped(), 0);

    h.pad.present = false;
    h.pad.set_line(12.0, 1.5);
    let mut t = 1500 + TICK_MS;
    while t < 1500 + cooldown {
        h.tick(t);
        assert_eq!(h.ctl.state(), StateId::EmergencyStopped, "left early at {t}");
        assert!(!h.pad.is_relay_on());
        t += TICK_MS;
    }

    h.tick(1500 + cooldown);
    assert_eq!(h.ctl.state(), StateId::Idle);
    assert!(!h.pad.siren_on());
    assert!(h.events.events.contains(&AppEvent::EmergencyCleared));
    assert_eq!(h.ctl.stats().emergency_stops, 1);
    assert_eq!(h.ctl.stats().over_current_trips, 1);
}

#[test]
fn siren_alternates_through_cooldown_at_loop_cadence() {
    let cfg = PadConfig::default();
    let cooldown = u64::from(cfg.emergency_cooldown_ms);
    let mut h = Harness::charging_from_1000(cfg);
    h.pad.set_line(12.0, 4.0);
    h.tick(1500);
    assert!(h.pad.siren_on());

    h.pad.present = false;
    let mut levels = Vec::new();
    let mut t = 1500 + TICK_MS;
    while t < 1500 + cooldown {
        h.tick(t);
        levels.push(h.pad.siren_on());
        t += TICK_MS;
    }
    assert_eq!(levels, vec![false, true, false, true, false]);
    assert!(levels.windows(2).all(|w| w[0] != w[1]), "{levels:?}");

    h.tick(1500 + cooldown);
    assert_eq!(h.ctl.state(), StateId::Idle);
    assert!(!h.pad.siren_on());
}

#[test]
fn vehicle_still_present_after_cooldown_rearms() {
    let mut h = Harness::charging_from_1000(PadConfig::default());
    h.pad.set_line(12.0, 4.0);
    h.tick(1500);
    h.pad.set_line(12.0, 1.5);

    // Cooldown ends at 4500, debounce re-runs from 5000, new session at 6000.
    h.run(2000, 5500);
    assert_eq!(h.ctl.state(), StateId::ConfirmingPresence);
    h.tick(6000);
    assert_eq!(h.ctl.state(), StateId::Charging);
    assert_eq!(h.started(), 2);
    assert_eq!(h.pad.relay_activations(), 2);
}

#[test]
fn low_voltage_trips_only_once_the_window_flushes() {
    let mut h = Harness::charging_from_1000(PadConfig::default());
    // Five samples at 12 V: 1500..=3500 fills the first window.
    h.run(1500, 3500);

    h.pad.set_line(9.0, 1.5);
    // The held 12 V value masks the sag for four more samples.
    h.run(4000, 5500);
    assert_eq!(h.ctl.state(), StateId::Charging);

    h.tick(6000);
    assert_eq!(h.ctl.state(), StateId::EmergencyStopped);
    assert!(
        h.events
            .events
            .contains(&AppEvent::EmergencyStop(Violation::LowVoltage))
    );
    assert_eq!(h.ctl.stats().low_voltage_trips, 1);
}

#[test]
fn low_voltage_at_session_start_trips_on_first_sample() {
    let mut h = Harness::charging_from_1000(PadConfig::default());
    h.pad.set_line(8.0, 1.0);
    h.tick(1500);
    assert_eq!(h.ctl.state(), StateId::EmergencyStopped);
}

// ── Window policy ─────────────────────────────────────────────

#[test]
fn blocking_emergency_window_freezes_display() {
    let mut h = Harness::charging_from_1000(PadConfig::default());
    h.pad.set_line(12.0, 4.0);
    h.tick(1500);
    let rendered = h.status.updates.len();
    h.run(2000, 4000);
    assert_eq!(h.status.updates.len(), rendered);
}

#[test]
fn non_blocking_emergency_window_keeps_refreshing() {
    let mut cfg = PadConfig::default();
    cfg.window_policy = WindowPolicy::NonBlocking;
    let mut h = Harness::charging_from_1000(cfg);
    h.pad.set_line(12.0, 4.0);
    h.tick(1500);
    let rendered = h.status.updates.len();
    h.run(2000, 4000);
    assert_eq!(h.status.updates.len(), rendered + 5);
    assert!(h.status.updates[rendered..].iter().all(|s| *s
        == StatusUpdate::EmergencyStop {
            reason: Violation::OverCurrent
        }));
}

// ── Cadence ───────────────────────────────────────────────────

#[test]
fn poll_runs_late_ticks_without_catch_up() {
    let mut h = Harness::new(PadConfig::default());
    let Harness {
        ctl,
        pad,
        events,
        status,
    } = &mut h;

    let ran: Vec<bool> = [0, 100, 499, 500, 2300, 2400, 2800]
        .into_iter()
        .map(|t| ctl.poll(t, pad, events, status))
        .collect();
    assert_eq!(ran, vec![true, false, false, true, true, false, true]);
    assert_eq!(ctl.tick_count(), 4);
}

#[test]
fn debounce_measured_in_time_not_ticks() {
    let mut h = Harness::new(PadConfig::default());
    h.pad.present = true;
    h.tick(0);
    // One late tick past the window is enough.
    h.tick(1700);
    assert_eq!(h.ctl.state(), StateId::Charging);
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn config_reload_refused_mid_session() {
    let mut h = Harness::charging_from_1000(PadConfig::default());
    let mut cfg = PadConfig::default();
    cfg.max_current_a = 1.0;
    assert_eq!(h.ctl.apply_config(cfg.clone()), Err(ConfigError::Busy));

    h.pad.present = false;
    h.tick(1500);
    assert_eq!(h.ctl.apply_config(cfg), Ok(()));
    assert_eq!(h.ctl.config().max_current_a, 1.0);

    // New threshold applies to the next session.
    h.pad.present = true;
    h.run(2000, 3500);
    assert_eq!(h.ctl.state(), StateId::EmergencyStopped);
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_serialises_to_json() {
    let mut h = Harness::charging_from_1000(PadConfig::default());
    h.tick(1500);
    let t = h.ctl.build_telemetry(h.pad.is_relay_on());
    let json = serde_json::to_string(&t).unwrap();
    assert!(json.contains("\"state\":\"Charging\""), "{json}");
    assert!(json.contains("\"relay_on\":true"), "{json}");
}
