//! Fuzz target: `ChargeSessionController` tick sequence
//!
//! Each 4-byte chunk of input is one tick: presence flag, tick gap, and
//! the two raw ADC channels.  Verifies:
//! - No panics under arbitrary inputs (including over-range ADC counts)
//! - The relay is closed exactly while the controller is `Charging`
//! - `EmergencyStopped` is never left before the cooldown has elapsed
//!
//! cargo fuzz run fuzz_controller_ticks

#![no_main]

use libfuzzer_sys::fuzz_target;

use iptpad::app::events::{AppEvent, StatusUpdate};
use iptpad::app::ports::{ActuatorPort, AnalogPort, EventSink, PresencePort, StatusSink};
use iptpad::app::service::ChargeSessionController;
use iptpad::config::{PadConfig, WindowPolicy};
use iptpad::fsm::StateId;

// ── In-memory pad ─────────────────────────────────────────────

#[derive(Default)]
struct Pad {
    present: bool,
    voltage_raw: u16,
    current_raw: u16,
    relay: bool,
}

impl PresencePort for Pad {
    fn vehicle_present(&mut self) -> bool {
        self.present
    }
}

impl AnalogPort for Pad {
    fn read_voltage_raw(&mut self) -> u16 {
        self.voltage_raw
    }
    fn read_current_raw(&mut self) -> u16 {
        self.current_raw
    }
}

impl ActuatorPort for Pad {
    fn set_relay(&mut self, on: bool) {
        self.relay = on;
    }
    fn is_relay_on(&self) -> bool {
        self.relay
    }
    fn chirp(&mut self, _pulses: u8) {}
    fn set_siren(&mut self, _on: bool) {}
    fn all_off(&mut self) {
        self.relay = false;
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

impl StatusSink for Discard {
    fn render(&mut self, _update: &StatusUpdate) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((&head, ticks)) = data.split_first() else {
        return;
    };

    let mut cfg = PadConfig::default();
    if head & 1 == 1 {
        cfg.window_policy = WindowPolicy::NonBlocking;
    }
    let cooldown = u64::from(cfg.emergency_cooldown_ms);

    let Ok(mut ctl) = ChargeSessionController::new(cfg, u32::from(head)) else {
        return;
    };
    let mut pad = Pad::default();
    ctl.start(0, &mut pad, &mut Discard);

    let mut now = 0u64;
    let mut emergency_since: Option<u64> = None;

    for chunk in ticks.chunks_exact(4) {
        pad.present = chunk[0] & 1 == 1;
        now += u64::from(chunk[1]) * 20;
        // Scale to the 10-bit range, with some counts past full scale.
        pad.voltage_raw = u16::from(chunk[2]) * 5;
        pad.current_raw = u16::from(chunk[3]) * 5;

        ctl.tick(now, &mut pad, &mut Discard, &mut Discard);
        let state = ctl.state();

        assert_eq!(pad.relay, state == StateId::Charging, "relay out of step");

        match (state, emergency_since) {
            (StateId::EmergencyStopped, None) => emergency_since = Some(now),
            (StateId::EmergencyStopped, Some(_)) => {}
            (_, Some(since)) => {
                assert!(now - since >= cooldown, "left emergency early");
                emergency_since = None;
            }
            (_, None) => {}
        }
    }
});
