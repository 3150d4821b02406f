//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers, so the table needs
//! neither closures nor a heap.
//!
//! ```text
//!  IDLE ──[presence]──▶ CONFIRMING ──[held through debounce]──▶ CHARGING
//!    ▲                      │                                  │     │
//!    │                [presence lost]                [cleared]  [violation]
//!    ├──────────────────────┘                                  │     │
//!    ├─────────────────────────────────────────────────────────┘     ▼
//!    └────────────────────[cooldown elapsed]──────────────── EMERGENCY
//! ```
//!
//! Under [`WindowPolicy::Blocking`] the debounce window re-checks presence
//! only once, when the window ends.  Under `NonBlocking` it re-checks on
//! every tick and aborts as soon as presence drops.

use log::{info, warn};

use super::context::{FsmContext, PadCommands};
use super::{StateDescriptor, StateId};
use crate::app::events::{AppEvent, SessionSummary};
use crate::config::WindowPolicy;

/// Pulses chirped when a session starts.
pub const START_CHIRPS: u8 = 2;
/// Pulses chirped when a session ends normally.
pub const STOP_CHIRPS: u8 = 1;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: ConfirmingPresence
        StateDescriptor {
            id: StateId::ConfirmingPresence,
            name: "ConfirmingPresence",
            on_enter: Some(confirming_enter),
            on_exit: None,
            on_update: confirming_update,
        },
        // Index 2: Charging
        StateDescriptor {
            id: StateId::Charging,
            name: "Charging",
            on_enter: Some(charging_enter),
            on_exit: Some(charging_exit),
            on_update: charging_update,
        },
        // Index 3: EmergencyStopped
        StateDescriptor {
            id: StateId::EmergencyStopped,
            name: "EmergencyStopped",
            on_enter: Some(emergency_enter),
            on_exit: Some(emergency_exit),
            on_update: emergency_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.commands.relay_on = false;
    ctx.commands.siren = false;
    info!("IDLE: waiting for vehicle");
}

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.presence {
        return Some(StateId::ConfirmingPresence);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONFIRMING PRESENCE: debounce before closing the relay
// ═══════════════════════════════════════════════════════════════════════════

fn confirming_enter(ctx: &mut FsmContext) {
    info!(
        "CONFIRMING: object detected, re-checking in {}ms",
        ctx.config.presence_debounce_ms
    );
}

fn confirming_update(ctx: &mut FsmContext) -> Option<StateId> {
    let window_done = ctx.ms_in_state >= u64::from(ctx.config.presence_debounce_ms);

    match ctx.config.window_policy {
        WindowPolicy::Blocking if !window_done => None,
        WindowPolicy::NonBlocking if !ctx.presence => {
            info!("CONFIRMING: presence lost after {}ms", ctx.ms_in_state);
            Some(StateId::Idle)
        }
        _ if !window_done => None,
        _ if ctx.presence => Some(StateId::Charging),
        _ => {
            info!("CONFIRMING: presence not confirmed, back to idle");
            Some(StateId::Idle)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CHARGING: relay closed, sampled every tick
// ═══════════════════════════════════════════════════════════════════════════

fn charging_enter(ctx: &mut FsmContext) {
    ctx.commands.relay_on = true;
    ctx.commands.chirp = START_CHIRPS;
    ctx.session_started_ms = ctx.now_ms;
    ctx.efficiency_pct = 0.0;
    ctx.violation = None;
    ctx.notify(AppEvent::SessionStarted { at_ms: ctx.now_ms });
    info!("CHARGING: relay closed at {}ms", ctx.now_ms);
}

fn charging_exit(ctx: &mut FsmContext) {
    ctx.commands.relay_on = false;
}

fn charging_update(ctx: &mut FsmContext) -> Option<StateId> {
    // Interlock preempts the normal stop.
    if let Some(violation) = ctx.violation.take() {
        ctx.active_violation = Some(violation);
        return Some(StateId::EmergencyStopped);
    }

    if !ctx.presence {
        let summary = SessionSummary {
            duration_secs: ctx.session_secs(),
            last_efficiency: ctx.efficiency_pct,
        };
        ctx.sessions_completed = ctx.sessions_completed.saturating_add(1);
        ctx.commands.chirp = STOP_CHIRPS;
        ctx.notify(AppEvent::SessionStopped(summary));
        info!(
            "CHARGING: vehicle removed after {}s, last efficiency {:.0}%",
            summary.duration_secs, summary.last_efficiency
        );
        return Some(StateId::Idle);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  EMERGENCY STOPPED: relay forced open, alternating alert, fixed cooldown
// ═══════════════════════════════════════════════════════════════════════════

fn emergency_enter(ctx: &mut FsmContext) {
    ctx.commands = PadCommands {
        siren: true,
        ..PadCommands::all_off()
    };
    ctx.alert_phase = 0;
    ctx.emergency_stops = ctx.emergency_stops.saturating_add(1);
    if let Some(v) = ctx.active_violation {
        ctx.notify(AppEvent::EmergencyStop(v));
        warn!(
            "EMERGENCY: {v}, relay open, cooldown {}ms",
            ctx.config.emergency_cooldown_ms
        );
    } else {
        warn!("EMERGENCY: forced stop without violation");
    }
}

fn emergency_exit(ctx: &mut FsmContext) {
    ctx.commands.siren = false;
    ctx.active_violation = None;
    ctx.notify(AppEvent::EmergencyCleared);
    info!("EMERGENCY: cooldown elapsed, resuming");
}

fn emergency_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.ms_in_state >= u64::from(ctx.config.emergency_cooldown_ms) {
        return Some(StateId::Idle);
    }

    // One flip per tick that lands in a new half-period.
    let phase = ctx.ms_in_state / u64::from(ctx.config.alert_pulse_ms.max(1));
    if phase != ctx.alert_phase {
        ctx.alert_phase = phase;
        ctx.commands.siren = !ctx.commands.siren;
    }
    None
}
