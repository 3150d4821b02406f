//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the clock and presence inputs for this tick, the latest
//! reading and safety verdict, actuator commands, session bookkeeping and
//! an outbox of notifications.  Think of it as the "blackboard" in a
//! blackboard architecture.

use heapless::Vec;

use crate::app::events::AppEvent;
use crate::config::PadConfig;
use crate::error::Violation;

/// Notifications a single tick can queue.  One transition per tick
/// produces at most one session event.
pub const OUTBOX_CAPACITY: usize = 4;

// ---------------------------------------------------------------------------
// Actuator commands (written by state handlers; consumed by the controller)
// ---------------------------------------------------------------------------

/// Commands that state handlers write to request actuator actions.
/// The controller applies these to the actuator port after each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PadCommands {
    /// Supply relay closed.
    pub relay_on: bool,
    /// Pending chirp pulse count (0 = none).  Cleared once applied.
    pub chirp: u8,
    /// Continuous alert level.
    pub siren: bool,
}

impl PadCommands {
    /// Relay open, alert silent: safe default.
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Monotonic time of the current tick (milliseconds).
    pub now_ms: u64,
    /// Milliseconds since the current state was entered.
    pub ms_in_state: u64,

    // -- Inputs --
    /// Normalised presence input sampled for this tick.
    pub presence: bool,
    /// Efficiency estimate from the latest charging tick (%).
    pub efficiency_pct: f32,
    /// Safety verdict for this tick.  Consumed by the charging handler.
    pub violation: Option<Violation>,

    // -- Outputs --
    pub commands: PadCommands,
    /// Events queued by handlers, drained by the controller after each tick.
    pub outbox: Vec<AppEvent, OUTBOX_CAPACITY>,

    // -- Session bookkeeping --
    /// Clock value when the relay closed.
    pub session_started_ms: u64,
    /// Violation that caused the current emergency stop.
    pub active_violation: Option<Violation>,
    /// Alert half-period the siren level was last flipped for.
    pub alert_phase: u64,
    pub sessions_completed: u32,
    pub emergency_stops: u32,

    // -- Configuration --
    pub config: PadConfig,
}

impl FsmContext {
    pub fn new(config: PadConfig) -> Self {
        Self {
            now_ms: 0,
            ms_in_state: 0,
            presence: false,
            efficiency_pct: 0.0,
            violation: None,
            commands: PadCommands::all_off(),
            outbox: Vec::new(),
            session_started_ms: 0,
            active_violation: None,
            alert_phase: 0,
            sessions_completed: 0,
            emergency_stops: 0,
            config,
        }
    }

    /// Queue an event for the controller to emit.
    pub fn notify(&mut self, event: AppEvent) {
        if self.outbox.push(event).is_err() {
            log::warn!("FSM outbox full, event dropped");
        }
    }

    /// Whole seconds since the session started, rounded down.
    pub fn session_secs(&self) -> u32 {
        let ms = self.now_ms.saturating_sub(self.session_started_ms);
        u32::try_from(ms / 1000).unwrap_or(u32::MAX)
    }
}
