//! Unified error types for the pad firmware.
//!
//! Interlock trips are not errors: they are [`Violation`] values that the
//! state machine reacts to.  The `Error` enum only covers setup paths
//! (configuration, peripheral initialisation) that can refuse to start.
//! All variants are `Copy` so they pass through the control loop without
//! allocation.

use core::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible setup operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration failed validation.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation; the message names the field.
    Invalid(&'static str),
    /// A hot reload was attempted while a session or window is active.
    Busy,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(msg) => write!(f, "invalid: {msg}"),
            Self::Busy => write!(f, "controller busy, reload only allowed in Idle"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Safety violations
// ---------------------------------------------------------------------------

/// Interlock conditions.  Either one ends the session: relay off, alert,
/// forced cooldown, then back to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    /// Coil current above the trip threshold.
    OverCurrent,
    /// Supply voltage sagged below the minimum while charging.
    LowVoltage,
}

impl Violation {
    /// Reason text shown on the display and in the log.
    pub const fn reason(self) -> &'static str {
        match self {
            Self::OverCurrent => "OVER CURRENT",
            Self::LowVoltage => "LOW VOLTAGE",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
