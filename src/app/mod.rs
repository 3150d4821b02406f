//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the charging-session rules: state machine
//! orchestration, sampling, efficiency estimation and the safety
//! interlock.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
