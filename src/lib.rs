//! Inductive charging pad controller library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! hardware adapters used by the firmware binary.  All ESP-IDF-specific
//! code is guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod efficiency;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod safety;

pub mod adapters;
pub mod drivers;
pub mod sensors;
