//! Transmitter supply relay driver.
//!
//! The relay switches the DC supply feeding the coil driver.  This driver
//! is a dumb actuator: the state machine decides when it may close.
//!
//! ## Safety contract
//!
//! `open()` must always leave the tracked state `Open`, even if the pin
//! write fails, so the controller never believes power is flowing when it
//! commanded it off.  A failed write is logged at error level.

use embedded_hal::digital::OutputPin;
use log::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Open,
    Closed,
}

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    state: RelayState,
    /// Number of open → closed transitions since boot.
    closures: u32,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take ownership of the pin and force the relay open.
    pub fn new(pin: P) -> Self {
        let mut relay = Self {
            pin,
            state: RelayState::Open,
            closures: 0,
        };
        relay.open();
        relay
    }

    pub fn close(&mut self) {
        if let Err(e) = self.pin.set_high() {
            error!("relay close failed: {:?}", e);
            return;
        }
        if self.state == RelayState::Open {
            self.closures = self.closures.saturating_add(1);
        }
        self.state = RelayState::Closed;
    }

    pub fn open(&mut self) {
        if let Err(e) = self.pin.set_low() {
            error!("relay open failed: {:?}", e);
        }
        self.state = RelayState::Open;
    }

    pub fn set(&mut self, closed: bool) {
        if closed {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == RelayState::Closed
    }

    pub fn closures(&self) -> u32 {
        self.closures
    }
}
