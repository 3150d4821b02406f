//! Task watchdog for the control loop.
//!
//! The relay must never be left closed by a hung loop, so the main task
//! subscribes to the ESP-IDF task watchdog (TWDT) and panics (reset,
//! relay drops open) if [`Watchdog::feed`] is not called within the
//! timeout.  On host the watchdog only counts feeds.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

/// Control-loop watchdog timeout.  Several ticks of slack at 2 Hz.
pub const WATCHDOG_TIMEOUT_MS: u32 = 5_000;

pub struct Watchdog {
    subscribed: bool,
    feeds: u64,
}

impl Watchdog {
    /// Subscribe the calling task to the TWDT with `timeout_ms`.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        let cfg = esp_task_wdt_config_t {
            timeout_ms,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        // SAFETY: plain FFI calls with a valid config; null handle means
        // "current task".
        let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
        if ret != ESP_OK {
            warn!("TWDT reconfigure returned {} (may already be configured)", ret);
        }
        let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
        let subscribed = ret == ESP_OK;
        if subscribed {
            info!("Watchdog: subscribed ({}ms timeout, panic on trigger)", timeout_ms);
        } else {
            warn!("Watchdog: failed to subscribe ({})", ret);
        }
        Self {
            subscribed,
            feeds: 0,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        info!("Watchdog(sim): {}ms timeout not enforced", timeout_ms);
        Self {
            subscribed: false,
            feeds: 0,
        }
    }

    /// Reset the watchdog countdown.  Call once per loop iteration.
    pub fn feed(&mut self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: the current task is subscribed.
            unsafe {
                esp_task_wdt_reset();
            }
        }
        self.feeds = self.feeds.wrapping_add(1);
    }

    pub fn is_armed(&self) -> bool {
        self.subscribed
    }

    pub fn feeds(&self) -> u64 {
        self.feeds
    }
}
