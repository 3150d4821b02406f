//! Two-line status display adapter.
//!
//! [`render_lines`] is a pure function turning a [`StatusUpdate`] into two
//! 16-column lines; [`DisplayStatusSink`] pushes them to any
//! [`LinePanel`] (the I²C LCD on the device, the log on host).
//!
//! Rounding follows the on-pad display: voltage 0.1 V, current 0.01 A,
//! power 0.1 W, efficiency whole percent.

use core::fmt::{self, Write};

use heapless::String;
use log::{info, warn};

use crate::app::events::StatusUpdate;
use crate::app::ports::StatusSink;
use crate::drivers::lcd::{COLUMNS, Lcd1602};
use crate::efficiency::EfficiencyEstimate;

pub type Line = String<COLUMNS>;

/// Something that can show two lines of text.
pub trait LinePanel {
    fn show(&mut self, top: &str, bottom: &str);
}

// ───────────────────────────────────────────────────────────────
// Rendering
// ───────────────────────────────────────────────────────────────

/// `fmt::Write` that silently drops whatever does not fit.
struct Clipped(Line);

impl Write for Clipped {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

fn line(args: fmt::Arguments<'_>) -> Line {
    let mut out = Clipped(Line::new());
    // Clipped never fails.
    let _ = out.write_fmt(args);
    out.0
}

fn whole(pct: f32) -> u8 {
    EfficiencyEstimate::new(pct).whole_percent()
}

/// Lay out one update on a 16x2 panel.
pub fn render_lines(update: &StatusUpdate) -> [Line; 2] {
    match *update {
        StatusUpdate::Waiting => [
            line(format_args!("WIRELESS CHARGER")),
            line(format_args!("Waiting for car")),
        ],
        StatusUpdate::Charging {
            voltage,
            current,
            power,
            efficiency,
        } => [
            line(format_args!("{voltage:.1}V {current:.2}A")),
            line(format_args!("{power:.1}W Eff:{}%", whole(efficiency))),
        ],
        StatusUpdate::SessionEnded {
            duration_secs,
            efficiency,
        } => [
            line(format_args!("CHARGE COMPLETE")),
            line(format_args!("{duration_secs}s Eff:{}%", whole(efficiency))),
        ],
        StatusUpdate::EmergencyStop { reason } => [
            line(format_args!("EMERGENCY STOP!")),
            line(format_args!("{}", reason.reason())),
        ],
    }
}

// ───────────────────────────────────────────────────────────────
// Sink
// ───────────────────────────────────────────────────────────────

/// [`StatusSink`] that renders onto a [`LinePanel`], skipping redraws
/// when the text has not changed.
pub struct DisplayStatusSink<P: LinePanel> {
    panel: P,
    shown: Option<[Line; 2]>,
}

impl<P: LinePanel> DisplayStatusSink<P> {
    pub fn new(panel: P) -> Self {
        Self { panel, shown: None }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}

impl<P: LinePanel> StatusSink for DisplayStatusSink<P> {
    fn render(&mut self, update: &StatusUpdate) {
        let lines = render_lines(update);
        if self.shown.as_ref() == Some(&lines) {
            return;
        }
        self.panel.show(&lines[0], &lines[1]);
        self.shown = Some(lines);
    }
}

// ───────────────────────────────────────────────────────────────
// Panels
// ───────────────────────────────────────────────────────────────

impl<I, D> LinePanel for Lcd1602<I, D>
where
    I: embedded_hal::i2c::I2c,
    D: embedded_hal::delay::DelayNs,
{
    fn show(&mut self, top: &str, bottom: &str) {
        let res = self.write_row(0, top).and_then(|()| self.write_row(1, bottom));
        if let Err(e) = res {
            warn!("LCD write failed: {:?}", e);
        }
    }
}

/// Panel stand-in for boards without an LCD: lines go to the log.
#[derive(Debug, Default)]
pub struct LogPanel;

impl LinePanel for LogPanel {
    fn show(&mut self, top: &str, bottom: &str) {
        info!("LCD | {top:<16} | {bottom:<16}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Violation;

    fn text(update: StatusUpdate) -> (std::string::String, std::string::String) {
        let [a, b] = render_lines(&update);
        (a.as_str().into(), b.as_str().into())
    }

    #[test]
    fn charging_uses_display_precision() {
        let (top, bottom) = text(StatusUpdate::Charging {
            voltage: 12.04,
            current: 1.506,
            power: 18.13,
            efficiency: 81.6,
        });
        assert_eq!(top, "12.0V 1.51A");
        assert_eq!(bottom, "18.1W Eff:82%");
    }

    #[test]
    fn session_end_shows_duration() {
        let (top, bottom) = text(StatusUpdate::SessionEnded {
            duration_secs: 4,
            efficiency: 83.0,
        });
        assert_eq!(top, "CHARGE COMPLETE");
        assert_eq!(bottom, "4s Eff:83%");
    }

    #[test]
    fn emergency_shows_reason() {
        let (_, bottom) = text(StatusUpdate::EmergencyStop {
            reason: Violation::LowVoltage,
        });
        assert_eq!(bottom, "LOW VOLTAGE");
    }

    #[test]
    fn overlong_values_are_clipped() {
        let [top, _] = render_lines(&StatusUpdate::Charging {
            voltage: 123_456.0,
            current: 98_765.43,
            power: 1.0,
            efficiency: 0.0,
        });
        assert_eq!(top.len(), COLUMNS);
    }

    #[derive(Default)]
    struct Panel(Vec<(std::string::String, std::string::String)>);

    impl LinePanel for Panel {
        fn show(&mut self, top: &str, bottom: &str) {
            self.0.push((top.into(), bottom.into()));
        }
    }

    #[test]
    fn unchanged_text_is_not_redrawn() {
        let mut sink = DisplayStatusSink::new(Panel::default());
        sink.render(&StatusUpdate::Waiting);
        sink.render(&StatusUpdate::Waiting);
        sink.render(&StatusUpdate::EmergencyStop {
            reason: Violation::OverCurrent,
        });
        assert_eq!(sink.panel().0.len(), 2);
        assert_eq!(sink.panel().0[1].1, "OVER CURRENT");
    }
}
