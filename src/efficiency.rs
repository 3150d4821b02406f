//! Transfer efficiency estimation.
//!
//! **Placeholder.**  The pad has no receiver-side power telemetry, so the
//! efficiency shown to the user is synthetic: a pseudo-random whole
//! percentage in a fixed base range, minus a fixed penalty at light load.
//! A real implementation would compute `output_w / input_w × 100` once
//! both sides are measured; it must keep the `[0, 100]` clamp and the
//! light-load penalty so existing tests and displays keep working.
//!
//! The estimator sits behind [`EfficiencyEstimator`] so the state machine
//! never depends on how the figure is produced.

use serde::{Deserialize, Serialize};

use rand_core::{RngCore, impls};

use crate::app::ports::RandomSource;
use crate::config::PadConfig;

/// Efficiency figure for the current reading, always within `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyEstimate {
    pub percent: f32,
}

impl EfficiencyEstimate {
    pub const ZERO: Self = Self { percent: 0.0 };

    pub fn new(percent: f32) -> Self {
        let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
        Self { percent }
    }

    /// Rounded to the whole percent shown on the display.
    pub fn whole_percent(self) -> u8 {
        self.percent.round() as u8
    }
}

/// Pluggable efficiency model.
pub trait EfficiencyEstimator {
    fn estimate(&mut self, power_w: f32) -> EfficiencyEstimate;

    /// Pick up new constants after a config reload.
    fn reconfigure(&mut self, _config: &PadConfig) {}
}

// ───────────────────────────────────────────────────────────────
// Placeholder model
// ───────────────────────────────────────────────────────────────

pub struct PlaceholderEstimator<R: RandomSource> {
    rng: R,
    min_power_w: f32,
    low_power_w: f32,
    base_min_pct: u8,
    base_max_pct: u8,
    penalty_pct: f32,
}

impl<R: RandomSource> PlaceholderEstimator<R> {
    pub fn new(config: &PadConfig, rng: R) -> Self {
        Self {
            rng,
            min_power_w: config.min_power_w,
            low_power_w: config.low_power_w,
            base_min_pct: config.efficiency_base_min_pct,
            base_max_pct: config.efficiency_base_max_pct,
            penalty_pct: config.low_power_penalty_pct,
        }
    }

    fn base_percent(&mut self) -> f32 {
        let span = u32::from(self.base_max_pct.saturating_sub(self.base_min_pct)) + 1;
        let offset = self.rng.next_u32() % span;
        (u32::from(self.base_min_pct) + offset) as f32
    }
}

impl<R: RandomSource> EfficiencyEstimator for PlaceholderEstimator<R> {
    fn estimate(&mut self, power_w: f32) -> EfficiencyEstimate {
        // NaN power falls through to "no transfer".
        if !(power_w > self.min_power_w) {
            return EfficiencyEstimate::ZERO;
        }
        let mut pct = self.base_percent();
        if power_w < self.low_power_w {
            pct -= self.penalty_pct;
        }
        EfficiencyEstimate::new(pct)
    }

    fn reconfigure(&mut self, config: &PadConfig) {
        self.min_power_w = config.min_power_w;
        self.low_power_w = config.low_power_w;
        self.base_min_pct = config.efficiency_base_min_pct;
        self.base_max_pct = config.efficiency_base_max_pct;
        self.penalty_pct = config.low_power_penalty_pct;
    }
}

// ───────────────────────────────────────────────────────────────
// Software PRNG
// ───────────────────────────────────────────────────────────────

/// Marsaglia xorshift32.  Good enough for a display placeholder; seeded
/// from the hardware RNG on the device.
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        // Zero is a fixed point of xorshift.
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }
}

impl RngCore for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator(seed: u32) -> PlaceholderEstimator<XorShift32> {
        PlaceholderEstimator::new(&PadConfig::default(), XorShift32::new(seed))
    }

    #[test]
    fn no_transfer_at_or_below_minimum_power() {
        let mut e = estimator(1);
        let min = PadConfig::default().min_power_w;
        assert_eq!(e.estimate(0.0), EfficiencyEstimate::ZERO);
        assert_eq!(e.estimate(min), EfficiencyEstimate::ZERO);
        assert_eq!(e.estimate(-3.0), EfficiencyEstimate::ZERO);
        assert_eq!(e.estimate(f32::NAN), EfficiencyEstimate::ZERO);
    }

    #[test]
    fn nominal_load_stays_in_base_range() {
        let mut e = estimator(42);
        for _ in 0..500 {
            let pct = e.estimate(18.0).percent;
            assert!((78.0..=88.0).contains(&pct), "got {pct}");
            assert_eq!(pct.fract(), 0.0);
        }
    }

    #[test]
    fn light_load_applies_penalty() {
        let mut e = estimator(7);
        for _ in 0..500 {
            let pct = e.estimate(2.0).percent;
            assert!((63.0..=73.0).contains(&pct), "got {pct}");
        }
    }

    #[test]
    fn penalty_larger_than_base_clamps_to_zero() {
        let mut cfg = PadConfig::default();
        cfg.low_power_penalty_pct = 150.0;
        let mut e = PlaceholderEstimator::new(&cfg, XorShift32::new(3));
        assert_eq!(e.estimate(2.0).percent, 0.0);
    }

    #[test]
    fn whole_percent_rounds() {
        assert_eq!(EfficiencyEstimate::new(81.6).whole_percent(), 82);
        assert_eq!(EfficiencyEstimate::new(250.0).whole_percent(), 100);
    }

    #[test]
    fn xorshift_zero_seed_is_not_stuck() {
        let mut rng = XorShift32::new(0);
        assert_ne!(RandomSource::next_u32(&mut rng), 0);
    }

    /// Any `rand_core` generator plugs into the estimator.
    struct Constant(u32);

    impl RngCore for Constant {
        fn next_u32(&mut self) -> u32 {
            self.0
        }
        fn next_u64(&mut self) -> u64 {
            impls::next_u64_via_u32(self)
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            impls::fill_bytes_via_next(self, dest);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn rng_core_generators_drive_the_base_figure() {
        let cfg = PadConfig::default();
        // Base range 78..=88 spans 11 values.
        let top = PlaceholderEstimator::new(&cfg, Constant(10)).estimate(18.0);
        let wrap = PlaceholderEstimator::new(&cfg, Constant(11)).estimate(18.0);
        assert_eq!(top.percent, 88.0);
        assert_eq!(wrap.percent, 78.0);
    }
}
