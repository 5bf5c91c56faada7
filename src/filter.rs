// SPDX-License-Identifier: Apache-2.0

//! Single-pole IIR low-pass filter and range rescaling.

use core::f32::consts::PI;

use crate::config::{CUTOFF_HZ, SAMPLE_RATE_HZ};

/// Filter coefficient, `2π · cutoff / sample rate` (≈ 0.628 for 100 Hz at 1 kHz)
pub const OMEGA: f32 = 2.0 * PI * CUTOFF_HZ as f32 / SAMPLE_RATE_HZ as f32;

/// Filter memory, persisted across sampling ticks.
///
/// Each [`update`](Self::update) computes `y = (1 - ω)·y_prev + ω·x_prev` from the *previous*
/// tick's input, so a new sample only reaches the output one tick later.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct LowPass {
    /// Current input sample
    x: f32,
    /// Input sample from the previous tick
    x_prev: f32,
    /// Current output
    y: f32,
    /// Output from the previous tick
    y_prev: f32,
}

impl LowPass {
    /// Filter at rest, all history zero
    pub const fn new() -> Self {
        Self {
            x: 0.0,
            x_prev: 0.0,
            y: 0.0,
            y_prev: 0.0,
        }
    }

    /// Feed one sample and return the new output
    pub fn update(&mut self, sample: f32) -> f32 {
        self.x = sample;
        self.y = (1.0 - OMEGA) * self.y_prev + OMEGA * self.x_prev;
        self.y_prev = self.y;
        self.x_prev = self.x;
        self.y
    }

    /// Most recent output
    pub fn output(&self) -> f32 {
        self.y
    }
}

/// Affine map of `value` from `[in_lo, in_hi]` onto `[out_lo, out_hi]`
pub fn rescale(value: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    out_lo + (value - in_lo) * (out_hi - out_lo) / (in_hi - in_lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omega_is_stable() {
        assert!((OMEGA - 0.628_318_5).abs() < 1e-6);
        assert!(0.0 < OMEGA && OMEGA < 1.0);
    }

    #[test]
    fn output_lags_input_by_one_tick() {
        let mut lp = LowPass::new();
        assert_eq!(lp.update(1000.0), 0.0);
        assert_eq!(lp.update(1000.0), OMEGA * 1000.0);
    }

    #[test]
    fn matches_recurrence_exactly() {
        let mut lp = LowPass::new();
        let (mut x_prev, mut y_prev) = (0.0f32, 0.0f32);
        for &x in &[12.0f32, 4095.0, 0.0, 2048.0, 2048.0, 77.0, 3000.0] {
            let y = (1.0 - OMEGA) * y_prev + OMEGA * x_prev;
            assert_eq!(lp.update(x).to_bits(), y.to_bits());
            y_prev = y;
            x_prev = x;
        }
    }

    #[test]
    fn constant_input_converges_monotonically() {
        let target = 4095.0;
        let mut lp = LowPass::new();
        let mut last = lp.update(target);
        for _ in 0..12 {
            let y = lp.update(target);
            assert!(y >= last);
            assert!(y < target);
            last = y;
        }
        for _ in 0..35 {
            last = lp.update(target);
        }
        assert!((target - last).abs() < 0.01);
    }

    #[test]
    fn within_one_percent_five_ticks_after_input_arrives() {
        let target = 4095.0;
        let mut lp = LowPass::new();
        // First tick only loads x_prev
        lp.update(target);
        let mut y = 0.0;
        for _ in 0..5 {
            y = lp.update(target);
        }
        assert!((target - y) / target < 0.01);
        // One tick earlier is not yet there
        let mut lp = LowPass::new();
        for _ in 0..5 {
            y = lp.update(target);
        }
        assert!((target - y) / target >= 0.01);
    }

    #[test]
    fn rescale_maps_endpoints() {
        assert_eq!(rescale(0.0, 0.0, 4095.0, 0.0, 1023.0), 0.0);
        assert_eq!(rescale(4095.0, 0.0, 4095.0, 0.0, 1023.0), 1023.0);
        assert!((rescale(2047.5, 0.0, 4095.0, 0.0, 1023.0) - 511.5).abs() < 1e-3);
    }
}
