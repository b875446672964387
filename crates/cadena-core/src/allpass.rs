//! First-order allpass section.

use core::f32::consts::PI;
use libm::tanf;

/// Bilinear first-order allpass.
///
/// `y[n] = a * x[n] + x[n-1] - a * y[n-1]` with
/// `a = (tan(pi*fc/fs) - 1) / (tan(pi*fc/fs) + 1)`.
///
/// Unity magnitude at every frequency; the phase passes -90 degrees at `fc`.
/// Cascades of these sections make up the phaser's sweeping notch comb.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOrderAllpass {
    a: f32,
    x1: f32,
    y1: f32,
}

impl FirstOrderAllpass {
    /// Create a section with coefficient 0 (one-sample delay).
    pub const fn new() -> Self {
        Self {
            a: 0.0,
            x1: 0.0,
            y1: 0.0,
        }
    }

    /// Set the break frequency, clamped to 10 Hz .. 0.4 * sample rate.
    #[inline]
    pub fn set_frequency(&mut self, freq: f32, sample_rate: f32) {
        let freq = freq.clamp(10.0, sample_rate * 0.4);
        let t = tanf(PI * freq / sample_rate);
        self.a = (t - 1.0) / (t + 1.0);
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.a * input + self.x1 - self.a * self.y1;
        self.x1 = input;
        self.y1 = crate::flush_denormal(output);
        output
    }

    /// Clear filter state.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}
