//! Low-frequency oscillator for modulation effects.

use core::f32::consts::PI;
use libm::sinf;

/// Phase-accumulator sine LFO.
///
/// # Example
///
/// ```rust
/// use cadena_core::Lfo;
///
/// let mut lfo = Lfo::new(48000.0, 2.0);
/// let value = lfo.next();
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Current phase [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0, 1.0)
    }
}

impl Lfo {
    /// Create new LFO with given sample rate and frequency.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: freq_hz / sample_rate,
            sample_rate,
        }
    }

    /// Set frequency in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz / self.sample_rate;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.phase_inc * self.sample_rate
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Current phase.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Next LFO value in `-1.0..=1.0`.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let output = sinf(self.phase * 2.0 * PI);

        self.phase += self.phase_inc;
        while self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        output
    }

    /// Next value mapped to `0.0..=1.0`.
    pub fn next_unipolar(&mut self) -> f32 {
        (self.next() + 1.0) * 0.5
    }

    /// Change sample rate, keeping the frequency in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let freq = self.frequency();
        self.sample_rate = sample_rate;
        self.set_frequency(freq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_range() {
        let mut lfo = Lfo::new(1000.0, 7.0);
        for _ in 0..5000 {
            let v = lfo.next();
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_quarter_phase_steps() {
        let mut lfo = Lfo::new(4.0, 1.0);
        assert!(lfo.next().abs() < 1e-6);
        assert!((lfo.next() - 1.0).abs() < 1e-6);
        assert!(lfo.next().abs() < 1e-6);
        assert!((lfo.next() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_phase_wraps_above_nyquist_rates() {
        // Chorus rates reach 100 Hz; faster-than-sample-rate increments must still wrap
        let mut lfo = Lfo::new(100.0, 250.0);
        for _ in 0..10 {
            lfo.next();
            assert!(lfo.phase() < 1.0);
        }
    }

    #[test]
    fn test_sample_rate_change_keeps_frequency() {
        let mut lfo = Lfo::new(48000.0, 3.0);
        lfo.set_sample_rate(96000.0);
        assert!((lfo.frequency() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_reset() {
        let mut lfo = Lfo::new(48000.0, 5.0);
        for _ in 0..100 {
            lfo.next();
        }
        lfo.reset();
        assert_eq!(lfo.phase(), 0.0);
    }
}
