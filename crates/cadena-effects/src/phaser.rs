//! Phaser with cascaded first-order allpass sections.
//!
//! The input is summed with a copy of itself passed through six allpass
//! sections whose break frequency an LFO sweeps around a centre frequency.
//! Where the cascade's phase reaches 180 degrees the sum cancels, producing
//! moving notches. Feeding the cascade output back into its input sharpens
//! the notches.

use cadena_core::{
    Effect, FirstOrderAllpass, Lfo, ProcessSpec, SmoothedParam, flush_denormal, wet_dry_mix,
};
use libm::exp2f;

/// Number of allpass sections in the cascade.
pub const PHASER_SECTIONS: usize = 6;

/// Samples between allpass coefficient updates.
const COEFF_UPDATE_INTERVAL: u32 = 32;

/// Octaves swept either side of the centre at full depth.
const SWEEP_OCTAVES: f32 = 2.0;

/// Feedback magnitude ceiling. Unity feedback around a unity-gain cascade
/// does not decay.
const MAX_FEEDBACK: f32 = 0.95;

/// Plain-value phaser settings.
///
/// | Field | Range | Default |
/// |-------|-------|---------|
/// | `rate_hz` | 0.01–2 Hz | 0.2 |
/// | `depth` | 0.01–1 | 0.05 |
/// | `centre_hz` | 20–2000 Hz | 1000 |
/// | `feedback` | −1–1 | 0 |
/// | `mix` | 0.01–1 | 0.05 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaserSettings {
    /// LFO rate in Hz
    pub rate_hz: f32,
    /// Sweep depth, fraction of [`SWEEP_OCTAVES`]
    pub depth: f32,
    /// Sweep centre frequency in Hz
    pub centre_hz: f32,
    /// Feedback amount, negative values invert the fed-back signal
    pub feedback: f32,
    /// Wet/dry mix
    pub mix: f32,
}

impl Default for PhaserSettings {
    fn default() -> Self {
        Self {
            rate_hz: 0.2,
            depth: 0.05,
            centre_hz: 1000.0,
            feedback: 0.0,
            mix: 0.05,
        }
    }
}

/// Phaser stage.
///
/// # Example
///
/// ```rust
/// use cadena_core::Effect;
/// use cadena_effects::{Phaser, PhaserSettings};
///
/// let mut phaser = Phaser::new(48000.0);
/// phaser.apply(&PhaserSettings { depth: 0.8, mix: 0.5, ..PhaserSettings::default() });
///
/// let output = phaser.process_sample(0.5);
/// assert!(output.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Phaser {
    sections: [FirstOrderAllpass; PHASER_SECTIONS],
    lfo: Lfo,
    settings: PhaserSettings,
    depth: SmoothedParam,
    centre_hz: SmoothedParam,
    feedback: SmoothedParam,
    mix: SmoothedParam,
    feedback_sample: f32,
    coeff_update_counter: u32,
    sample_rate: f32,
}

impl Phaser {
    /// Create a phaser with default settings.
    pub fn new(sample_rate: f32) -> Self {
        let settings = PhaserSettings::default();
        let mut phaser = Self {
            sections: [FirstOrderAllpass::new(); PHASER_SECTIONS],
            lfo: Lfo::new(sample_rate, settings.rate_hz),
            settings,
            depth: SmoothedParam::default(),
            centre_hz: SmoothedParam::default(),
            feedback: SmoothedParam::default(),
            mix: SmoothedParam::default(),
            feedback_sample: 0.0,
            coeff_update_counter: 1,
            sample_rate,
        };
        phaser.configure_smoothing();
        phaser.snap_to(&settings);
        phaser
    }

    /// Hand the phaser new settings. Cheap when nothing changed.
    pub fn apply(&mut self, settings: &PhaserSettings) {
        if self.settings == *settings {
            return;
        }
        self.settings = *settings;
        self.lfo.set_frequency(settings.rate_hz);
        self.depth.set_target(settings.depth);
        self.centre_hz.set_target(settings.centre_hz);
        self.feedback
            .set_target(settings.feedback.clamp(-1.0, 1.0) * MAX_FEEDBACK);
        self.mix.set_target(settings.mix);
    }

    /// Settings most recently applied.
    pub fn settings(&self) -> PhaserSettings {
        self.settings
    }

    fn configure_smoothing(&mut self) {
        for (param, ms) in [
            (&mut self.depth, 20.0),
            (&mut self.centre_hz, 20.0),
            (&mut self.feedback, 10.0),
            (&mut self.mix, 10.0),
        ] {
            param.set_sample_rate(self.sample_rate);
            param.set_smoothing_time_ms(ms);
        }
    }

    fn snap_to(&mut self, settings: &PhaserSettings) {
        self.settings = *settings;
        self.lfo.set_frequency(settings.rate_hz);
        self.depth.set_immediate(settings.depth);
        self.centre_hz.set_immediate(settings.centre_hz);
        self.feedback
            .set_immediate(settings.feedback.clamp(-1.0, 1.0) * MAX_FEEDBACK);
        self.mix.set_immediate(settings.mix);
    }
}

impl Default for Phaser {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Effect for Phaser {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;
        self.lfo.set_sample_rate(spec.sample_rate);
        self.configure_smoothing();
        self.reset();
    }

    fn reset(&mut self) {
        for section in &mut self.sections {
            section.clear();
        }
        self.lfo.reset();
        self.feedback_sample = 0.0;
        self.coeff_update_counter = 1;
        let settings = self.settings;
        self.snap_to(&settings);
    }

    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        let depth = self.depth.advance();
        let centre = self.centre_hz.advance();
        let feedback = self.feedback.advance();
        let mix = self.mix.advance();

        // The LFO advances every sample; coefficients follow it at a lower rate
        let lfo = self.lfo.next();

        self.coeff_update_counter -= 1;
        if self.coeff_update_counter == 0 {
            self.coeff_update_counter = COEFF_UPDATE_INTERVAL;
            let freq = centre * exp2f(lfo * depth * SWEEP_OCTAVES);
            for (i, section) in self.sections.iter_mut().enumerate() {
                // Spread the sections slightly for a denser notch pattern
                section.set_frequency(freq * (1.0 + i as f32 * 0.1), self.sample_rate);
            }
        }

        let mut wet = input + self.feedback_sample * feedback;
        for section in &mut self.sections {
            wet = section.process(wet);
        }
        self.feedback_sample = flush_denormal(wet);

        wet_dry_mix(input, wet, mix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_wet() -> PhaserSettings {
        PhaserSettings {
            depth: 1.0,
            mix: 1.0,
            ..PhaserSettings::default()
        }
    }

    #[test]
    fn test_phaser_basic() {
        let mut phaser = Phaser::new(44100.0);
        phaser.apply(&full_wet());

        for _ in 0..1000 {
            assert!(phaser.process_sample(0.5).is_finite());
        }
    }

    #[test]
    fn test_phaser_feedback_stability() {
        let mut phaser = Phaser::new(44100.0);
        for feedback in [1.0, -1.0] {
            phaser.apply(&PhaserSettings {
                feedback,
                ..full_wet()
            });
            for _ in 0..20000 {
                let output = phaser.process_sample(0.1);
                assert!(output.is_finite());
                assert!(output.abs() < 10.0, "output exceeded bounds: {output}");
            }
        }
    }

    #[test]
    fn test_phaser_reset() {
        let mut phaser = Phaser::new(44100.0);
        phaser.apply(&PhaserSettings {
            feedback: 0.8,
            ..full_wet()
        });
        for _ in 0..500 {
            phaser.process_sample(1.0);
        }

        phaser.reset();

        let output = phaser.process_sample(0.0);
        assert!(output.abs() < 1e-6, "should be silent after reset, got {output}");
    }

    #[test]
    fn test_phaser_apply_is_idempotent() {
        let mut phaser = Phaser::new(48000.0);
        let settings = full_wet();
        phaser.apply(&settings);
        phaser.apply(&settings);
        assert_eq!(phaser.settings(), settings);
    }

    #[test]
    fn test_phaser_modulates_signal() {
        let mut phaser = Phaser::new(48000.0);
        phaser.apply(&full_wet());
        let mut block: Vec<f32> = (0..4800)
            .map(|i| libm::sinf(i as f32 * 0.3))
            .collect();
        let dry = block.clone();
        phaser.process(&mut block, false);
        assert!(block.iter().zip(&dry).any(|(w, d)| (w - d).abs() > 0.01));
    }
}
