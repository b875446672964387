//! Chorus with an LFO-modulated delay line.

use cadena_core::{
    Effect, InterpolatedDelay, Lfo, ProcessSpec, SmoothedParam, flush_denormal, ms_to_samples,
    wet_dry_mix,
};

/// Delay excursion in milliseconds at full depth.
const MOD_RANGE_MS: f32 = 10.0;

/// Longest centre delay the settings allow.
const MAX_CENTRE_DELAY_MS: f32 = 100.0;

/// Delay-line length needed for every setting.
const MAX_DELAY_MS: f32 = MAX_CENTRE_DELAY_MS + MOD_RANGE_MS;

const MAX_FEEDBACK: f32 = 0.95;

/// Plain-value chorus settings.
///
/// | Field | Range | Default |
/// |-------|-------|---------|
/// | `rate_hz` | 0.01–100 Hz | 0.2 |
/// | `depth` | 0.01–1 | 0.05 |
/// | `centre_delay_ms` | 1–100 ms | 7 |
/// | `feedback` | −1–1 | 0 |
/// | `mix` | 0.01–1 | 0.05 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChorusSettings {
    /// LFO rate in Hz
    pub rate_hz: f32,
    /// Modulation depth, fraction of the 10 ms excursion
    pub depth: f32,
    /// Delay at the bottom of the sweep, in milliseconds
    pub centre_delay_ms: f32,
    /// Feedback amount
    pub feedback: f32,
    /// Wet/dry mix
    pub mix: f32,
}

impl Default for ChorusSettings {
    fn default() -> Self {
        Self {
            rate_hz: 0.2,
            depth: 0.05,
            centre_delay_ms: 7.0,
            feedback: 0.0,
            mix: 0.05,
        }
    }
}

/// Chorus stage.
///
/// The delay line is sized for the longest possible setting when the stage
/// is built or prepared, so changing settings never allocates.
///
/// # Example
///
/// ```rust
/// use cadena_core::Effect;
/// use cadena_effects::{Chorus, ChorusSettings};
///
/// let mut chorus = Chorus::new(48000.0);
/// chorus.apply(&ChorusSettings { rate_hz: 1.5, mix: 0.5, ..ChorusSettings::default() });
/// assert!(chorus.process_sample(0.5).is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Chorus {
    delay: InterpolatedDelay,
    lfo: Lfo,
    settings: ChorusSettings,
    depth: SmoothedParam,
    centre_delay_ms: SmoothedParam,
    feedback: SmoothedParam,
    mix: SmoothedParam,
    sample_rate: f32,
}

impl Chorus {
    /// Create a chorus with default settings.
    pub fn new(sample_rate: f32) -> Self {
        let settings = ChorusSettings::default();
        let mut chorus = Self {
            delay: InterpolatedDelay::from_time_ms(sample_rate, MAX_DELAY_MS),
            lfo: Lfo::new(sample_rate, settings.rate_hz),
            settings,
            depth: SmoothedParam::default(),
            centre_delay_ms: SmoothedParam::default(),
            feedback: SmoothedParam::default(),
            mix: SmoothedParam::default(),
            sample_rate,
        };
        chorus.configure_smoothing();
        chorus.snap_to(&settings);
        chorus
    }

    /// Hand the chorus new settings. Cheap when nothing changed.
    pub fn apply(&mut self, settings: &ChorusSettings) {
        if self.settings == *settings {
            return;
        }
        self.settings = *settings;
        self.lfo.set_frequency(settings.rate_hz);
        self.depth.set_target(settings.depth);
        self.centre_delay_ms
            .set_target(settings.centre_delay_ms.clamp(0.0, MAX_CENTRE_DELAY_MS));
        self.feedback
            .set_target(settings.feedback.clamp(-1.0, 1.0) * MAX_FEEDBACK);
        self.mix.set_target(settings.mix);
    }

    /// Settings most recently applied.
    pub fn settings(&self) -> ChorusSettings {
        self.settings
    }

    fn configure_smoothing(&mut self) {
        for (param, ms) in [
            (&mut self.depth, 20.0),
            // Slow enough that delay-time jumps glide instead of clicking
            (&mut self.centre_delay_ms, 50.0),
            (&mut self.feedback, 10.0),
            (&mut self.mix, 10.0),
        ] {
            param.set_sample_rate(self.sample_rate);
            param.set_smoothing_time_ms(ms);
        }
    }

    fn snap_to(&mut self, settings: &ChorusSettings) {
        self.settings = *settings;
        self.lfo.set_frequency(settings.rate_hz);
        self.depth.set_immediate(settings.depth);
        self.centre_delay_ms
            .set_immediate(settings.centre_delay_ms.clamp(0.0, MAX_CENTRE_DELAY_MS));
        self.feedback
            .set_immediate(settings.feedback.clamp(-1.0, 1.0) * MAX_FEEDBACK);
        self.mix.set_immediate(settings.mix);
    }
}

impl Default for Chorus {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Effect for Chorus {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;
        self.delay.ensure_capacity(spec.sample_rate, MAX_DELAY_MS);
        self.lfo.set_sample_rate(spec.sample_rate);
        self.configure_smoothing();
        self.reset();
    }

    fn reset(&mut self) {
        self.delay.clear();
        self.lfo.reset();
        let settings = self.settings;
        self.snap_to(&settings);
    }

    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        let depth = self.depth.advance();
        let centre = self.centre_delay_ms.advance();
        let feedback = self.feedback.advance();
        let mix = self.mix.advance();

        let delay_ms = centre + depth * MOD_RANGE_MS * self.lfo.next_unipolar();
        let wet = self.delay.read(ms_to_samples(delay_ms, self.sample_rate));
        self.delay.write(flush_denormal(input + wet * feedback));

        wet_dry_mix(input, wet, mix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chorus_basic() {
        let mut chorus = Chorus::new(44100.0);
        chorus.apply(&ChorusSettings {
            mix: 1.0,
            depth: 1.0,
            ..ChorusSettings::default()
        });
        for _ in 0..2000 {
            assert!(chorus.process_sample(0.5).is_finite());
        }
    }

    #[test]
    fn test_chorus_delays_wet_signal() {
        let mut chorus = Chorus::new(48000.0);
        chorus.apply(&ChorusSettings {
            mix: 1.0,
            depth: 0.01,
            centre_delay_ms: 10.0,
            ..ChorusSettings::default()
        });
        chorus.reset();

        // Impulse comes back roughly 480 samples later
        let first = chorus.process_sample(1.0);
        assert!(first.abs() < 1e-6);
        let mut peak_at = 0;
        let mut peak = 0.0_f32;
        for i in 1..1200 {
            let out = chorus.process_sample(0.0);
            if out.abs() > peak {
                peak = out.abs();
                peak_at = i;
            }
        }
        assert!((470..=500).contains(&peak_at), "peak at {peak_at}");
    }

    #[test]
    fn test_chorus_fast_rate_and_feedback_stable() {
        let mut chorus = Chorus::new(48000.0);
        chorus.apply(&ChorusSettings {
            rate_hz: 100.0,
            depth: 1.0,
            centre_delay_ms: 1.0,
            feedback: -1.0,
            mix: 1.0,
        });
        for i in 0..48000 {
            let out = chorus.process_sample(if i % 100 == 0 { 1.0 } else { 0.0 });
            assert!(out.is_finite() && out.abs() < 25.0);
        }
    }

    #[test]
    fn test_chorus_prepare_grows_delay() {
        let mut chorus = Chorus::new(44100.0);
        let before = chorus.delay.capacity();
        chorus.prepare(&ProcessSpec::mono(192000.0, 256));
        assert!(chorus.delay.capacity() > before);
    }

    #[test]
    fn test_chorus_reset() {
        let mut chorus = Chorus::new(48000.0);
        chorus.apply(&ChorusSettings {
            mix: 1.0,
            ..ChorusSettings::default()
        });
        for _ in 0..1000 {
            chorus.process_sample(1.0);
        }
        chorus.reset();
        assert!(chorus.process_sample(0.0).abs() < 1e-6);
    }
}
