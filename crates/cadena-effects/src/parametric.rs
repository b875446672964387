//! Single-band parametric filter built on an RBJ biquad.

use cadena_core::{
    Biquad, BiquadCoefficients, Effect, ProcessSpec, allpass_coefficients, bandpass_coefficients,
    notch_coefficients, peaking_eq_coefficients,
};

/// Parametric filter response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParametricMode {
    /// Bell boost or cut by `gain_db`
    #[default]
    Peak,
    /// Constant 0 dB peak band-pass
    Bandpass,
    /// Band-reject
    Notch,
    /// Flat magnitude, phase turn around the frequency
    Allpass,
}

impl ParametricMode {
    /// All modes in choice-index order.
    pub const ALL: [ParametricMode; 4] = [
        ParametricMode::Peak,
        ParametricMode::Bandpass,
        ParametricMode::Notch,
        ParametricMode::Allpass,
    ];

    /// Display labels in choice-index order.
    pub const LABELS: [&'static str; 4] = ["Peak", "Bandpass", "Notch", "Allpass"];

    /// Mode for a choice index, clamped to the last mode.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Choice index of this mode.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }
}

/// Plain-value parametric filter settings.
///
/// | Field | Range | Default |
/// |-------|-------|---------|
/// | `mode` | [`ParametricMode`] | Peak |
/// | `freq_hz` | 20–20000 Hz | 750 |
/// | `quality` | 0.1–10 | 1 |
/// | `gain_db` | −24–24 dB | 0 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParametricSettings {
    /// Response mode
    pub mode: ParametricMode,
    /// Centre frequency in Hz
    pub freq_hz: f32,
    /// Q factor
    pub quality: f32,
    /// Boost or cut in dB, used by [`ParametricMode::Peak`]
    pub gain_db: f32,
}

impl Default for ParametricSettings {
    fn default() -> Self {
        Self {
            mode: ParametricMode::Peak,
            freq_hz: 750.0,
            quality: 1.0,
            gain_db: 0.0,
        }
    }
}

/// Parametric filter stage.
///
/// Coefficients are recomputed only when the settings or the sample rate
/// change.
///
/// # Example
///
/// ```rust
/// use cadena_core::Effect;
/// use cadena_effects::{ParametricFilter, ParametricMode, ParametricSettings};
///
/// let mut eq = ParametricFilter::new(48000.0);
/// eq.apply(&ParametricSettings {
///     mode: ParametricMode::Notch,
///     freq_hz: 60.0,
///     quality: 4.0,
///     gain_db: 0.0,
/// });
/// assert!(eq.process_sample(0.5).is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct ParametricFilter {
    filter: Biquad,
    settings: ParametricSettings,
    sample_rate: f32,
}

impl ParametricFilter {
    /// Create a parametric filter with default settings.
    pub fn new(sample_rate: f32) -> Self {
        let mut eq = Self {
            filter: Biquad::new(),
            settings: ParametricSettings::default(),
            sample_rate,
        };
        eq.update_coefficients();
        eq
    }

    /// Hand the filter new settings. Cheap when nothing changed.
    pub fn apply(&mut self, settings: &ParametricSettings) {
        if self.settings == *settings {
            return;
        }
        self.settings = *settings;
        self.update_coefficients();
    }

    /// Settings most recently applied.
    pub fn settings(&self) -> ParametricSettings {
        self.settings
    }

    fn coefficients(&self) -> BiquadCoefficients {
        let s = &self.settings;
        let freq = s.freq_hz.clamp(10.0, self.sample_rate * 0.45);
        let q = s.quality.max(0.05);
        match s.mode {
            ParametricMode::Peak => peaking_eq_coefficients(freq, q, s.gain_db, self.sample_rate),
            ParametricMode::Bandpass => bandpass_coefficients(freq, q, self.sample_rate),
            ParametricMode::Notch => notch_coefficients(freq, q, self.sample_rate),
            ParametricMode::Allpass => allpass_coefficients(freq, q, self.sample_rate),
        }
    }

    fn update_coefficients(&mut self) {
        let coefficients = self.coefficients();
        self.filter.set_coefficients(coefficients);
    }
}

impl Default for ParametricFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Effect for ParametricFilter {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;
        self.update_coefficients();
        self.reset();
    }

    fn reset(&mut self) {
        self.filter.clear();
    }

    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        self.filter.process(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    const SR: f32 = 48000.0;

    fn rms_gain(eq: &mut ParametricFilter, freq: f32) -> f32 {
        eq.reset();
        let mut out = 0.0;
        let mut inp = 0.0;
        for i in 0..9600 {
            let x = libm::sinf(2.0 * PI * freq * i as f32 / SR);
            let y = eq.process_sample(x);
            if i >= 4800 {
                out += y * y;
                inp += x * x;
            }
        }
        libm::sqrtf(out / inp)
    }

    #[test]
    fn test_default_is_transparent() {
        let mut eq = ParametricFilter::new(SR);
        assert!((rms_gain(&mut eq, 750.0) - 1.0).abs() < 0.01);
        assert!((rms_gain(&mut eq, 5000.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_peak_cut() {
        let mut eq = ParametricFilter::new(SR);
        eq.apply(&ParametricSettings {
            gain_db: -12.0,
            freq_hz: 1000.0,
            ..ParametricSettings::default()
        });
        assert!((rms_gain(&mut eq, 1000.0) - 0.251).abs() < 0.02);
    }

    #[test]
    fn test_notch_mode() {
        let mut eq = ParametricFilter::new(SR);
        eq.apply(&ParametricSettings {
            mode: ParametricMode::Notch,
            freq_hz: 1000.0,
            quality: 2.0,
            gain_db: 0.0,
        });
        assert!(rms_gain(&mut eq, 1000.0) < 0.05);
        assert!(rms_gain(&mut eq, 100.0) > 0.9);
    }

    #[test]
    fn test_prepare_recomputes_for_new_rate() {
        let mut eq = ParametricFilter::new(44100.0);
        eq.apply(&ParametricSettings {
            mode: ParametricMode::Notch,
            freq_hz: 1000.0,
            quality: 2.0,
            gain_db: 0.0,
        });
        eq.prepare(&ProcessSpec::mono(SR, 128));
        assert!(rms_gain(&mut eq, 1000.0) < 0.05);
    }

    #[test]
    fn test_mode_index_roundtrip() {
        for (i, mode) in ParametricMode::ALL.iter().enumerate() {
            assert_eq!(ParametricMode::from_index(i), *mode);
        }
        assert_eq!(ParametricMode::from_index(7), ParametricMode::Allpass);
        assert_eq!(ParametricMode::Bandpass.label(), "Bandpass");
    }
}
