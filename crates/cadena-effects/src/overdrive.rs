//! Overdrive: tanh saturation with drive-dependent level compensation.

use cadena_core::{Effect, ProcessSpec, SmoothedParam, drive_compensation, soft_clip};

/// Plain-value overdrive settings.
///
/// | Field | Range | Default |
/// |-------|-------|---------|
/// | `saturation` | 1–100 | 1 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverdriveSettings {
    /// Pre-gain into the saturator
    pub saturation: f32,
}

impl Default for OverdriveSettings {
    fn default() -> Self {
        Self { saturation: 1.0 }
    }
}

/// Overdrive stage.
///
/// `y = drive_compensation(d) * tanh(d * x)`: at saturation 1 small signals
/// pass nearly unchanged, at high saturation the output approaches a
/// compensated square wave.
#[derive(Debug, Clone)]
pub struct Overdrive {
    drive: SmoothedParam,
    settings: OverdriveSettings,
}

impl Overdrive {
    /// Create an overdrive with default settings.
    pub fn new(sample_rate: f32) -> Self {
        let settings = OverdriveSettings::default();
        Self {
            drive: SmoothedParam::with_config(settings.saturation, sample_rate, 10.0),
            settings,
        }
    }

    /// Hand the overdrive new settings.
    pub fn apply(&mut self, settings: &OverdriveSettings) {
        self.settings = *settings;
        self.drive.set_target(settings.saturation.max(1.0));
    }

    /// Settings most recently applied.
    pub fn settings(&self) -> OverdriveSettings {
        self.settings
    }
}

impl Default for Overdrive {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Effect for Overdrive {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.drive.set_sample_rate(spec.sample_rate);
        self.reset();
    }

    fn reset(&mut self) {
        self.drive.snap_to_target();
    }

    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        let drive = self.drive.advance();
        drive_compensation(drive) * soft_clip(drive * input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdrive_unity_at_minimum() {
        let mut drive = Overdrive::new(48000.0);
        let out = drive.process_sample(0.01);
        assert!((out - 0.01).abs() < 1e-3);
    }

    #[test]
    fn test_overdrive_bounded() {
        let mut drive = Overdrive::new(48000.0);
        drive.apply(&OverdriveSettings { saturation: 100.0 });
        drive.reset();
        for x in [-10.0, -1.0, -0.1, 0.0, 0.1, 1.0, 10.0] {
            let out = drive.process_sample(x);
            assert!(out.abs() < 1.0);
        }
    }

    #[test]
    fn test_overdrive_adds_harmonics() {
        let mut drive = Overdrive::new(48000.0);
        drive.apply(&OverdriveSettings { saturation: 50.0 });
        drive.reset();
        // A clipped sine is flatter: its peak-to-rms ratio drops towards 1
        let mut peak = 0.0_f32;
        let mut sum_sq = 0.0_f32;
        for i in 0..4800 {
            let x = 0.5 * libm::sinf(2.0 * core::f32::consts::PI * 100.0 * i as f32 / 48000.0);
            let y = drive.process_sample(x);
            peak = peak.max(y.abs());
            sum_sq += y * y;
        }
        let crest = peak / libm::sqrtf(sum_sq / 4800.0);
        assert!(crest < 1.2, "crest factor {crest}");
    }

    #[test]
    fn test_overdrive_smooths_drive() {
        let mut drive = Overdrive::new(48000.0);
        drive.apply(&OverdriveSettings { saturation: 100.0 });
        let first = drive.process_sample(0.01);
        // Still close to the clean gain on the first sample after a jump
        assert!((first - 0.01).abs() < 0.01);
    }
}
