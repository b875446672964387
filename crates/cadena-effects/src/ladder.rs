//! Resonant four-pole ladder filter with six response modes.
//!
//! # Topology
//!
//! Four cascaded one-pole sections with a saturating global feedback path.
//! Each section is
//!
//! ```text
//! y[n] = b0*x[n] + b1*x[n-1] + a1*y[n-1]
//! a1 = exp(-2*pi*fc/fs),  b0 = 0.769*(1 - a1),  b1 = 0.231*(1 - a1)
//! ```
//!
//! The input and the fed-back fourth-pole output both pass through a tanh
//! stage. The response mode is a fixed linear mix of the five taps (input
//! node plus four pole outputs): low-pass keeps the last tap of its slope,
//! high-pass uses binomial differences, band-pass the difference of adjacent
//! taps.
//!
//! Resonance maps 0..1 onto a loop gain of 0.4..4; the filter self-oscillates
//! near the top of the range and the tanh in the loop bounds the amplitude.

use cadena_core::{Effect, ProcessSpec, SmoothedParam, drive_compensation, flush_denormal};
use core::f32::consts::PI;
use libm::{expf, tanhf};

/// Ladder response mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LadderMode {
    /// 12 dB/oct low-pass
    #[default]
    Lpf12,
    /// 12 dB/oct high-pass
    Hpf12,
    /// 12 dB/oct band-pass
    Bpf12,
    /// 24 dB/oct low-pass
    Lpf24,
    /// 24 dB/oct high-pass
    Hpf24,
    /// 24 dB/oct band-pass
    Bpf24,
}

impl LadderMode {
    /// All modes in choice-index order.
    pub const ALL: [LadderMode; 6] = [
        LadderMode::Lpf12,
        LadderMode::Hpf12,
        LadderMode::Bpf12,
        LadderMode::Lpf24,
        LadderMode::Hpf24,
        LadderMode::Bpf24,
    ];

    /// Display labels in choice-index order.
    pub const LABELS: [&'static str; 6] = ["LPF12", "HPF12", "BPF12", "LPF24", "HPF24", "BPF24"];

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

    /// Tap weights and feedback input compensation.
    fn taps(self) -> ([f32; 5], f32) {
        match self {
            LadderMode::Lpf12 => ([0.0, 0.0, 1.0, 0.0, 0.0], 0.5),
            LadderMode::Hpf12 => ([1.0, -2.0, 1.0, 0.0, 0.0], 0.0),
            LadderMode::Bpf12 => ([0.0, 0.0, -1.0, 1.0, 0.0], 0.5),
            LadderMode::Lpf24 => ([0.0, 0.0, 0.0, 0.0, 1.0], 0.5),
            LadderMode::Hpf24 => ([1.0, -4.0, 6.0, -4.0, 1.0], 0.0),
            LadderMode::Bpf24 => ([0.0, 0.0, 1.0, -2.0, 1.0], 0.5),
        }
    }
}

/// Plain-value ladder settings.
///
/// | Field | Range | Default |
/// |-------|-------|---------|
/// | `mode` | [`LadderMode`] | LPF12 |
/// | `cutoff_hz` | 20–2000 Hz | 2000 |
/// | `resonance` | 0–1 | 0 |
/// | `drive` | 1–100 | 1 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderSettings {
    /// Response mode
    pub mode: LadderMode,
    /// Cutoff frequency in Hz
    pub cutoff_hz: f32,
    /// Resonance amount
    pub resonance: f32,
    /// Input drive
    pub drive: f32,
}

impl Default for LadderSettings {
    fn default() -> Self {
        Self {
            mode: LadderMode::Lpf12,
            cutoff_hz: 2000.0,
            resonance: 0.0,
            drive: 1.0,
        }
    }
}

/// Ladder filter stage.
///
/// # Example
///
/// ```rust
/// use cadena_core::Effect;
/// use cadena_effects::{LadderFilter, LadderMode, LadderSettings};
///
/// let mut ladder = LadderFilter::new(48000.0);
/// ladder.apply(&LadderSettings {
///     mode: LadderMode::Lpf24,
///     cutoff_hz: 500.0,
///     resonance: 0.7,
///     drive: 2.0,
/// });
/// assert!(ladder.process_sample(0.3).is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct LadderFilter {
    /// Input node followed by the four pole outputs
    state: [f32; 5],
    settings: LadderSettings,
    taps: [f32; 5],
    comp: f32,
    cutoff_hz: SmoothedParam,
    /// Loop gain / 4
    resonance: SmoothedParam,
    drive: f32,
    gain: f32,
    drive2: f32,
    gain2: f32,
    sample_rate: f32,
}

impl LadderFilter {
    /// Create a ladder with default settings.
    pub fn new(sample_rate: f32) -> Self {
        let settings = LadderSettings::default();
        let mut ladder = Self {
            state: [0.0; 5],
            settings,
            taps: [0.0; 5],
            comp: 0.0,
            cutoff_hz: SmoothedParam::with_config(settings.cutoff_hz, sample_rate, 20.0),
            resonance: SmoothedParam::with_config(0.0, sample_rate, 20.0),
            drive: 1.0,
            gain: 1.0,
            drive2: 1.0,
            gain2: 1.0,
            sample_rate,
        };
        ladder.set_static(&settings);
        ladder.resonance.snap_to_target();
        ladder
    }

    /// Hand the ladder new settings. Cheap when nothing changed.
    pub fn apply(&mut self, settings: &LadderSettings) {
        if self.settings == *settings {
            return;
        }
        self.set_static(settings);
    }

    /// Settings most recently applied.
    pub fn settings(&self) -> LadderSettings {
        self.settings
    }

    fn set_static(&mut self, settings: &LadderSettings) {
        self.settings = *settings;
        (self.taps, self.comp) = settings.mode.taps();
        self.cutoff_hz.set_target(settings.cutoff_hz);
        self.resonance
            .set_target(0.1 + 0.9 * settings.resonance.clamp(0.0, 1.0));

        self.drive = settings.drive.max(1.0);
        self.gain = drive_compensation(self.drive);
        self.drive2 = self.drive * 0.04 + 0.96;
        self.gain2 = drive_compensation(self.drive2);
    }
}

impl Default for LadderFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Effect for LadderFilter {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;
        self.cutoff_hz.set_sample_rate(spec.sample_rate);
        self.resonance.set_sample_rate(spec.sample_rate);
        self.reset();
    }

    fn reset(&mut self) {
        self.state = [0.0; 5];
        self.cutoff_hz.snap_to_target();
        self.resonance.snap_to_target();
    }

    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        let cutoff = self.cutoff_hz.advance().min(self.sample_rate * 0.45);
        let resonance = self.resonance.advance();

        let a1 = expf(-2.0 * PI * cutoff / self.sample_rate);
        let g = 1.0 - a1;
        let b0 = g * 0.76923077;
        let b1 = g * 0.23076923;

        let s = &mut self.state;
        let dx = self.gain * tanhf(self.drive * input);
        let feedback = self.gain2 * tanhf(self.drive2 * s[4]);
        let a = dx - 4.0 * resonance * (feedback - dx * self.comp);
        let b = b1 * s[0] + a1 * s[1] + b0 * a;
        let c = b1 * s[1] + a1 * s[2] + b0 * b;
        let d = b1 * s[2] + a1 * s[3] + b0 * c;
        let e = b1 * s[3] + a1 * s[4] + b0 * d;

        *s = [
            a,
            flush_denormal(b),
            flush_denormal(c),
            flush_denormal(d),
            flush_denormal(e),
        ];

        let t = &self.taps;
        t[0] * a + t[1] * b + t[2] * c + t[3] * d + t[4] * e
    }
}
