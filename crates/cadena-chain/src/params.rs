//! Host-visible parameters and the per-block snapshot.
//!
//! Every parameter is a lock-free atomic cell paired with its
//! [`ParamDescriptor`]. The control context writes (values are clamped to the
//! descriptor range); the audio context only reads, once per block, through
//! [`ChainParams::snapshot`], which copies everything into plain `Copy`
//! settings values.
//!
//! Floats are stored bit-cast in an `AtomicU32`. All stores are `Release`
//! and all loads `Acquire`.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use cadena_core::{ParamDescriptor, ParamUnit};
use cadena_effects::{
    ChorusSettings, LadderMode, LadderSettings, OverdriveSettings, ParametricMode,
    ParametricSettings, PhaserSettings,
};

use crate::{BypassSet, ChainError, StageKind};

/// Continuous parameter.
#[derive(Debug)]
pub struct FloatParam {
    value: AtomicU32,
    descriptor: ParamDescriptor,
}

impl FloatParam {
    /// Parameter at its descriptor default.
    pub fn new(descriptor: ParamDescriptor) -> Self {
        Self {
            value: AtomicU32::new(descriptor.default.to_bits()),
            descriptor,
        }
    }

    /// Current plain value.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Store a plain value, clamped to the descriptor range.
    #[inline]
    pub fn set(&self, value: f32) {
        let clamped = self.descriptor.clamp(value);
        self.value.store(clamped.to_bits(), Ordering::Release);
    }

    /// Range and display metadata.
    pub fn descriptor(&self) -> &ParamDescriptor {
        &self.descriptor
    }
}

/// Stepped parameter selecting one of several labelled choices.
#[derive(Debug)]
pub struct ChoiceParam {
    index: AtomicU32,
    descriptor: ParamDescriptor,
    labels: &'static [&'static str],
}

impl ChoiceParam {
    /// Parameter over `labels`, starting at `default`.
    pub fn new(
        id: &'static str,
        name: &'static str,
        labels: &'static [&'static str],
        default: usize,
    ) -> Self {
        let descriptor = ParamDescriptor::choice(id, name, labels.len(), default);
        Self {
            index: AtomicU32::new(default as u32),
            descriptor,
            labels,
        }
    }

    /// Selected index.
    #[inline]
    pub fn get(&self) -> usize {
        self.index.load(Ordering::Acquire) as usize
    }

    /// Select an index. Out-of-range indices select the last choice.
    #[inline]
    pub fn set(&self, index: usize) {
        let clamped = index.min(self.labels.len() - 1);
        self.index.store(clamped as u32, Ordering::Release);
    }

    /// Choice labels in index order.
    pub fn labels(&self) -> &'static [&'static str] {
        self.labels
    }

    /// Range and display metadata.
    pub fn descriptor(&self) -> &ParamDescriptor {
        &self.descriptor
    }
}

/// On/off parameter.
#[derive(Debug)]
pub struct BoolParam {
    value: AtomicBool,
    descriptor: ParamDescriptor,
}

impl BoolParam {
    /// Parameter at its descriptor default.
    pub fn new(id: &'static str, name: &'static str, default: bool) -> Self {
        Self {
            value: AtomicBool::new(default),
            descriptor: ParamDescriptor::toggle(id, name, default),
        }
    }

    /// Current state.
    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    /// Store a new state.
    #[inline]
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Release);
    }

    /// Range and display metadata.
    pub fn descriptor(&self) -> &ParamDescriptor {
        &self.descriptor
    }
}

/// Uniform view over any parameter, addressed by plain `f32` values.
///
/// Choices read and write their index, toggles 0.0 / 1.0.
#[derive(Debug, Clone, Copy)]
pub enum ParamRef<'a> {
    /// Continuous parameter
    Float(&'a FloatParam),
    /// Choice parameter
    Choice(&'a ChoiceParam),
    /// Toggle parameter
    Bool(&'a BoolParam),
}

impl ParamRef<'_> {
    /// Range and display metadata.
    pub fn descriptor(&self) -> &ParamDescriptor {
        match self {
            ParamRef::Float(p) => p.descriptor(),
            ParamRef::Choice(p) => p.descriptor(),
            ParamRef::Bool(p) => p.descriptor(),
        }
    }

    /// Stable id.
    pub fn id(&self) -> &'static str {
        self.descriptor().id
    }

    /// Current value as a plain float.
    pub fn get_plain(&self) -> f32 {
        match self {
            ParamRef::Float(p) => p.get(),
            ParamRef::Choice(p) => p.get() as f32,
            ParamRef::Bool(p) => {
                if p.get() {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Store a plain float, clamped (choices round to the nearest index,
    /// toggles switch on at 0.5 and above).
    pub fn set_plain(&self, value: f32) {
        let value = self.descriptor().clamp(value);
        match self {
            ParamRef::Float(p) => p.set(value),
            ParamRef::Choice(p) => p.set(value.round() as usize),
            ParamRef::Bool(p) => p.set(value >= 0.5),
        }
    }

    /// Restore the descriptor default.
    pub fn reset(&self) {
        self.set_plain(self.descriptor().default);
    }

    /// Current value formatted for display, e.g. `"0.20 Hz"` or `"LPF24"`.
    pub fn display_value(&self) -> String {
        match self {
            ParamRef::Float(p) => {
                format!("{:.2}{}", p.get(), p.descriptor().unit.suffix())
            }
            ParamRef::Choice(p) => p.labels()[p.get()].to_string(),
            ParamRef::Bool(p) => String::from(if p.get() { "on" } else { "off" }),
        }
    }
}

// Continuous parameter layout. Ids are persisted and must not change.

const PHASER_RATE_HZ: ParamDescriptor =
    ParamDescriptor::new("phaser_rate_hz", "Phaser Rate", ParamUnit::Hertz, 0.01, 2.0, 0.2);
const PHASER_DEPTH: ParamDescriptor =
    ParamDescriptor::new("phaser_depth", "Phaser Depth", ParamUnit::Ratio, 0.01, 1.0, 0.05);
const PHASER_CENTRE_HZ: ParamDescriptor = ParamDescriptor::new(
    "phaser_centre_hz",
    "Phaser Centre",
    ParamUnit::Hertz,
    20.0,
    2000.0,
    1000.0,
);
const PHASER_FEEDBACK: ParamDescriptor =
    ParamDescriptor::new("phaser_feedback", "Phaser Feedback", ParamUnit::Ratio, -1.0, 1.0, 0.0);
const PHASER_MIX: ParamDescriptor =
    ParamDescriptor::new("phaser_mix", "Phaser Mix", ParamUnit::Ratio, 0.01, 1.0, 0.05);
const CHORUS_RATE_HZ: ParamDescriptor =
    ParamDescriptor::new("chorus_rate_hz", "Chorus Rate", ParamUnit::Hertz, 0.01, 100.0, 0.2);
const CHORUS_DEPTH: ParamDescriptor =
    ParamDescriptor::new("chorus_depth", "Chorus Depth", ParamUnit::Ratio, 0.01, 1.0, 0.05);
const CHORUS_CENTRE_DELAY_MS: ParamDescriptor = ParamDescriptor::new(
    "chorus_centre_delay_ms",
    "Chorus Centre Delay",
    ParamUnit::Milliseconds,
    1.0,
    100.0,
    7.0,
);
const CHORUS_FEEDBACK: ParamDescriptor =
    ParamDescriptor::new("chorus_feedback", "Chorus Feedback", ParamUnit::Ratio, -1.0, 1.0, 0.0);
const CHORUS_MIX: ParamDescriptor =
    ParamDescriptor::new("chorus_mix", "Chorus Mix", ParamUnit::Ratio, 0.01, 1.0, 0.05);
const OVERDRIVE_SATURATION: ParamDescriptor =
    ParamDescriptor::new("overdrive_saturation", "Saturation", ParamUnit::None, 1.0, 100.0, 1.0);
const LADDER_CUTOFF_HZ: ParamDescriptor = ParamDescriptor::new(
    "ladder_cutoff_hz",
    "Ladder Cutoff",
    ParamUnit::Hertz,
    20.0,
    2000.0,
    2000.0,
);
const LADDER_RESONANCE: ParamDescriptor =
    ParamDescriptor::new("ladder_resonance", "Ladder Resonance", ParamUnit::Ratio, 0.0, 1.0, 0.0);
const LADDER_DRIVE: ParamDescriptor =
    ParamDescriptor::new("ladder_drive", "Ladder Drive", ParamUnit::None, 1.0, 100.0, 1.0);
const PARAMETRIC_FREQ_HZ: ParamDescriptor = ParamDescriptor::new(
    "parametric_freq_hz",
    "Parametric Frequency",
    ParamUnit::Hertz,
    20.0,
    20000.0,
    750.0,
);
const PARAMETRIC_QUALITY: ParamDescriptor =
    ParamDescriptor::new("parametric_quality", "Parametric Q", ParamUnit::None, 0.1, 10.0, 1.0);
const PARAMETRIC_GAIN_DB: ParamDescriptor = ParamDescriptor::new(
    "parametric_gain_db",
    "Parametric Gain",
    ParamUnit::Decibels,
    -24.0,
    24.0,
    0.0,
);

/// Phaser parameters.
#[derive(Debug)]
pub struct PhaserParams {
    /// LFO rate
    pub rate_hz: FloatParam,
    /// Sweep depth
    pub depth: FloatParam,
    /// Sweep centre
    pub centre_hz: FloatParam,
    /// Feedback amount
    pub feedback: FloatParam,
    /// Wet/dry mix
    pub mix: FloatParam,
    /// Pass-through mode
    pub bypass: BoolParam,
}

impl PhaserParams {
    fn new() -> Self {
        Self {
            rate_hz: FloatParam::new(PHASER_RATE_HZ),
            depth: FloatParam::new(PHASER_DEPTH),
            centre_hz: FloatParam::new(PHASER_CENTRE_HZ),
            feedback: FloatParam::new(PHASER_FEEDBACK),
            mix: FloatParam::new(PHASER_MIX),
            bypass: BoolParam::new("phaser_bypass", "Phaser Bypass", false),
        }
    }

    fn settings(&self) -> PhaserSettings {
        PhaserSettings {
            rate_hz: self.rate_hz.get(),
            depth: self.depth.get(),
            centre_hz: self.centre_hz.get(),
            feedback: self.feedback.get(),
            mix: self.mix.get(),
        }
    }

    fn refs(&self) -> Vec<ParamRef<'_>> {
        vec![
            ParamRef::Float(&self.rate_hz),
            ParamRef::Float(&self.depth),
            ParamRef::Float(&self.centre_hz),
            ParamRef::Float(&self.feedback),
            ParamRef::Float(&self.mix),
            ParamRef::Bool(&self.bypass),
        ]
    }
}

/// Chorus parameters.
#[derive(Debug)]
pub struct ChorusParams {
    /// LFO rate
    pub rate_hz: FloatParam,
    /// Modulation depth
    pub depth: FloatParam,
    /// Base delay
    pub centre_delay_ms: FloatParam,
    /// Feedback amount
    pub feedback: FloatParam,
    /// Wet/dry mix
    pub mix: FloatParam,
    /// Pass-through mode
    pub bypass: BoolParam,
}

impl ChorusParams {
    fn new() -> Self {
        Self {
            rate_hz: FloatParam::new(CHORUS_RATE_HZ),
            depth: FloatParam::new(CHORUS_DEPTH),
            centre_delay_ms: FloatParam::new(CHORUS_CENTRE_DELAY_MS),
            feedback: FloatParam::new(CHORUS_FEEDBACK),
            mix: FloatParam::new(CHORUS_MIX),
            bypass: BoolParam::new("chorus_bypass", "Chorus Bypass", false),
        }
    }

    fn settings(&self) -> ChorusSettings {
        ChorusSettings {
            rate_hz: self.rate_hz.get(),
            depth: self.depth.get(),
            centre_delay_ms: self.centre_delay_ms.get(),
            feedback: self.feedback.get(),
            mix: self.mix.get(),
        }
    }

    fn refs(&self) -> Vec<ParamRef<'_>> {
        vec![
            ParamRef::Float(&self.rate_hz),
            ParamRef::Float(&self.depth),
            ParamRef::Float(&self.centre_delay_ms),
            ParamRef::Float(&self.feedback),
            ParamRef::Float(&self.mix),
            ParamRef::Bool(&self.bypass),
        ]
    }
}

/// Overdrive parameters.
#[derive(Debug)]
pub struct OverdriveParams {
    /// Pre-gain into the saturator
    pub saturation: FloatParam,
    /// Pass-through mode
    pub bypass: BoolParam,
}

impl OverdriveParams {
    fn new() -> Self {
        Self {
            saturation: FloatParam::new(OVERDRIVE_SATURATION),
            bypass: BoolParam::new("overdrive_bypass", "Overdrive Bypass", false),
        }
    }

    fn settings(&self) -> OverdriveSettings {
        OverdriveSettings {
            saturation: self.saturation.get(),
        }
    }

    fn refs(&self) -> Vec<ParamRef<'_>> {
        vec![
            ParamRef::Float(&self.saturation),
            ParamRef::Bool(&self.bypass),
        ]
    }
}

/// Ladder filter parameters.
#[derive(Debug)]
pub struct LadderParams {
    /// Response mode, indexes [`LadderMode::ALL`]
    pub mode: ChoiceParam,
    /// Cutoff frequency
    pub cutoff_hz: FloatParam,
    /// Resonance
    pub resonance: FloatParam,
    /// Input drive
    pub drive: FloatParam,
    /// Pass-through mode
    pub bypass: BoolParam,
}

impl LadderParams {
    fn new() -> Self {
        Self {
            mode: ChoiceParam::new("ladder_mode", "Ladder Mode", &LadderMode::LABELS, 0),
            cutoff_hz: FloatParam::new(LADDER_CUTOFF_HZ),
            resonance: FloatParam::new(LADDER_RESONANCE),
            drive: FloatParam::new(LADDER_DRIVE),
            bypass: BoolParam::new("ladder_filter_bypass", "Ladder Bypass", false),
        }
    }

    fn settings(&self) -> LadderSettings {
        LadderSettings {
            mode: LadderMode::from_index(self.mode.get()),
            cutoff_hz: self.cutoff_hz.get(),
            resonance: self.resonance.get(),
            drive: self.drive.get(),
        }
    }

    fn refs(&self) -> Vec<ParamRef<'_>> {
        vec![
            ParamRef::Choice(&self.mode),
            ParamRef::Float(&self.cutoff_hz),
            ParamRef::Float(&self.resonance),
            ParamRef::Float(&self.drive),
            ParamRef::Bool(&self.bypass),
        ]
    }
}

/// Parametric filter parameters.
#[derive(Debug)]
pub struct ParametricParams {
    /// Response mode, indexes [`ParametricMode::ALL`]
    pub mode: ChoiceParam,
    /// Centre frequency
    pub freq_hz: FloatParam,
    /// Q factor
    pub quality: FloatParam,
    /// Peak gain
    pub gain_db: FloatParam,
    /// Pass-through mode
    pub bypass: BoolParam,
}

impl ParametricParams {
    fn new() -> Self {
        Self {
            mode: ChoiceParam::new(
                "parametric_mode",
                "Parametric Mode",
                &ParametricMode::LABELS,
                0,
            ),
            freq_hz: FloatParam::new(PARAMETRIC_FREQ_HZ),
            quality: FloatParam::new(PARAMETRIC_QUALITY),
            gain_db: FloatParam::new(PARAMETRIC_GAIN_DB),
            bypass: BoolParam::new(
                "parametric_filter_bypass",
                "Parametric Bypass",
                false,
            ),
        }
    }

    fn settings(&self) -> ParametricSettings {
        ParametricSettings {
            mode: ParametricMode::from_index(self.mode.get()),
            freq_hz: self.freq_hz.get(),
            quality: self.quality.get(),
            gain_db: self.gain_db.get(),
        }
    }

    fn refs(&self) -> Vec<ParamRef<'_>> {
        vec![
            ParamRef::Choice(&self.mode),
            ParamRef::Float(&self.freq_hz),
            ParamRef::Float(&self.quality),
            ParamRef::Float(&self.gain_db),
            ParamRef::Bool(&self.bypass),
        ]
    }
}

/// Plain-value copy of every parameter, taken once per block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParamSnapshot {
    /// Phaser settings
    pub phaser: PhaserSettings,
    /// Chorus settings
    pub chorus: ChorusSettings,
    /// Overdrive settings
    pub overdrive: OverdriveSettings,
    /// Ladder filter settings
    pub ladder: LadderSettings,
    /// Parametric filter settings
    pub parametric: ParametricSettings,
    /// Per-kind bypass flags
    pub bypass: BypassSet,
}

/// The complete parameter set, shared between contexts behind an `Arc`.
///
/// # Example
///
/// ```rust
/// use cadena_chain::{ChainParams, StageKind};
///
/// let params = ChainParams::new();
/// params.set_plain("ladder_cutoff_hz", 5000.0).unwrap();
/// params.set_bypassed(StageKind::Chorus, true);
///
/// let snapshot = params.snapshot();
/// assert_eq!(snapshot.ladder.cutoff_hz, 2000.0); // clamped
/// assert!(snapshot.bypass.get(StageKind::Chorus));
/// ```
#[derive(Debug)]
pub struct ChainParams {
    /// Phaser group
    pub phaser: PhaserParams,
    /// Chorus group
    pub chorus: ChorusParams,
    /// Overdrive group
    pub overdrive: OverdriveParams,
    /// Ladder filter group
    pub ladder: LadderParams,
    /// Parametric filter group
    pub parametric: ParametricParams,
}

impl ChainParams {
    /// Every parameter at its default.
    pub fn new() -> Self {
        Self {
            phaser: PhaserParams::new(),
            chorus: ChorusParams::new(),
            overdrive: OverdriveParams::new(),
            ladder: LadderParams::new(),
            parametric: ParametricParams::new(),
        }
    }

    /// Copy every value into plain settings. Allocation-free.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            phaser: self.phaser.settings(),
            chorus: self.chorus.settings(),
            overdrive: self.overdrive.settings(),
            ladder: self.ladder.settings(),
            parametric: self.parametric.settings(),
            bypass: BypassSet::from_fn(|kind| self.bypass_param(kind).get()),
        }
    }

    /// Bypass toggle of `kind`.
    pub fn bypass_param(&self, kind: StageKind) -> &BoolParam {
        match kind {
            StageKind::Phaser => &self.phaser.bypass,
            StageKind::Chorus => &self.chorus.bypass,
            StageKind::Overdrive => &self.overdrive.bypass,
            StageKind::LadderFilter => &self.ladder.bypass,
            StageKind::ParametricFilter => &self.parametric.bypass,
        }
    }

    /// Switch `kind` between active and pass-through.
    pub fn set_bypassed(&self, kind: StageKind, bypassed: bool) {
        self.bypass_param(kind).set(bypassed);
    }

    /// Whether `kind` is in pass-through mode.
    pub fn is_bypassed(&self, kind: StageKind) -> bool {
        self.bypass_param(kind).get()
    }

    /// Parameters belonging to `kind`, bypass last.
    pub fn stage_params(&self, kind: StageKind) -> Vec<ParamRef<'_>> {
        match kind {
            StageKind::Phaser => self.phaser.refs(),
            StageKind::Chorus => self.chorus.refs(),
            StageKind::Overdrive => self.overdrive.refs(),
            StageKind::LadderFilter => self.ladder.refs(),
            StageKind::ParametricFilter => self.parametric.refs(),
        }
    }

    /// Every parameter, grouped by stage in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = ParamRef<'_>> + '_ {
        StageKind::ALL
            .into_iter()
            .flat_map(move |kind| self.stage_params(kind))
    }

    /// Look up a parameter by id.
    pub fn find(&self, id: &str) -> Option<ParamRef<'_>> {
        self.iter().find(|p| p.id() == id)
    }

    /// Set a parameter by id, clamped to its range.
    pub fn set_plain(&self, id: &str, value: f32) -> Result<(), ChainError> {
        let param = self
            .find(id)
            .ok_or_else(|| ChainError::UnknownParam(id.to_string()))?;
        param.set_plain(value);
        Ok(())
    }

    /// Restore every default, bypass flags included.
    pub fn reset_to_defaults(&self) {
        for param in self.iter() {
            param.reset();
        }
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::new()
    }
}
